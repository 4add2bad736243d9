//! Application service: create-once configuration files.
//!
//! An existing target is never read, rewritten or re-moded here; permission
//! hardening is a separate step.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::HostFs;
use crate::domain::artifact::{ConfigArtifact, ContentSource};

/// What `materialize` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    Created,
    SkippedExisting,
    /// The example to copy from does not exist; nothing was written.
    MissingSource(PathBuf),
}

/// Write `source` to `path` only if `path` is absent.
///
/// # Errors
///
/// Returns an error if reading the example or creating the target fails.
pub fn materialize(
    fs: &impl HostFs,
    path: &Path,
    source: &ContentSource,
    mode: u32,
) -> Result<Materialized> {
    if fs.exists(path) {
        return Ok(Materialized::SkippedExisting);
    }

    let content = match source {
        ContentSource::Literal(text) => text.clone().into_bytes(),
        ContentSource::CopyFrom(example) => {
            if !fs.exists(example) {
                tracing::warn!(example = %example.display(), "example file missing");
                return Ok(Materialized::MissingSource(example.clone()));
            }
            fs.read(example)
                .with_context(|| format!("reading {}", example.display()))?
        }
    };

    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs.write_new(path, &content, mode)
        .with_context(|| format!("creating {}", path.display()))?;
    tracing::info!(path = %path.display(), mode = format_args!("{mode:o}"), "materialized");
    Ok(Materialized::Created)
}

/// [`materialize`] for a described artifact.
///
/// # Errors
///
/// See [`materialize`].
pub fn materialize_artifact(fs: &impl HostFs, artifact: &ConfigArtifact) -> Result<Materialized> {
    materialize(fs, &artifact.path, &artifact.source, artifact.mode)
}
