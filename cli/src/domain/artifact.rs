//! Configuration artifacts the bot reads at startup.

use std::path::{Path, PathBuf};

/// Owner read/write only.
pub const SECRET_MODE: u32 = 0o600;

/// Mode for unit files handed to the init system.
pub const UNIT_MODE: u32 = 0o644;

/// Where an artifact's initial bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Literal template text embedded in the binary.
    Literal(String),
    /// Copy of a sibling example file shipped with the bot's sources.
    CopyFrom(PathBuf),
}

/// A file that is created once and never overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigArtifact {
    pub path: PathBuf,
    pub mode: u32,
    pub source: ContentSource,
}

impl ConfigArtifact {
    #[must_use]
    pub fn literal(path: impl Into<PathBuf>, mode: u32, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode,
            source: ContentSource::Literal(content.into()),
        }
    }

    #[must_use]
    pub fn copy_of(path: impl Into<PathBuf>, mode: u32, example: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode,
            source: ContentSource::CopyFrom(example.into()),
        }
    }

    /// File name for progress messages.
    #[must_use]
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
