//! Embedded templates compiled into the binary.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `env.template`: initial `.env` with every key the bot reads
//!   - `unit.template`: systemd unit rendered by `--generate-unit`

use anyhow::{Result, anyhow};
use include_dir::{Dir, include_dir};

use crate::application::ports::TemplateStore;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Production `TemplateStore`.
pub struct EmbeddedTemplates;

impl TemplateStore for EmbeddedTemplates {
    fn template(&self, name: &str) -> Result<&'static str> {
        let file = EMBEDDED_ASSETS
            .get_file(name)
            .ok_or_else(|| anyhow!("embedded template not found: {name}"))?;
        file.contents_utf8()
            .ok_or_else(|| anyhow!("embedded template is not UTF-8: {name}"))
    }
}
