//! Filesystem infrastructure: implements `HostFs` on the local disk.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::HostFs;

/// Production filesystem. With `dry_run` set, reads go to disk and writes
/// are logged only.
pub struct LocalFs {
    dry_run: bool,
}

impl LocalFs {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    fn skip(&self, op: &str, path: &Path) -> bool {
        if self.dry_run {
            tracing::info!(op, path = %path.display(), "dry run, not executed");
        }
        self.dry_run
    }
}

impl HostFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.skip("mkdir", path) {
            return Ok(());
        }
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading file {}", path.display()))
    }

    fn write_new(&self, path: &Path, content: &[u8], mode: u32) -> Result<()> {
        if self.skip("create", path) {
            return Ok(());
        }
        // O_EXCL: never clobber a file that appeared since the existence check.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(mode)
            .open(path)
            .with_context(|| format!("creating file {}", path.display()))?;
        file.write_all(content)
            .with_context(|| format!("writing file {}", path.display()))?;
        // The process umask may have masked bits out of `mode`.
        file.set_permissions(std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("setting permissions on {}", path.display()))
    }

    fn copy(&self, src: &Path, dest: &Path, mode: u32) -> Result<()> {
        if self.skip("copy", dest) {
            return Ok(());
        }
        std::fs::copy(src, dest)
            .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
        self.set_mode(dest, mode)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        if self.skip("chmod", path) {
            return Ok(());
        }
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("setting permissions on {}", path.display()))
    }
}
