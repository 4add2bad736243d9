//! In-memory filesystem shared by service unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};

use crate::application::ports::HostFs;

#[derive(Debug, Clone)]
struct Entry {
    content: Option<Vec<u8>>,
    mode: u32,
}

/// Files and directories keyed by absolute path. Directories have no content.
#[derive(Default)]
pub struct MemoryFs {
    entries: Mutex<BTreeMap<PathBuf, Entry>>,
}

impl MemoryFs {
    pub fn seed(&self, path: &str, content: &str, mode: u32) {
        self.lock().insert(
            PathBuf::from(path),
            Entry { content: Some(content.as_bytes().to_vec()), mode },
        );
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.lock()
            .get(Path::new(path))
            .and_then(|e| e.content.clone())
            .map(|c| String::from_utf8_lossy(&c).into_owned())
    }

    pub fn mode(&self, path: &str) -> Option<u32> {
        self.lock().get(Path::new(path)).map(|e| e.mode)
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, Entry>> {
        self.entries.lock().expect("memory fs lock")
    }
}

impl HostFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self.lock();
        for dir in path.ancestors() {
            entries
                .entry(dir.to_path_buf())
                .or_insert(Entry { content: None, mode: 0o755 });
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.lock().get(path).and_then(|e| e.content.clone()) {
            Some(content) => Ok(content),
            None => bail!("{}: no such file", path.display()),
        }
    }

    fn write_new(&self, path: &Path, content: &[u8], mode: u32) -> Result<()> {
        let mut entries = self.lock();
        if entries.contains_key(path) {
            bail!("{}: file exists", path.display());
        }
        entries.insert(path.to_path_buf(), Entry { content: Some(content.to_vec()), mode });
        Ok(())
    }

    fn copy(&self, src: &Path, dest: &Path, mode: u32) -> Result<()> {
        let content = self.read(src)?;
        self.lock()
            .insert(dest.to_path_buf(), Entry { content: Some(content), mode });
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        match self.lock().get_mut(path) {
            Some(entry) => {
                entry.mode = mode;
                Ok(())
            }
            None => bail!("{}: no such file", path.display()),
        }
    }
}
