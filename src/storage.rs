//! App-key storage on a local directory standing in for the SD card

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use iecfuji_core::platform::AppKeyStore;

use crate::error::{BackendError, Result};

/// [`AppKeyStore`] rooted at a directory
///
/// The store counts as present while the directory exists.
#[derive(Debug, Clone)]
pub struct SdDirectory {
    root: PathBuf,
}

impl SdDirectory {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, path: &str) -> Result<PathBuf> {
        let rel = path.trim_start_matches('/');
        if rel.split('/').any(|part| part == "..") {
            return Err(BackendError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

impl AppKeyStore for SdDirectory {
    fn available(&self) -> bool {
        self.root.is_dir()
    }

    fn create_dir(&mut self, path: &str) -> iecfuji_core::Result<()> {
        let dir = self.path(path)?;
        fs::create_dir_all(&dir).map_err(BackendError::from)?;
        Ok(())
    }

    fn write(&mut self, path: &str, data: &[u8]) -> iecfuji_core::Result<usize> {
        let file = self.path(path)?;
        fs::write(&file, data).map_err(|e| {
            log::warn!("sd: cannot write {}: {}", file.display(), e);
            iecfuji_core::Error::io("failed to open output file")
        })?;
        Ok(data.len())
    }

    fn read(&mut self, path: &str, max: usize) -> iecfuji_core::Result<Vec<u8>> {
        let file = self.path(path)?;
        let handle = fs::File::open(&file).map_err(|e| {
            log::warn!("sd: cannot read {}: {}", file.display(), e);
            iecfuji_core::Error::io("failed to read appkey file")
        })?;
        let mut data = Vec::with_capacity(max);
        handle
            .take(max as u64)
            .read_to_end(&mut data)
            .map_err(BackendError::from)?;
        Ok(data)
    }
}
