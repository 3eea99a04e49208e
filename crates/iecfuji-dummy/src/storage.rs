//! SD card for app keys

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use iecfuji_core::error::{Error, Result};
use iecfuji_core::platform::AppKeyStore;

#[derive(Debug)]
struct SdState {
    inserted: bool,
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    write_limit: Option<usize>,
}

/// In-memory SD card
#[derive(Debug, Clone)]
pub struct DummySdCard {
    state: Rc<RefCell<SdState>>,
}

impl Default for DummySdCard {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(SdState {
                inserted: true,
                dirs: BTreeSet::new(),
                files: BTreeMap::new(),
                write_limit: None,
            })),
        }
    }
}

impl DummySdCard {
    /// Inserted, empty card
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or remove the card
    pub fn set_inserted(&self, inserted: bool) {
        self.state.borrow_mut().inserted = inserted;
    }

    /// Cut every write to `limit` bytes
    pub fn limit_writes(&self, limit: usize) {
        self.state.borrow_mut().write_limit = Some(limit);
    }

    /// Contents of `path`
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path).cloned()
    }

    /// Put a file on the card
    pub fn put_file(&self, path: &str, data: &[u8]) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), data.to_vec());
    }

    /// Number of files on the card
    pub fn file_count(&self) -> usize {
        self.state.borrow().files.len()
    }
}

impl AppKeyStore for DummySdCard {
    fn available(&self) -> bool {
        self.state.borrow().inserted
    }

    fn create_dir(&mut self, path: &str) -> Result<()> {
        self.state.borrow_mut().dirs.insert(path.to_string());
        Ok(())
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<usize> {
        let mut state = self.state.borrow_mut();
        let dir = path.rsplit_once('/').map_or("", |(d, _)| d);
        if !dir.is_empty() && !state.dirs.contains(dir) {
            return Err(Error::io("failed to open output file"));
        }
        let n = state.write_limit.map_or(data.len(), |l| l.min(data.len()));
        state.files.insert(path.to_string(), data[..n].to_vec());
        Ok(n)
    }

    fn read(&mut self, path: &str, max: usize) -> Result<Vec<u8>> {
        let state = self.state.borrow();
        let data = state
            .files
            .get(path)
            .ok_or_else(|| Error::io("failed to read appkey file"))?;
        Ok(data[..data.len().min(max)].to_vec())
    }
}
