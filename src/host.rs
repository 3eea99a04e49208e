//! Hosts served from local directories
//!
//! The SD host maps to one directory and every other hostname to a
//! subdirectory of a hosts root, so `tnfs.example.org` is
//! `<hosts>/tnfs.example.org/`. Paths sent by the host computer are always
//! resolved inside that directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use iecfuji_core::platform::{AccessMode, DirEntry, HostFs, HostProvider, HostType, ImageFile};
use iecfuji_core::protocol::INVALID_DIRPOS;
use iecfuji_core::util::wildcard_match;

use crate::error::{BackendError, Result};

/// Resolve a host path below `root`, refusing anything that climbs out
fn resolve(root: &Path, path: &str) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(BackendError::InvalidPath(path.to_string())),
        }
    }
    Ok(out)
}

/// [`HostProvider`] over local directories
#[derive(Debug, Clone)]
pub struct LocalHosts {
    sd_root: PathBuf,
    hosts_root: PathBuf,
}

impl LocalHosts {
    /// Serve `SD` from `sd_root` and other hosts from `hosts_root/<name>`
    pub fn new(sd_root: impl Into<PathBuf>, hosts_root: impl Into<PathBuf>) -> Self {
        Self {
            sd_root: sd_root.into(),
            hosts_root: hosts_root.into(),
        }
    }

    /// Directory backing `hostname`
    pub fn host_dir(&self, hostname: &str, kind: HostType) -> Result<PathBuf> {
        match kind {
            HostType::Sd => Ok(self.sd_root.clone()),
            _ => resolve(&self.hosts_root, hostname),
        }
    }
}

impl HostProvider for LocalHosts {
    fn mount(&mut self, hostname: &str, kind: HostType) -> iecfuji_core::Result<Box<dyn HostFs>> {
        let root = self.host_dir(hostname, kind)?;
        if !root.is_dir() {
            return Err(BackendError::HostNotFound(root).into());
        }
        log::info!("host: mounted {} from {}", hostname, root.display());
        Ok(Box::new(LocalFs::new(root)))
    }
}

/// An image opened on a local host
struct LocalImage {
    _file: File,
    size: u64,
}

impl ImageFile for LocalImage {
    fn size(&self) -> u64 {
        self.size
    }
}

/// One mounted local directory
pub struct LocalFs {
    root: PathBuf,
    listing: Option<Vec<DirEntry>>,
    pos: usize,
}

impl LocalFs {
    /// Filesystem rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            listing: None,
            pos: 0,
        }
    }

    fn list(&self, path: &str, pattern: Option<&str>) -> Result<Vec<DirEntry>> {
        let dir = resolve(&self.root, path)?;
        let mut entries = Vec::new();
        for item in fs::read_dir(&dir)? {
            let item = item?;
            let name = item.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if let Some(p) = pattern {
                if !wildcard_match(p, &name) {
                    continue;
                }
            }
            let meta = item.metadata()?;
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_secs() as i64);
            entries.push(DirEntry {
                name,
                is_dir: meta.is_dir(),
                size: meta.len().min(u32::MAX as u64) as u32,
                modified,
            });
        }
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }
}

impl HostFs for LocalFs {
    fn open_file(&mut self, path: &str, mode: AccessMode) -> iecfuji_core::Result<Box<dyn ImageFile>> {
        let full = resolve(&self.root, path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(mode == AccessMode::ReadWrite)
            .open(&full)
            .map_err(|e| {
                log::warn!("host: cannot open {}: {}", full.display(), e);
                iecfuji_core::Error::io("no file handle")
            })?;
        let size = file.metadata().map_err(BackendError::from)?.len();
        log::debug!("host: opened {} ({} bytes, {:?})", full.display(), size, mode);
        Ok(Box::new(LocalImage { _file: file, size }))
    }

    fn dir_open(&mut self, path: &str, pattern: Option<&str>) -> iecfuji_core::Result<()> {
        match self.list(path, pattern) {
            Ok(entries) => {
                self.listing = Some(entries);
                self.pos = 0;
                Ok(())
            }
            Err(e) => {
                log::warn!("host: cannot list {:?}: {}", path, e);
                self.listing = None;
                Err(iecfuji_core::Error::io("failed to open directory"))
            }
        }
    }

    fn dir_next(&mut self) -> Option<DirEntry> {
        let entry = self.listing.as_ref()?.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    fn dir_tell(&self) -> u16 {
        match self.listing {
            Some(_) => self.pos.min(u16::MAX as usize - 1) as u16,
            None => INVALID_DIRPOS,
        }
    }

    fn dir_seek(&mut self, pos: u16) -> bool {
        match &self.listing {
            Some(entries) if (pos as usize) <= entries.len() => {
                self.pos = pos as usize;
                true
            }
            _ => false,
        }
    }

    fn dir_close(&mut self) {
        self.listing = None;
        self.pos = 0;
    }
}
