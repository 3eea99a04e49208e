//! In-memory host filesystems

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use iecfuji_core::error::{Error, Result};
use iecfuji_core::platform::{AccessMode, DirEntry, HostFs, HostProvider, HostType, ImageFile};
use iecfuji_core::protocol::INVALID_DIRPOS;
use iecfuji_core::util::wildcard_match;

#[derive(Debug, Clone)]
struct Node {
    path: String,
    is_dir: bool,
    size: u32,
    modified: i64,
}

#[derive(Debug, Default)]
struct HostsState {
    trees: BTreeMap<String, Vec<Node>>,
    mounted: BTreeMap<String, usize>,
    opened: Vec<(String, AccessMode)>,
}

/// A set of hosts, each with its own directory tree
///
/// Clones share state, so a test can keep one handle and hand another to the
/// device.
#[derive(Debug, Clone, Default)]
pub struct DummyHosts {
    state: Rc<RefCell<HostsState>>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl DummyHosts {
    /// No hosts
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `host` reachable with an empty tree
    pub fn add_host(&self, host: &str) -> &Self {
        self.state
            .borrow_mut()
            .trees
            .entry(host.to_string())
            .or_default();
        self
    }

    /// Add an image file, creating the host and parent directories as needed
    pub fn add_file(&self, host: &str, path: &str, size: u32) -> &Self {
        self.add_file_at(host, path, size, 0)
    }

    /// Add a file with a modification time
    pub fn add_file_at(&self, host: &str, path: &str, size: u32, modified: i64) -> &Self {
        let path = normalize(path);
        self.add_dir(host, parent_of(&path));
        self.insert(
            host,
            Node {
                path,
                is_dir: false,
                size,
                modified,
            },
        );
        self
    }

    /// Add a directory and its parents
    pub fn add_dir(&self, host: &str, path: &str) -> &Self {
        let path = normalize(path);
        if path == "/" {
            self.add_host(host);
            return self;
        }
        self.add_dir(host, parent_of(&path));
        self.insert(
            host,
            Node {
                path,
                is_dir: true,
                size: 0,
                modified: 0,
            },
        );
        self
    }

    fn insert(&self, host: &str, node: Node) {
        let mut state = self.state.borrow_mut();
        let tree = state.trees.entry(host.to_string()).or_default();
        if !tree.iter().any(|n| n.path == node.path) {
            tree.push(node);
        }
    }

    /// Whether `host` currently has a live mount
    pub fn is_mounted(&self, host: &str) -> bool {
        self.state.borrow().mounted.get(host).copied().unwrap_or(0) > 0
    }

    /// Every image opened so far, in order
    pub fn opened(&self) -> Vec<(String, AccessMode)> {
        self.state.borrow().opened.clone()
    }
}

impl HostProvider for DummyHosts {
    fn mount(&mut self, hostname: &str, kind: HostType) -> Result<Box<dyn HostFs>> {
        let mut state = self.state.borrow_mut();
        if !state.trees.contains_key(hostname) {
            log::debug!("dummy: host {} ({:?}) is unreachable", hostname, kind);
            return Err(Error::io("could not mount host"));
        }
        *state.mounted.entry(hostname.to_string()).or_default() += 1;
        Ok(Box::new(DummyFs {
            host: hostname.to_string(),
            state: Rc::clone(&self.state),
            listing: None,
            pos: 0,
        }))
    }
}

struct DummyImage {
    size: u64,
}

impl ImageFile for DummyImage {
    fn size(&self) -> u64 {
        self.size
    }
}

/// One mounted host
struct DummyFs {
    host: String,
    state: Rc<RefCell<HostsState>>,
    listing: Option<Vec<DirEntry>>,
    pos: usize,
}

impl DummyFs {
    fn with_tree<T>(&self, f: impl FnOnce(&[Node]) -> T) -> T {
        let state = self.state.borrow();
        f(state.trees.get(&self.host).map_or(&[][..], Vec::as_slice))
    }
}

impl HostFs for DummyFs {
    fn open_file(&mut self, path: &str, mode: AccessMode) -> Result<Box<dyn ImageFile>> {
        let path = normalize(path);
        let size = self
            .with_tree(|tree| {
                tree.iter()
                    .find(|n| !n.is_dir && n.path == path)
                    .map(|n| n.size)
            })
            .ok_or_else(|| Error::io("no file handle"))?;
        self.state.borrow_mut().opened.push((path, mode));
        Ok(Box::new(DummyImage { size: size as u64 }))
    }

    fn dir_open(&mut self, path: &str, pattern: Option<&str>) -> Result<()> {
        let path = normalize(path);
        let listing = self.with_tree(|tree| {
            let exists = path == "/" || tree.iter().any(|n| n.is_dir && n.path == path);
            exists.then(|| {
                tree.iter()
                    .filter(|n| parent_of(&n.path) == path)
                    .filter(|n| {
                        pattern.map_or(true, |p| wildcard_match(p, name_of(&n.path)))
                    })
                    .map(|n| DirEntry {
                        name: name_of(&n.path).to_string(),
                        is_dir: n.is_dir,
                        size: n.size,
                        modified: n.modified,
                    })
                    .collect::<Vec<_>>()
            })
        });
        match listing {
            Some(mut entries) => {
                entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
                self.listing = Some(entries);
                self.pos = 0;
                Ok(())
            }
            None => Err(Error::io("failed to open directory")),
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
            Some(_) => self.pos as u16,
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

    fn unmount(&mut self) -> Result<()> {
        if let Some(count) = self.state.borrow_mut().mounted.get_mut(&self.host) {
            *count = count.saturating_sub(1);
        }
        Ok(())
    }
}
