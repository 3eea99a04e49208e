//! Directory cursor
//!
//! Only one listing is open at a time across all hosts. Opening a new one
//! closes the old one first, without reporting anything.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::platform::{DirEntry, HostFs};
use crate::protocol::dir_flags::DirOptions;
use crate::protocol::wire::{encode_dir_entry_meta, DIR_ENTRY_META_LEN};
use crate::protocol::DIR_END_SENTINEL;
use crate::slots::SlotRegistry;
use crate::util::ellipsize;

const NOT_OPEN: Error = Error::ResourceUnavailable("no currently open directory");

/// The single directory cursor
#[derive(Debug, Default)]
pub struct DirectorySession {
    open_on: Option<u8>,
    exhausted: bool,
}

impl DirectorySession {
    /// Host slot the cursor is open on
    pub fn open_on(&self) -> Option<u8> {
        self.open_on
    }

    /// Open `path` on host slot `host`
    ///
    /// The host must already be mounted. On failure the cursor stays closed.
    pub fn open(
        &mut self,
        slots: &mut SlotRegistry,
        host: u8,
        path: &str,
        pattern: Option<&str>,
    ) -> Result<()> {
        SlotRegistry::check_host(host)?;
        if self.open_on.is_some() {
            log::debug!("fuji: directory was already open, closing it first");
            self.close(slots);
        }

        let fs = slots
            .host_mut(host)?
            .fs_mut()
            .ok_or(Error::ResourceUnavailable("host not mounted"))?;
        log::debug!("fuji: opening directory {:?}, pattern {:?}", path, pattern);
        fs.dir_open(path, pattern.filter(|p| !p.is_empty()))?;

        self.open_on = Some(host);
        self.exhausted = false;
        Ok(())
    }

    fn fs<'a>(&mut self, slots: &'a mut SlotRegistry) -> Result<&'a mut (dyn HostFs + 'static)> {
        let host = self.open_on.ok_or(NOT_OPEN)?;
        match slots.host_mut(host)?.fs_mut() {
            Some(fs) => Ok(fs),
            None => {
                // Host went away underneath the cursor
                self.open_on = None;
                Err(NOT_OPEN)
            }
        }
    }

    /// Next entry, formatted for the wire
    ///
    /// Once the listing is exhausted every call returns
    /// [`DIR_END_SENTINEL`] until the cursor is moved or reopened.
    pub fn read_entry(&mut self, slots: &mut SlotRegistry, maxlen: u8, options: u8) -> Result<Vec<u8>> {
        let fs = self.fs(slots)?;
        if self.exhausted {
            return Ok(DIR_END_SENTINEL.to_vec());
        }
        match fs.dir_next() {
            Some(entry) => {
                log::debug!("fuji: read_direntry {:?}", entry.name);
                Ok(format_entry(&entry, maxlen, DirOptions::from_bits_truncate(options)))
            }
            None => {
                log::debug!("fuji: reached end of directory");
                self.exhausted = true;
                Ok(DIR_END_SENTINEL.to_vec())
            }
        }
    }

    /// Current position, as reported by the host
    pub fn tell(&mut self, slots: &mut SlotRegistry) -> Result<u16> {
        Ok(self.fs(slots)?.dir_tell())
    }

    /// Move to a position previously returned by [`tell`](Self::tell)
    pub fn seek(&mut self, slots: &mut SlotRegistry, pos: u16) -> Result<()> {
        if !self.fs(slots)?.dir_seek(pos) {
            return Err(Error::io("unable to perform directory seek"));
        }
        self.exhausted = false;
        Ok(())
    }

    /// Close the cursor; a no-op when nothing is open
    pub fn close(&mut self, slots: &mut SlotRegistry) {
        if let Some(host) = self.open_on.take() {
            if let Ok(slot) = slots.host_mut(host) {
                if let Some(fs) = slot.fs_mut() {
                    fs.dir_close();
                }
            }
        }
        self.exhausted = false;
    }

    /// Drop the cursor if it is open on `host`
    pub fn forget_host(&mut self, host: u8) {
        if self.open_on == Some(host) {
            self.open_on = None;
            self.exhausted = false;
        }
    }
}

/// Render one entry: optional metadata record, then the name, then `/` for
/// directories
///
/// The name is ellipsized to what is left of `maxlen` after the record and
/// the trailing slash, counted in bytes.
pub fn format_entry(entry: &DirEntry, maxlen: u8, options: DirOptions) -> Vec<u8> {
    let extended = options.contains(DirOptions::EXTENDED);

    let mut budget = maxlen as usize;
    if extended {
        budget = budget.saturating_sub(DIR_ENTRY_META_LEN);
    }
    if entry.is_dir {
        budget = budget.saturating_sub(1);
    }
    let truncated = entry.name.len() > budget;

    let mut out = Vec::with_capacity(maxlen as usize);
    if extended {
        out.extend_from_slice(&encode_dir_entry_meta(entry, truncated));
    }
    out.extend_from_slice(ellipsize(&entry.name, budget).as_bytes());
    if entry.is_dir {
        out.push(b'/');
    }
    out
}
