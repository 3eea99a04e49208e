//! App-key session
//!
//! An app key is a small blob stored on SD under a name derived from
//! `(creator, app, key)`. OPEN_APPKEY records which key the next read or
//! write refers to; a write always consumes the session.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::platform::AppKeyStore;
use crate::protocol::{APPKEY_DIR, MAX_APPKEY_LEN};

/// Access requested by OPEN_APPKEY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppKeyMode {
    /// No session, or an unknown mode byte
    #[default]
    Invalid,
    /// Next access is a read
    Read,
    /// Next access is a write
    Write,
}

impl AppKeyMode {
    /// Decode the mode byte: 0 read, 1 write
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => Self::Read,
            1 => Self::Write,
            _ => Self::Invalid,
        }
    }
}

/// The key an open session refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppKey {
    /// Creator id, 0 means no session
    pub creator: u16,
    /// Application id
    pub app: u8,
    /// Key id
    pub key: u8,
    /// Requested access
    pub mode: AppKeyMode,
    /// Reserved byte, carried but unused
    pub reserved: u8,
}

impl AppKey {
    /// Storage path, e.g. `/FujiNet/12340102.key`
    pub fn filename(&self) -> String {
        format!(
            "{}/{:04x}{:02x}{:02x}.key",
            APPKEY_DIR, self.creator, self.app, self.key
        )
    }
}

/// The single app-key session
#[derive(Debug, Default)]
pub struct AppKeySession {
    current: AppKey,
}

impl AppKeySession {
    /// Key currently open
    pub fn current(&self) -> &AppKey {
        &self.current
    }

    /// Replace the session with `key`
    pub fn open(&mut self, key: AppKey) {
        log::debug!(
            "fuji: app key creator=0x{:04x} app=0x{:02x} key=0x{:02x} mode={:?} file={}",
            key.creator,
            key.app,
            key.key,
            key.mode,
            key.filename()
        );
        self.current = key;
    }

    /// End the session
    pub fn close(&mut self) {
        self.current.creator = 0;
        self.current.mode = AppKeyMode::Invalid;
    }

    /// Write `data` (cut to the app-key limit) to the open key
    ///
    /// The session is closed whether or not the write succeeds.
    pub fn write(&mut self, store: &mut dyn AppKeyStore, data: &[u8]) -> Result<usize> {
        let key = self.current;
        self.close();

        if key.creator == 0 || key.mode != AppKeyMode::Write {
            return Err(Error::Parameter("creator information missing"));
        }
        if !store.available() {
            return Err(Error::ResourceUnavailable("sd card not mounted"));
        }

        let data = &data[..data.len().min(MAX_APPKEY_LEN)];
        let path = key.filename();
        log::debug!("fuji: writing app key to {}", path);

        store.create_dir(APPKEY_DIR)?;
        let count = store.write(&path, data)?;
        if count != data.len() {
            return Err(Error::io(format!(
                "only wrote {} bytes of expected {}",
                count,
                data.len()
            )));
        }
        Ok(count)
    }

    /// Read the open key
    pub fn read(&self, store: &mut dyn AppKeyStore) -> Result<Vec<u8>> {
        if !store.available() {
            return Err(Error::ResourceUnavailable("sd card not mounted"));
        }
        if self.current.creator == 0 || self.current.mode != AppKeyMode::Read {
            return Err(Error::Parameter("invalid appkey metadata"));
        }
        let path = self.current.filename();
        log::debug!("fuji: reading app key from {}", path);
        store.read(&path, MAX_APPKEY_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;

    #[derive(Default)]
    struct MemStore {
        present: bool,
        files: BTreeMap<String, Vec<u8>>,
        dirs: Vec<String>,
    }

    impl AppKeyStore for MemStore {
        fn available(&self) -> bool {
            self.present
        }

        fn create_dir(&mut self, path: &str) -> Result<()> {
            self.dirs.push(path.to_string());
            Ok(())
        }

        fn write(&mut self, path: &str, data: &[u8]) -> Result<usize> {
            self.files.insert(path.to_string(), data.to_vec());
            Ok(data.len())
        }

        fn read(&mut self, path: &str, max: usize) -> Result<Vec<u8>> {
            let data = self
                .files
                .get(path)
                .ok_or_else(|| Error::io("failed to read appkey file"))?;
            Ok(data[..data.len().min(max)].to_vec())
        }
    }

    fn key(mode: AppKeyMode) -> AppKey {
        AppKey {
            creator: 0x1234,
            app: 0x01,
            key: 0x02,
            mode,
            reserved: 0,
        }
    }

    #[test]
    fn test_filename() {
        assert_eq!(key(AppKeyMode::Read).filename(), "/FujiNet/12340102.key");
        let k = AppKey {
            creator: 0xB,
            app: 0xA,
            key: 0xFF,
            ..Default::default()
        };
        assert_eq!(k.filename(), "/FujiNet/000b0aff.key");
    }

    #[test]
    fn test_write_then_read() {
        let mut store = MemStore {
            present: true,
            ..Default::default()
        };
        let mut s = AppKeySession::default();
        s.open(key(AppKeyMode::Write));
        assert_eq!(s.write(&mut store, b"hiscore"), Ok(7));
        assert_eq!(store.dirs, vec![APPKEY_DIR.to_string()]);

        s.open(key(AppKeyMode::Read));
        assert_eq!(s.read(&mut store).unwrap(), b"hiscore");
    }

    #[test]
    fn test_write_consumes_session() {
        let mut store = MemStore {
            present: true,
            ..Default::default()
        };
        let mut s = AppKeySession::default();
        s.open(key(AppKeyMode::Write));
        s.write(&mut store, b"one").unwrap();
        assert_eq!(
            s.write(&mut store, b"two"),
            Err(Error::Parameter("creator information missing"))
        );
        assert_eq!(store.files.get("/FujiNet/12340102.key").unwrap(), b"one");
    }

    #[test]
    fn test_write_without_open_touches_nothing() {
        let mut store = MemStore {
            present: true,
            ..Default::default()
        };
        let mut s = AppKeySession::default();
        assert!(matches!(s.write(&mut store, b"x"), Err(Error::Parameter(_))));

        // Opened for reading is no better
        s.open(key(AppKeyMode::Read));
        assert!(matches!(s.write(&mut store, b"x"), Err(Error::Parameter(_))));
        assert!(store.files.is_empty());
        assert!(store.dirs.is_empty());
    }

    #[test]
    fn test_write_needs_sd() {
        let mut store = MemStore::default();
        let mut s = AppKeySession::default();
        s.open(key(AppKeyMode::Write));
        assert_eq!(
            s.write(&mut store, b"x"),
            Err(Error::ResourceUnavailable("sd card not mounted"))
        );
        assert!(store.files.is_empty());
    }

    #[test]
    fn test_write_truncates() {
        let mut store = MemStore {
            present: true,
            ..Default::default()
        };
        let mut s = AppKeySession::default();
        s.open(key(AppKeyMode::Write));
        assert_eq!(s.write(&mut store, &[0xAB; 100]), Ok(MAX_APPKEY_LEN));
    }

    #[test]
    fn test_close_resets() {
        let mut s = AppKeySession::default();
        s.open(key(AppKeyMode::Read));
        s.close();
        assert_eq!(s.current().creator, 0);
        assert_eq!(s.current().mode, AppKeyMode::Invalid);
    }

    #[test]
    fn test_mode_from_byte() {
        assert_eq!(AppKeyMode::from_byte(0), AppKeyMode::Read);
        assert_eq!(AppKeyMode::from_byte(1), AppKeyMode::Write);
        assert_eq!(AppKeyMode::from_byte(2), AppKeyMode::Invalid);
    }
}
