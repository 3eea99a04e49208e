//! Capability traits for the collaborators around the engine
//!
//! The engine never touches a filesystem, radio or clock directly. Each
//! concern is a narrow trait object handed in through
//! [`Peripherals`](super::Peripherals), so the whole device can run against
//! in-memory fakes.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use super::settings::{Settings, WifiSettings};
use super::types::{AccessMode, DirEntry, HostType, NetInfo, ScanResult};
use crate::error::Result;
use crate::media::MediaType;
use crate::session::HashAlgorithm;

/// An open disk image
pub trait ImageFile {
    /// Size of the image in bytes
    fn size(&self) -> u64;
}

/// A mounted host filesystem
///
/// A host keeps at most one directory listing open at a time.
pub trait HostFs {
    /// Open an image file on this host
    fn open_file(&mut self, path: &str, mode: AccessMode) -> Result<Box<dyn ImageFile>>;

    /// Start listing `path`, optionally filtered by a wildcard pattern
    fn dir_open(&mut self, path: &str, pattern: Option<&str>) -> Result<()>;

    /// Next entry of the open listing, `None` once exhausted
    fn dir_next(&mut self) -> Option<DirEntry>;

    /// Current listing position, [`INVALID_DIRPOS`](crate::protocol::INVALID_DIRPOS)
    /// if there is none
    fn dir_tell(&self) -> u16;

    /// Move the listing to a position obtained from [`dir_tell`](Self::dir_tell)
    fn dir_seek(&mut self, pos: u16) -> bool;

    /// Close the listing
    fn dir_close(&mut self);

    /// Release the host
    ///
    /// Default implementation does nothing.
    fn unmount(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Mounts hosts by name
pub trait HostProvider {
    /// Mount the host named `hostname`
    fn mount(&mut self, hostname: &str, kind: HostType) -> Result<Box<dyn HostFs>>;
}

/// Persistent configuration storage
pub trait ConfigStore {
    /// Load the stored settings
    fn load(&mut self) -> Result<Settings>;

    /// Persist `settings`
    fn save(&mut self, settings: &Settings) -> Result<()>;
}

/// WiFi / network stack
pub trait Network {
    /// Whether the station is associated
    fn connected(&self) -> bool;

    /// Scan for networks and return how many were found
    fn scan_networks(&mut self) -> u8;

    /// Result `index` of the last scan
    fn scan_result(&self, index: u8) -> Option<ScanResult>;

    /// Try to associate with the given credentials
    fn test_connect(&mut self, ssid: &str, password: &str) -> Result<()>;

    /// Restart the station with the stored WiFi settings
    fn restart(&mut self, wifi: &WifiSettings);

    /// Current interface details
    fn info(&self) -> NetInfo;

    /// Look up a scanned network by the CRC-8 of its name
    ///
    /// Default implementation finds nothing.
    fn network_name_by_crc8(&self, _crc: u8) -> Option<String> {
        None
    }
}

/// SD-class storage used for app keys
pub trait AppKeyStore {
    /// Whether SD storage is present and mounted
    fn available(&self) -> bool;

    /// Create a directory (and parents) if missing
    fn create_dir(&mut self, path: &str) -> Result<()>;

    /// Write `data` to `path`, replacing it; returns bytes written
    fn write(&mut self, path: &str, data: &[u8]) -> Result<usize>;

    /// Read at most `max` bytes from `path`
    fn read(&mut self, path: &str, max: usize) -> Result<Vec<u8>>;
}

/// Emulated drives and other bus devices
pub trait DriveBank {
    /// Attach an opened image to drive `unit`; returns the media type in use
    ///
    /// `detected` is the type guessed from the filename. Implementations that
    /// inspect the image may return something better.
    fn mount(&mut self, unit: u8, filename: &str, size: u64, detected: MediaType) -> MediaType;

    /// Detach whatever is mounted on drive `unit`
    fn unmount(&mut self, unit: u8);

    /// Enable or disable bus device `device`; `false` if there is no such device
    fn set_active(&mut self, device: u8, active: bool) -> bool;
}

/// Board level services
pub trait System {
    /// Restart the adapter
    fn reboot(&mut self);

    /// Firmware version string
    fn version(&self) -> String;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Digest primitive used by the hash session
pub trait HashPrimitive {
    /// Digest `data` with `algorithm`
    fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8>;
}
