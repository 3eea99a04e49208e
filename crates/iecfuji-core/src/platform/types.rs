//! Plain data exchanged with the platform collaborators

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of storage behind a host slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HostType {
    /// Remote TNFS server
    Tnfs,
    /// Local SD-class storage
    Sd,
    /// Slot is unused
    #[default]
    Invalid,
}

impl HostType {
    /// Derive the host type from a hostname
    ///
    /// `SD` in any case is the local SD card, any other non-empty name is a
    /// TNFS server.
    pub fn from_hostname(name: &str) -> Self {
        if name.is_empty() {
            Self::Invalid
        } else if name.eq_ignore_ascii_case("sd") {
            Self::Sd
        } else {
            Self::Tnfs
        }
    }
}

/// Disk access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum AccessMode {
    /// Read only
    #[default]
    Read = 1,
    /// Read and write
    ReadWrite = 2,
}

impl AccessMode {
    /// Decode a mode byte; anything but the write mode opens read only
    pub fn from_byte(b: u8) -> Self {
        if b == crate::protocol::DISK_ACCESS_MODE_WRITE {
            Self::ReadWrite
        } else {
            Self::Read
        }
    }

    /// Wire value
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One entry of a host directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name without any path
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Size in bytes
    pub size: u32,
    /// Modification time, seconds since the Unix epoch (UTC)
    pub modified: i64,
}

/// WiFi credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetConfig {
    /// Network name
    pub ssid: String,
    /// WPA passphrase
    pub password: String,
}

/// One network found by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Network name
    pub ssid: String,
    /// Signal strength in dBm
    pub rssi: i8,
}

/// Current network interface details
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetInfo {
    /// Our hostname
    pub hostname: String,
    /// Associated network name
    pub ssid: String,
    /// Access point MAC
    pub bssid: [u8; 6],
    /// IPv4 address
    pub ip: [u8; 4],
    /// IPv4 gateway
    pub gateway: [u8; 4],
    /// IPv4 netmask
    pub netmask: [u8; 4],
    /// DNS server
    pub dns: [u8; 4],
    /// Interface MAC
    pub mac: [u8; 6],
}
