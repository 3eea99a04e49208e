//! Persisted adapter configuration
//!
//! The engine reads these at slot-populate time and writes them back after
//! every mutating slot command, through a [`ConfigStore`](super::ConfigStore).

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{AccessMode, HostType};
use crate::protocol::{FIRST_DRIVE_DEVICE, MAX_DISK_DEVICES, MAX_HOSTS};

/// Number of bus devices with a persisted enable flag
pub const MAX_ENABLE_FLAGS: usize = 8;

/// One configured host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HostSettings {
    /// Hostname, empty when the slot is unused
    pub name: String,
    /// Host type
    pub kind: HostType,
}

/// One configured disk mount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MountSettings {
    /// Host slot the image lives on
    pub host_slot: Option<u8>,
    /// Image path on that host
    pub path: String,
    /// Access mode
    pub mode: AccessMode,
}

/// WiFi settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WifiSettings {
    /// Whether WiFi should be brought up
    pub enabled: bool,
    /// Stored network name
    pub ssid: String,
    /// Stored passphrase
    pub passphrase: String,
}

impl Default for WifiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ssid: String::new(),
            passphrase: String::new(),
        }
    }
}

/// Complete persisted configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Host slots
    pub hosts: [HostSettings; MAX_HOSTS],
    /// Disk slots
    pub mounts: [MountSettings; MAX_DISK_DEVICES],
    /// WiFi
    pub wifi: WifiSettings,
    /// Auto-boot the configuration disk
    pub boot_config: bool,
    /// Boot device selected by SET_BOOT_MODE
    pub boot_device: u8,
    /// Enable flag per bus device, index 0 is device 8
    pub device_enabled: [bool; MAX_ENABLE_FLAGS],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts: core::array::from_fn(|_| HostSettings::default()),
            mounts: core::array::from_fn(|_| MountSettings::default()),
            wifi: WifiSettings::default(),
            boot_config: true,
            boot_device: 0,
            device_enabled: [true; MAX_ENABLE_FLAGS],
        }
    }
}

impl Settings {
    /// Store the enable flag for a bus device
    ///
    /// Returns `false` when the device has no persisted flag.
    pub fn set_device_enabled(&mut self, device: u8, enabled: bool) -> bool {
        match device
            .checked_sub(FIRST_DRIVE_DEVICE)
            .and_then(|i| self.device_enabled.get_mut(i as usize))
        {
            Some(flag) => {
                *flag = enabled;
                true
            }
            None => false,
        }
    }

    /// Enable flag for a bus device; devices without a flag are enabled
    pub fn device_enabled(&self, device: u8) -> bool {
        device
            .checked_sub(FIRST_DRIVE_DEVICE)
            .and_then(|i| self.device_enabled.get(i as usize))
            .copied()
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.wifi.enabled);
        assert!(s.boot_config);
        assert!(s.hosts.iter().all(|h| h.kind == HostType::Invalid));
        assert!(s.mounts.iter().all(|m| m.host_slot.is_none()));
    }

    #[test]
    fn test_device_enable_flags() {
        let mut s = Settings::default();
        assert!(s.set_device_enabled(9, false));
        assert!(!s.device_enabled(9));
        assert!(!s.device_enabled[1]);
        assert!(s.device_enabled(8));
        // Outside the persisted range
        assert!(!s.set_device_enabled(4, false));
        assert!(!s.set_device_enabled(30, false));
        assert!(s.device_enabled(30));
    }
}
