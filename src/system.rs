//! Host machine services: clock, version, offline network, drive bookkeeping

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use iecfuji_core::media::MediaType;
use iecfuji_core::platform::{DriveBank, NetInfo, Network, ScanResult, System, WifiSettings};
use iecfuji_core::protocol::{FIRST_DRIVE_DEVICE, MAX_DISK_DEVICES};

/// [`System`] on the host OS
///
/// A reboot cannot restart the process from inside the engine, so it is
/// recorded and left for the caller to act on.
#[derive(Debug, Clone, Default)]
pub struct StdSystem {
    reboot_requested: Rc<Cell<bool>>,
}

impl StdSystem {
    /// New system handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reboot was requested since the last call
    pub fn take_reboot_request(&self) -> bool {
        self.reboot_requested.replace(false)
    }
}

impl System for StdSystem {
    fn reboot(&mut self) {
        log::warn!("system: reboot requested");
        self.reboot_requested.set(true);
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// [`Network`] for a machine without a managed radio
///
/// Never associated; scans find nothing and connection tests fail.
#[derive(Debug, Clone, Default)]
pub struct OfflineNetwork {
    info: NetInfo,
}

impl OfflineNetwork {
    /// Offline network reporting `hostname`
    pub fn new(hostname: &str) -> Self {
        Self {
            info: NetInfo {
                hostname: hostname.to_string(),
                ..Default::default()
            },
        }
    }
}

impl Network for OfflineNetwork {
    fn connected(&self) -> bool {
        false
    }

    fn scan_networks(&mut self) -> u8 {
        0
    }

    fn scan_result(&self, _index: u8) -> Option<ScanResult> {
        None
    }

    fn test_connect(&mut self, ssid: &str, _password: &str) -> iecfuji_core::Result<()> {
        log::info!("network: no radio, cannot join {:?}", ssid);
        Err(iecfuji_core::Error::NotConnected)
    }

    fn restart(&mut self, wifi: &WifiSettings) {
        log::debug!("network: restart ignored (enabled={})", wifi.enabled);
    }

    fn info(&self) -> NetInfo {
        self.info.clone()
    }
}

/// What a drive unit holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveImage {
    /// Image path on its host
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// Media type
    pub media: MediaType,
}

#[derive(Debug, Default)]
struct DriveTable {
    units: BTreeMap<u8, DriveImage>,
    disabled: Vec<u8>,
}

/// [`DriveBank`] that only keeps track of what is inserted
///
/// Clones share the table, so a front end can see what the engine mounted.
#[derive(Debug, Clone, Default)]
pub struct DriveTracker {
    table: Rc<RefCell<DriveTable>>,
}

impl DriveTracker {
    /// Empty drives, all devices active
    pub fn new() -> Self {
        Self::default()
    }

    /// Image in `unit`
    pub fn image(&self, unit: u8) -> Option<DriveImage> {
        self.table.borrow().units.get(&unit).cloned()
    }

    /// Whether bus device `device` is active
    pub fn is_active(&self, device: u8) -> bool {
        !self.table.borrow().disabled.contains(&device)
    }
}

impl DriveBank for DriveTracker {
    fn mount(&mut self, unit: u8, filename: &str, size: u64, detected: MediaType) -> MediaType {
        log::info!("drive {}: inserted {} ({:?}, {} bytes)", unit, filename, detected, size);
        self.table.borrow_mut().units.insert(
            unit,
            DriveImage {
                filename: filename.to_string(),
                size,
                media: detected,
            },
        );
        detected
    }

    fn unmount(&mut self, unit: u8) {
        if self.table.borrow_mut().units.remove(&unit).is_some() {
            log::info!("drive {}: ejected", unit);
        }
    }

    fn set_active(&mut self, device: u8, active: bool) -> bool {
        let range = FIRST_DRIVE_DEVICE..FIRST_DRIVE_DEVICE + MAX_DISK_DEVICES as u8;
        if !range.contains(&device) {
            return false;
        }
        let mut table = self.table.borrow_mut();
        table.disabled.retain(|&d| d != device);
        if !active {
            table.disabled.push(device);
        }
        true
    }
}
