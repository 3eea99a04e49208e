//! Disk drive emulation stand-in

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use iecfuji_core::media::MediaType;
use iecfuji_core::platform::DriveBank;
use iecfuji_core::protocol::{FIRST_DRIVE_DEVICE, MAX_DISK_DEVICES};

/// What a drive unit currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedDisk {
    /// Image path
    pub filename: String,
    /// Image size in bytes
    pub size: u64,
    /// Media type the drive settled on
    pub media: MediaType,
}

#[derive(Debug, Default)]
struct DriveState {
    inserted: BTreeMap<u8, InsertedDisk>,
    active: BTreeMap<u8, bool>,
}

/// Records what is inserted in each unit and which devices are active
#[derive(Debug, Clone, Default)]
pub struct DummyDrives {
    state: Rc<RefCell<DriveState>>,
}

impl DummyDrives {
    /// Empty drives; every device active
    pub fn new() -> Self {
        Self::default()
    }

    /// Disk in `unit`
    pub fn inserted(&self, unit: u8) -> Option<InsertedDisk> {
        self.state.borrow().inserted.get(&unit).cloned()
    }

    /// Whether bus device `device` is active
    pub fn is_active(&self, device: u8) -> bool {
        self.state.borrow().active.get(&device).copied().unwrap_or(true)
    }
}

impl DriveBank for DummyDrives {
    fn mount(&mut self, unit: u8, filename: &str, size: u64, detected: MediaType) -> MediaType {
        self.state.borrow_mut().inserted.insert(
            unit,
            InsertedDisk {
                filename: filename.to_string(),
                size,
                media: detected,
            },
        );
        detected
    }

    fn unmount(&mut self, unit: u8) {
        self.state.borrow_mut().inserted.remove(&unit);
    }

    fn set_active(&mut self, device: u8, active: bool) -> bool {
        let first = FIRST_DRIVE_DEVICE;
        if !(first..first + MAX_DISK_DEVICES as u8).contains(&device) {
            return false;
        }
        self.state.borrow_mut().active.insert(device, active);
        true
    }
}
