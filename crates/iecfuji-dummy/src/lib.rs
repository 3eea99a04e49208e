//! iecfuji-dummy - In-memory collaborators for the IEC fuji control device
//!
//! Every capability the engine needs has a fake here. Each fake is a cheap
//! handle around shared state, so a test keeps one clone to inspect effects
//! (files written, settings saved, disks inserted) while the device owns the
//! other.
//!
//! ```ignore
//! let platform = DummyPlatform::new();
//! platform.hosts.add_file("SD", "/games/elite.d64", 174_848);
//! let mut device = platform.device();
//! let reply = device.process_frame(b"MOUNTHOST:0");
//! ```

mod config;
mod drives;
mod host;
mod network;
mod storage;
mod system;

#[cfg(test)]
mod tests;

pub use config::DummyConfig;
pub use drives::{DummyDrives, InsertedDisk};
pub use host::DummyHosts;
pub use network::{crc8, DummyNetwork};
pub use storage::DummySdCard;
pub use system::DummySystem;

use iecfuji_core::platform::Peripherals;
use iecfuji_core::session::RustCryptoHash;
use iecfuji_core::FujiDevice;

/// One handle to each fake
#[derive(Debug, Clone, Default)]
pub struct DummyPlatform {
    /// Host filesystems
    pub hosts: DummyHosts,
    /// Settings storage
    pub config: DummyConfig,
    /// WiFi
    pub network: DummyNetwork,
    /// SD card for app keys
    pub sd: DummySdCard,
    /// Drive units
    pub drives: DummyDrives,
    /// Reboot and delay recorder
    pub system: DummySystem,
}

impl DummyPlatform {
    /// Fresh fakes with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Peripherals sharing state with this platform
    pub fn peripherals(&self) -> Peripherals {
        Peripherals {
            hosts: Box::new(self.hosts.clone()),
            config: Box::new(self.config.clone()),
            network: Box::new(self.network.clone()),
            storage: Box::new(self.sd.clone()),
            drives: Box::new(self.drives.clone()),
            system: Box::new(self.system.clone()),
            hasher: Box::new(RustCryptoHash),
        }
    }

    /// A device wired to these fakes
    pub fn device(&self) -> FujiDevice {
        FujiDevice::new(self.peripherals())
    }
}
