//! Platform abstraction
//!
//! Capability traits, the data they exchange, and the persisted settings.

mod settings;
mod traits;
mod types;

use alloc::boxed::Box;

pub use settings::{HostSettings, MountSettings, Settings, WifiSettings, MAX_ENABLE_FLAGS};
pub use traits::{
    AppKeyStore, ConfigStore, DriveBank, HashPrimitive, HostFs, HostProvider, ImageFile, Network,
    System,
};
pub use types::{AccessMode, DirEntry, HostType, NetConfig, NetInfo, ScanResult};

/// Everything the device needs from the outside world
pub struct Peripherals {
    /// Host filesystems
    pub hosts: Box<dyn HostProvider>,
    /// Configuration storage
    pub config: Box<dyn ConfigStore>,
    /// Network stack
    pub network: Box<dyn Network>,
    /// SD-class app-key storage
    pub storage: Box<dyn AppKeyStore>,
    /// Drive emulation
    pub drives: Box<dyn DriveBank>,
    /// Board services
    pub system: Box<dyn System>,
    /// Digest primitive
    pub hasher: Box<dyn HashPrimitive>,
}
