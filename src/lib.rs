//! iecfuji - Std-backed collaborators for the IEC fuji control device
//!
//! [`iecfuji_core`] holds the protocol engine and stays `no_std`. This crate
//! supplies the collaborators a desktop machine can offer and wires them into
//! a ready [`FujiDevice`]:
//!
//! - hosts served from local directories ([`LocalHosts`])
//! - settings in a TOML file ([`TomlConfigStore`])
//! - app keys in a directory standing in for the SD card ([`SdDirectory`])
//! - a std clock, an offline network and a drive table ([`StdSystem`],
//!   [`OfflineNetwork`], [`DriveTracker`])
//!
//! A data directory is laid out as:
//!
//! ```text
//! <root>/fuji.toml          settings
//! <root>/sd/                the SD host, also holds /FujiNet app keys
//! <root>/hosts/<hostname>/  every other host
//! ```

mod config;
mod error;
mod host;
mod storage;
mod system;

use std::path::{Path, PathBuf};

pub use config::TomlConfigStore;
pub use error::{BackendError, Result};
pub use host::{LocalFs, LocalHosts};
pub use storage::SdDirectory;
pub use system::{DriveImage, DriveTracker, OfflineNetwork, StdSystem};

pub use iecfuji_core::{FujiDevice, Reply, Status, WireFormat};

use iecfuji_core::platform::Peripherals;
use iecfuji_core::session::RustCryptoHash;

/// Settings file name inside the data directory
pub const CONFIG_FILE: &str = "fuji.toml";
/// SD directory name inside the data directory
pub const SD_DIR: &str = "sd";
/// Directory holding the other hosts
pub const HOSTS_DIR: &str = "hosts";

/// Handles kept by the caller after wiring a local device
#[derive(Debug, Clone)]
pub struct LocalHandles {
    /// Data directory
    pub root: PathBuf,
    /// Drive table shared with the device
    pub drives: DriveTracker,
    /// Reboot flag shared with the device
    pub system: StdSystem,
}

/// Build a device over the data directory `root`
///
/// The SD and hosts directories are created if missing.
pub fn open_local_device(root: impl AsRef<Path>) -> Result<(FujiDevice, LocalHandles)> {
    let root = root.as_ref().to_path_buf();
    let sd = root.join(SD_DIR);
    let hosts = root.join(HOSTS_DIR);
    std::fs::create_dir_all(&sd)?;
    std::fs::create_dir_all(&hosts)?;
    log::info!("fuji: data directory {}", root.display());

    let drives = DriveTracker::new();
    let system = StdSystem::new();
    let peripherals = Peripherals {
        hosts: Box::new(LocalHosts::new(&sd, &hosts)),
        config: Box::new(TomlConfigStore::new(root.join(CONFIG_FILE))),
        network: Box::new(OfflineNetwork::new("iecfuji")),
        storage: Box::new(SdDirectory::new(&sd)),
        drives: Box::new(drives.clone()),
        system: Box::new(system.clone()),
        hasher: Box::new(RustCryptoHash),
    };

    Ok((
        FujiDevice::new(peripherals),
        LocalHandles {
            root,
            drives,
            system,
        },
    ))
}
