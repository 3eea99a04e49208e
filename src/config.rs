//! TOML configuration store
//!
//! Settings are kept in a single file:
//!
//! ```toml
//! boot_config = true
//! boot_device = 0
//! device_enabled = [true, true, true, true, true, true, true, true]
//!
//! [[hosts]]
//! name = "SD"
//! kind = "sd"
//!
//! [[mounts]]
//! host_slot = 0
//! path = "/games/elite.d64"
//! mode = "read"
//!
//! [wifi]
//! enabled = true
//! ssid = "retro"
//! passphrase = "commodore"
//! ```
//!
//! Missing keys take their default values. A missing file loads defaults.

use std::fs;
use std::path::{Path, PathBuf};

use iecfuji_core::platform::{ConfigStore, Settings};

use crate::error::Result;

/// [`ConfigStore`] backed by a TOML file
#[derive(Debug, Clone)]
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    /// Store at `path`; the file is created on the first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::info!("config: {} not found, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        log::debug!("config: saved {}", self.path.display());
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&mut self) -> iecfuji_core::Result<Settings> {
        Ok(self.read()?)
    }

    fn save(&mut self, settings: &Settings) -> iecfuji_core::Result<()> {
        Ok(self.write(settings)?)
    }
}
