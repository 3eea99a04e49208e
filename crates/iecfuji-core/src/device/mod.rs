//! The control device
//!
//! [`FujiDevice`] owns every piece of engine state and answers one frame at a
//! time. Each call to [`FujiDevice::process_frame`] produces exactly one
//! [`Reply`]:
//!
//! ```text
//! payload ─► Decoder ─► RAW immediate / RAW continuation / BASIC dispatch
//!                         │
//!                         ▼
//!          slots, sessions, platform collaborators
//!                         │
//!                         ▼
//!          Response (text | binary) + Status ─► Reply
//! ```
//!
//! Handlers never panic on bad input. Every failure becomes a status code and
//! message, and BASIC callers also get the message as their text response.

mod basic;
mod ops;
mod raw;

use alloc::string::String;

use crate::error::{Error, Result, STATUS_OK};
use crate::frame::{CommandState, Decoder, Frame};
use crate::platform::{Peripherals, Settings};
use crate::protocol::FIRST_DRIVE_DEVICE;
use crate::response::{Reply, Response, Status, WireFormat};
use crate::session::{AppKeySession, DirectorySession, HashSession};
use crate::slots::SlotRegistry;
use crate::util::hex_preview;

/// The Fuji control device
pub struct FujiDevice {
    p: Peripherals,
    settings: Settings,
    slots: SlotRegistry,
    dir: DirectorySession,
    appkey: AppKeySession,
    hash: HashSession,
    decoder: Decoder,
    response: Response,
    status: Status,
    boot_config: bool,
    boot_device: u8,
}

impl FujiDevice {
    /// Create the device, loading settings and filling the slot tables
    ///
    /// Unreadable settings are replaced by defaults.
    pub fn new(mut p: Peripherals) -> Self {
        let settings = match p.config.load() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("fuji: could not load settings, using defaults: {}", e);
                Settings::default()
            }
        };

        let mut slots = SlotRegistry::new();
        slots.populate_from_settings(&settings, &mut *p.drives);

        for (i, &enabled) in settings.device_enabled.iter().enumerate() {
            p.drives.set_active(FIRST_DRIVE_DEVICE + i as u8, enabled);
        }

        Self {
            boot_config: settings.boot_config,
            boot_device: settings.boot_device,
            p,
            settings,
            slots,
            dir: DirectorySession::default(),
            appkey: AppKeySession::default(),
            hash: HashSession::default(),
            decoder: Decoder::new(),
            response: Response::default(),
            status: Status::default(),
        }
    }

    /// Handle one inbound frame
    pub fn process_frame(&mut self, payload: &[u8]) -> Reply {
        self.response.clear();

        let format = match self.decoder.decode(payload) {
            Frame::Empty => WireFormat::Basic,
            Frame::RawUnsupported(op) => {
                log::debug!("fuji: unsupported RAW command 0x{:02x}", op);
                self.fail(&Error::UnsupportedCommand(op), WireFormat::Raw);
                WireFormat::Raw
            }
            Frame::RawOpen(op) => {
                log::debug!("fuji: RAW command: {} ({})", hex_preview(payload), op.name());
                let handled = self.dispatch_immediate(op, payload);
                self.decoder.immediate_done(handled);
                WireFormat::Raw
            }
            Frame::Continuation(op, data) => {
                log::debug!("fuji: RAW data for {}: {}", op.name(), hex_preview(data));
                let handled = self.dispatch_continuation(op, data);
                self.decoder.continuation_done(handled);
                WireFormat::Raw
            }
            Frame::Basic(line) => {
                log::debug!("fuji: BASIC command: {}", String::from_utf8_lossy(payload));
                self.dispatch_basic(&line);
                WireFormat::Basic
            }
        };

        self.status.connected = self.p.network.connected();
        let data = self.response.flush(format);
        Reply {
            format,
            data,
            status: self.status.clone(),
        }
    }

    /// Bus-level reset: forget the pending command, responses and sessions
    pub fn bus_reset(&mut self) {
        log::debug!("fuji: bus reset");
        self.decoder.reset();
        self.response.clear();
        self.dir.close(&mut self.slots);
        self.appkey.close();
    }

    /// Status left by the last command
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Pending command state
    pub fn command_state(&self) -> CommandState {
        self.decoder.state()
    }

    /// Slot tables
    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    /// Directory cursor
    pub fn directory(&self) -> &DirectorySession {
        &self.dir
    }

    /// App-key session
    pub fn app_key(&self) -> &AppKeySession {
        &self.appkey
    }

    /// Hash accumulator
    pub fn hash(&self) -> &HashSession {
        &self.hash
    }

    /// In-memory copy of the settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether the configuration disk should boot
    pub fn boot_config(&self) -> bool {
        self.boot_config
    }

    /// Boot device chosen with SET_BOOT_MODE
    pub fn boot_device(&self) -> u8 {
        self.boot_device
    }

    fn succeed(&mut self, message: &str) {
        self.status.set(STATUS_OK, message);
    }

    fn fail(&mut self, err: &Error, format: WireFormat) {
        log::warn!("fuji: command failed: {}", err);
        self.status.set_error(err);
        if format == WireFormat::Basic {
            self.response.set_text(&self.status.message);
        }
    }

    fn finish(&mut self, result: Result<()>, format: WireFormat) {
        if let Err(e) = result {
            self.fail(&e, format);
        }
    }
}
