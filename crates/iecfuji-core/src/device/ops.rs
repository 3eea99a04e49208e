//! Device operations shared by the RAW and BASIC front ends
//!
//! Each operation validates its arguments, updates slots or sessions, and
//! persists settings where the change should survive a restart. None of them
//! touch the response buffers or the status; that is left to the dispatchers.

use alloc::string::String;
use alloc::vec::Vec;

use super::FujiDevice;
use crate::error::{Error, Result};
use crate::media::MediaType;
use crate::platform::{AccessMode, NetConfig, ScanResult};
use crate::protocol::wire::{
    decode_device_block, decode_host_block, dotted_quad, encode_device_block, encode_host_block,
    AdapterConfig,
};
use crate::protocol::{
    INVALID_DIRPOS, INVALID_HOST_SLOT, MAX_PASSPHRASE_LEN, MAX_SSID_LEN, SCAN_SETTLE_MS,
    WIFI_CONNECTED, WIFI_DISCONNECTED, WIFI_RESTART_SETTLE_MS,
};
use crate::session::{AppKey, HashAlgorithm};
use crate::slots::SlotRegistry;

const NOT_CONNECTED: &str = "NOT CONNECTED";

impl FujiDevice {
    /// Write the slot tables into the settings and persist them
    pub fn save_settings(&mut self) -> Result<()> {
        self.sync_settings();
        self.p.config.save(&self.settings)
    }

    /// Mirror the slot tables and boot flags into the in-memory settings
    fn sync_settings(&mut self) {
        self.slots.write_settings(&mut self.settings);
        self.settings.boot_config = self.boot_config;
        self.settings.boot_device = self.boot_device;
    }

    fn reload_slots(&mut self) {
        self.slots
            .populate_from_settings(&self.settings, &mut *self.p.drives);
    }

    /// Reboot the device
    pub fn reset_device(&mut self) {
        log::info!("fuji: rebooting");
        self.p.system.reboot();
    }

    // Network

    /// Scan for networks, then give the radio time to settle
    pub fn scan_networks(&mut self) -> u8 {
        let count = self.p.network.scan_networks();
        log::debug!("fuji: scan found {} networks", count);
        self.p.system.delay_ms(SCAN_SETTLE_MS);
        count
    }

    /// Result `index` of the last scan; empty if there is none
    pub fn scan_result(&self, index: u8) -> ScanResult {
        self.p.network.scan_result(index).unwrap_or_default()
    }

    /// Stored network credentials
    pub fn get_ssid(&self) -> NetConfig {
        NetConfig {
            ssid: self.settings.wifi.ssid.clone(),
            password: self.settings.wifi.passphrase.clone(),
        }
    }

    /// Try `cfg`, store it when it works and `store` is set, then restart WiFi
    ///
    /// The restart and settle delay happen whether or not the test succeeded.
    pub fn set_ssid(&mut self, cfg: &NetConfig, store: bool) -> Result<()> {
        if cfg.ssid.is_empty() || cfg.ssid.len() > MAX_SSID_LEN {
            return Err(Error::Parameter("invalid ssid"));
        }
        if cfg.password.len() > MAX_PASSPHRASE_LEN {
            return Err(Error::Parameter("invalid passphrase"));
        }

        log::info!("fuji: testing connection to {:?}", cfg.ssid);
        let tested = self.p.network.test_connect(&cfg.ssid, &cfg.password);
        if tested.is_ok() && store {
            self.settings.wifi.ssid = cfg.ssid.clone();
            self.settings.wifi.passphrase = cfg.password.clone();
            self.save_settings()?;
        }

        self.p.network.restart(&self.settings.wifi);
        self.p.system.delay_ms(WIFI_RESTART_SETTLE_MS);

        tested.map_err(|e| {
            log::warn!("fuji: could not connect to {:?}: {}", cfg.ssid, e);
            Error::NotConnected
        })
    }

    /// Resolve a scanned network from the CRC-8 of its name
    pub fn network_name_by_crc8(&self, crc: u8) -> Option<String> {
        self.p.network.network_name_by_crc8(crc)
    }

    /// WiFi status byte: 3 connected, 6 not
    pub fn wifi_status(&self) -> u8 {
        if self.p.network.connected() {
            WIFI_CONNECTED
        } else {
            WIFI_DISCONNECTED
        }
    }

    /// Whether WiFi is enabled in settings
    pub fn wifi_enabled(&self) -> bool {
        self.settings.wifi.enabled
    }

    /// Store the WiFi enable flag
    pub fn set_wifi_enabled(&mut self, enabled: bool) -> Result<()> {
        self.settings.wifi.enabled = enabled;
        self.save_settings()
    }

    /// Adapter details as shown to the host computer
    pub fn adapter_config(&self) -> AdapterConfig {
        let mut net = self.p.network.info();
        if !self.p.network.connected() {
            let mac = net.mac;
            net = Default::default();
            net.mac = mac;
            net.ssid = NOT_CONNECTED.into();
            net.hostname = NOT_CONNECTED.into();
        }
        AdapterConfig {
            net,
            version: self.p.system.version(),
        }
    }

    /// Local address as `a.b.c.d`
    pub fn local_ip(&self) -> String {
        dotted_quad(&self.p.network.info().ip)
    }

    // Boot

    /// Set the auto-boot flag
    pub fn set_boot_config(&mut self, enabled: bool) -> Result<()> {
        self.boot_config = enabled;
        self.save_settings()
    }

    /// Record the boot device; also turns on boot-config
    pub fn set_boot_mode(&mut self, device: u8) -> Result<()> {
        self.boot_device = device;
        self.boot_config = true;
        self.save_settings()
    }

    /// Enable or disable bus devices
    pub fn set_devices_active(&mut self, devices: &[u8], active: bool) -> Result<()> {
        for &device in devices {
            if self.p.drives.set_active(device, active) {
                log::info!("fuji: device {} {}", device, if active { "enabled" } else { "disabled" });
                self.settings.set_device_enabled(device, active);
            } else {
                log::warn!("fuji: no device {} to toggle", device);
            }
        }
        self.save_settings()
    }

    // Hosts

    /// Mount host slot `slot`
    pub fn mount_host(&mut self, slot: u8) -> Result<()> {
        SlotRegistry::check_host(slot)?;
        self.reload_slots();
        self.slots.mount_host(slot, &mut *self.p.hosts)
    }

    /// Unmount host slot `slot`
    pub fn unmount_host(&mut self, slot: u8) -> Result<()> {
        SlotRegistry::check_host(slot)?;
        if self.dir.open_on() == Some(slot) {
            self.dir.close(&mut self.slots);
        }
        self.slots.unmount_host(slot)
    }

    /// Hostname in `slot`
    pub fn hostname(&self, slot: u8) -> Result<&str> {
        Ok(self.slots.host(slot)?.hostname())
    }

    /// Change the hostname in `slot` and persist it
    pub fn set_hostname(&mut self, slot: u8, name: &str) -> Result<()> {
        self.slots.host_mut(slot)?.set_hostname(name);
        self.dir.forget_host(slot);
        self.save_settings()
    }

    /// READ_HOST_SLOTS block
    pub fn host_block(&self) -> Vec<u8> {
        encode_host_block(self.slots.hosts().iter().map(|h| h.hostname()))
    }

    /// Replace all hostnames from a WRITE_HOST_SLOTS block
    pub fn write_host_block(&mut self, payload: &[u8]) -> Result<()> {
        let names = decode_host_block(payload)?;
        for (i, name) in names.iter().enumerate() {
            let slot = self.slots.host_mut(i as u8)?;
            if slot.hostname() != name {
                slot.set_hostname(name);
                self.dir.forget_host(i as u8);
            }
        }
        self.save_settings()
    }

    // Disks

    /// Open the image configured in `slot`
    pub fn disk_image_mount(&mut self, slot: u8, mode: AccessMode) -> Result<MediaType> {
        SlotRegistry::check_disk(slot)?;
        self.reload_slots();
        let kind = self
            .slots
            .mount_disk(slot, mode, &mut *self.p.hosts, &mut *self.p.drives)?;
        log::info!("fuji: mounted slot {} as {:?}", slot, kind);
        self.boot_config = false;
        self.save_settings()?;
        Ok(kind)
    }

    /// Detach and clear `slot`, then persist the emptied slot
    pub fn disk_image_umount(&mut self, slot: u8) -> Result<()> {
        self.slots.unmount_disk(slot, &mut *self.p.drives)?;
        self.save_settings()
    }

    /// Mount every slot that names an image
    ///
    /// Stops at the first failure; slots already mounted stay mounted.
    pub fn mount_all(&mut self) -> Result<()> {
        let mut any = false;
        for i in 0..self.slots.disks().len() as u8 {
            let disk = self.slots.disk(i)?;
            if !disk.has_media() {
                continue;
            }
            any = true;
            let mode = disk.mode();
            if let Err(e) = self
                .slots
                .mount_disk(i, mode, &mut *self.p.hosts, &mut *self.p.drives)
            {
                log::warn!("fuji: mount all stopped at slot {}: {}", i, e);
                if let Err(save) = self.save_settings() {
                    log::warn!("fuji: cannot save settings: {}", save);
                }
                return Err(e);
            }
            self.boot_config = false;
        }
        if !any {
            log::debug!("fuji: no slots to mount");
            self.boot_config = false;
        }
        self.save_settings()
    }

    /// Point disk slot `slot` at `filename` on `host` and persist it
    ///
    /// An empty name leaves the slot without a host, so mount-all skips it.
    pub fn set_device_filename(&mut self, slot: u8, host: u8, mode: AccessMode, filename: &str) -> Result<()> {
        let host = (host != INVALID_HOST_SLOT).then_some(host);
        self.slots
            .assign_disk(slot, host, mode, filename, &mut *self.p.drives)?;
        log::debug!("fuji: slot {} -> {:?} on host {:?}", slot, filename, host);
        self.save_settings()
    }

    /// Full image path in `slot`
    pub fn device_filename(&self, slot: u8) -> Result<&str> {
        Ok(self.slots.disk(slot)?.filename())
    }

    /// READ_DEVICE_SLOTS block
    pub fn device_block(&self) -> Vec<u8> {
        encode_device_block(&self.slots.device_records())
    }

    /// Replace every disk slot from a WRITE_DEVICE_SLOTS block
    pub fn write_device_block(&mut self, payload: &[u8]) -> Result<()> {
        let records = decode_device_block(payload)?;
        let hosts = records
            .iter()
            .map(|rec| match rec.host_slot {
                INVALID_HOST_SLOT => Ok(None),
                hs => SlotRegistry::check_host(hs).map(|_| Some(hs)),
            })
            .collect::<Result<Vec<_>>>()?;

        for (i, (rec, host)) in records.iter().zip(hosts).enumerate() {
            self.slots.assign_disk(
                i as u8,
                host,
                AccessMode::from_byte(rec.mode),
                &rec.filename,
                &mut *self.p.drives,
            )?;
        }
        self.save_settings()
    }

    // Directory

    /// Open a listing on host `host`
    pub fn open_directory(&mut self, host: u8, path: &str, pattern: Option<&str>) -> Result<()> {
        self.dir.open(&mut self.slots, host, path, pattern)
    }

    /// Next directory entry, or the end sentinel
    pub fn read_directory_entry(&mut self, maxlen: u8, options: u8) -> Result<Vec<u8>> {
        self.dir.read_entry(&mut self.slots, maxlen, options)
    }

    /// Cursor position; [`INVALID_DIRPOS`] if the host cannot tell
    pub fn directory_position(&mut self) -> Result<u16> {
        let pos = self.dir.tell(&mut self.slots)?;
        if pos == INVALID_DIRPOS {
            log::debug!("fuji: host reported no directory position");
        }
        Ok(pos)
    }

    /// Move the cursor
    pub fn set_directory_position(&mut self, pos: u16) -> Result<()> {
        self.dir.seek(&mut self.slots, pos)
    }

    /// Close the listing
    pub fn close_directory(&mut self) {
        self.dir.close(&mut self.slots);
    }

    // App keys

    /// Start an app-key session
    pub fn open_app_key(&mut self, key: AppKey) {
        self.appkey.open(key);
    }

    /// Write the open key
    pub fn write_app_key(&mut self, data: &[u8]) -> Result<usize> {
        self.appkey.write(&mut *self.p.storage, data)
    }

    /// Read the open key
    pub fn read_app_key(&mut self) -> Result<Vec<u8>> {
        self.appkey.read(&mut *self.p.storage)
    }

    /// End the app-key session
    pub fn close_app_key(&mut self) {
        self.appkey.close();
    }

    // Hashing

    /// Append to the hash input
    pub fn hash_input(&mut self, data: &[u8]) {
        self.hash.input(data);
    }

    /// Digest the input, optionally clearing it
    pub fn hash_compute(&mut self, clear_input: bool, algorithm: HashAlgorithm) {
        self.hash.compute(&*self.p.hasher, algorithm, clear_input);
    }

    /// Digest length in bytes or hex characters
    pub fn hash_length(&self, is_hex: bool) -> u8 {
        self.hash.length(is_hex)
    }

    /// Digest bytes or their hex rendering
    pub fn hash_output(&self, is_hex: bool) -> Vec<u8> {
        self.hash.output(is_hex)
    }

    /// Drop the input and digest
    pub fn hash_clear(&mut self) {
        self.hash.clear();
    }
}
