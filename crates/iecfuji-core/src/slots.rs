//! Host and disk slot tables
//!
//! Both tables are fixed arrays indexed by the slot number the host computer
//! sends. Every access goes through a range-checked accessor; a slot that is
//! "emptied" is reset in place rather than removed.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::{Error, Result, SlotKind};
use crate::media::MediaType;
use crate::platform::{
    AccessMode, DriveBank, HostFs, HostProvider, HostSettings, HostType, ImageFile, MountSettings,
    Settings,
};
use crate::protocol::wire::DeviceSlotRecord;
use crate::protocol::{
    INVALID_HOST_SLOT, MAX_DISK_DEVICES, MAX_FILENAME_LEN, MAX_HOSTNAME_LEN, MAX_HOSTS,
};

/// Copy as much of `src` as fits in `N - 1` bytes, stopping at a char boundary
fn bounded<const N: usize>(src: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in src.chars() {
        if out.len() + c.len_utf8() > N - 1 || out.push(c).is_err() {
            break;
        }
    }
    out
}

/// One host slot
#[derive(Default)]
pub struct HostSlot {
    hostname: heapless::String<MAX_HOSTNAME_LEN>,
    kind: HostType,
    fs: Option<Box<dyn HostFs>>,
}

impl HostSlot {
    /// Configured hostname, empty if unused
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Host type derived from the hostname
    pub fn kind(&self) -> HostType {
        self.kind
    }

    /// Whether the host filesystem is mounted
    pub fn is_mounted(&self) -> bool {
        self.fs.is_some()
    }

    /// Mounted filesystem
    pub fn fs_mut(&mut self) -> Option<&mut (dyn HostFs + 'static)> {
        self.fs.as_deref_mut()
    }

    /// Change the hostname, unmounting the previous host
    ///
    /// Names longer than 31 bytes are cut.
    pub fn set_hostname(&mut self, name: &str) {
        if let Err(e) = self.unmount() {
            log::warn!("fuji: unmounting {} failed: {}", self.hostname, e);
        }
        self.hostname = bounded(name);
        self.kind = HostType::from_hostname(&self.hostname);
    }

    /// Mount the host if it is not mounted yet
    pub fn mount(&mut self, provider: &mut dyn HostProvider) -> Result<()> {
        if self.fs.is_some() {
            return Ok(());
        }
        if self.kind == HostType::Invalid {
            return Err(Error::ResourceUnavailable("no host configured in slot"));
        }
        log::debug!("fuji: mounting host {} ({:?})", self.hostname, self.kind);
        self.fs = Some(provider.mount(&self.hostname, self.kind)?);
        Ok(())
    }

    /// Unmount the host; a no-op if it is not mounted
    pub fn unmount(&mut self) -> Result<()> {
        match self.fs.take() {
            Some(mut fs) => {
                fs.dir_close();
                fs.unmount()
            }
            None => Ok(()),
        }
    }
}

/// One disk slot
#[derive(Default)]
pub struct DiskSlot {
    filename: heapless::String<MAX_FILENAME_LEN>,
    host_slot: Option<u8>,
    mode: AccessMode,
    file: Option<Box<dyn ImageFile>>,
    disk_type: MediaType,
    size: u64,
}

impl DiskSlot {
    /// Image path on the host
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Host slot the image lives on
    pub fn host_slot(&self) -> Option<u8> {
        self.host_slot
    }

    /// Access mode
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Whether an image is open in this slot
    pub fn is_mounted(&self) -> bool {
        self.file.is_some()
    }

    /// Media type of the mounted image
    pub fn disk_type(&self) -> MediaType {
        self.disk_type
    }

    /// Size of the mounted image in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the slot names an image that could be mounted
    pub fn has_media(&self) -> bool {
        self.host_slot.is_some() && !self.filename.is_empty()
    }

    /// Clear every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn assign(&mut self, filename: &str, host_slot: Option<u8>, mode: AccessMode) {
        self.reset();
        self.filename = bounded(filename);
        self.host_slot = if filename.is_empty() { None } else { host_slot };
        self.mode = mode;
    }

    fn matches(&self, m: &MountSettings) -> bool {
        self.filename.as_str() == m.path && self.host_slot == m.host_slot && self.mode == m.mode
    }

    fn record(&self) -> DeviceSlotRecord {
        DeviceSlotRecord {
            host_slot: self.host_slot.unwrap_or(INVALID_HOST_SLOT),
            mode: self.mode.as_byte(),
            filename: self.filename.as_str().into(),
        }
    }
}

/// The host and disk slot tables
#[derive(Default)]
pub struct SlotRegistry {
    hosts: [HostSlot; MAX_HOSTS],
    disks: [DiskSlot; MAX_DISK_DEVICES],
}

impl SlotRegistry {
    /// Empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a range error unless `index` is a host slot
    pub fn check_host(index: u8) -> Result<usize> {
        let i = index as usize;
        if i < MAX_HOSTS {
            Ok(i)
        } else {
            Err(Error::SlotRange {
                kind: SlotKind::Host,
                index,
            })
        }
    }

    /// Fail with a range error unless `index` is a disk slot
    pub fn check_disk(index: u8) -> Result<usize> {
        let i = index as usize;
        if i < MAX_DISK_DEVICES {
            Ok(i)
        } else {
            Err(Error::SlotRange {
                kind: SlotKind::Device,
                index,
            })
        }
    }

    /// Host slot `index`
    pub fn host(&self, index: u8) -> Result<&HostSlot> {
        Ok(&self.hosts[Self::check_host(index)?])
    }

    /// Host slot `index`, mutably
    pub fn host_mut(&mut self, index: u8) -> Result<&mut HostSlot> {
        Ok(&mut self.hosts[Self::check_host(index)?])
    }

    /// Disk slot `index`
    pub fn disk(&self, index: u8) -> Result<&DiskSlot> {
        Ok(&self.disks[Self::check_disk(index)?])
    }

    /// All host slots
    pub fn hosts(&self) -> &[HostSlot] {
        &self.hosts
    }

    /// All disk slots
    pub fn disks(&self) -> &[DiskSlot] {
        &self.disks
    }

    /// Mount host `index`
    pub fn mount_host(&mut self, index: u8, provider: &mut dyn HostProvider) -> Result<()> {
        self.host_mut(index)?.mount(provider)
    }

    /// Unmount host `index`
    pub fn unmount_host(&mut self, index: u8) -> Result<()> {
        self.host_mut(index)?.unmount()
    }

    /// Open the image configured in disk slot `index` and hand it to the drive
    ///
    /// The owning host is mounted first if needed.
    pub fn mount_disk(
        &mut self,
        index: u8,
        mode: AccessMode,
        provider: &mut dyn HostProvider,
        drives: &mut dyn DriveBank,
    ) -> Result<MediaType> {
        let ds = Self::check_disk(index)?;
        let hs = self.disks[ds]
            .host_slot
            .ok_or(Error::Parameter("no host for device slot"))?;
        let hs = Self::check_host(hs)?;
        if self.disks[ds].filename.is_empty() {
            return Err(Error::Parameter("no filename for device slot"));
        }

        let host = &mut self.hosts[hs];
        host.mount(provider)?;
        let fs = host
            .fs
            .as_deref_mut()
            .ok_or(Error::ResourceUnavailable("host not mounted"))?;

        let disk = &mut self.disks[ds];
        log::debug!(
            "fuji: selecting '{}' from host #{} as {:?} on slot {}",
            disk.filename,
            hs,
            mode,
            ds
        );
        let file = fs.open_file(&disk.filename, mode)?;
        let size = file.size();
        let detected = MediaType::from_filename(&disk.filename);

        disk.disk_type = drives.mount(index, &disk.filename, size, detected);
        disk.file = Some(file);
        disk.mode = mode;
        disk.size = size;
        Ok(disk.disk_type)
    }

    /// Detach and clear disk slot `index`; succeeds on an empty slot
    pub fn unmount_disk(&mut self, index: u8, drives: &mut dyn DriveBank) -> Result<()> {
        let ds = Self::check_disk(index)?;
        drives.unmount(index);
        self.disks[ds].reset();
        Ok(())
    }

    /// Point disk slot `index` at `filename` on host `host_slot`
    ///
    /// An empty filename leaves the slot without a host, whatever `host_slot`
    /// says, so it is skipped by mount-all. A mounted image is detached first.
    pub fn assign_disk(
        &mut self,
        index: u8,
        host_slot: Option<u8>,
        mode: AccessMode,
        filename: &str,
        drives: &mut dyn DriveBank,
    ) -> Result<()> {
        let ds = Self::check_disk(index)?;
        if let Some(hs) = host_slot {
            Self::check_host(hs)?;
        }
        if filename.len() >= MAX_FILENAME_LEN {
            return Err(Error::Parameter("invalid filename - too long"));
        }
        if self.disks[ds].is_mounted() {
            drives.unmount(index);
        }
        self.disks[ds].assign(filename, host_slot, mode);
        Ok(())
    }

    /// Load slot contents from settings
    ///
    /// Slots whose configuration is unchanged keep their mounted host or
    /// open image.
    pub fn populate_from_settings(&mut self, settings: &Settings, drives: &mut dyn DriveBank) {
        for (slot, cfg) in self.hosts.iter_mut().zip(settings.hosts.iter()) {
            let name = if cfg.kind == HostType::Invalid {
                ""
            } else {
                cfg.name.as_str()
            };
            if slot.hostname.as_str() != name {
                slot.set_hostname(name);
            }
        }

        for (i, (slot, cfg)) in self.disks.iter_mut().zip(settings.mounts.iter()).enumerate() {
            let host_slot = cfg.host_slot.filter(|&h| (h as usize) < MAX_HOSTS);
            let wanted = MountSettings {
                host_slot,
                path: if host_slot.is_some() {
                    cfg.path.clone()
                } else {
                    Default::default()
                },
                mode: cfg.mode,
            };
            if slot.matches(&wanted) {
                continue;
            }
            if slot.is_mounted() {
                drives.unmount(i as u8);
            }
            slot.assign(&wanted.path, wanted.host_slot, wanted.mode);
        }
    }

    /// Store slot contents into settings
    pub fn write_settings(&self, settings: &mut Settings) {
        for (cfg, slot) in settings.hosts.iter_mut().zip(self.hosts.iter()) {
            *cfg = if slot.hostname.is_empty() {
                HostSettings::default()
            } else {
                HostSettings {
                    name: slot.hostname.as_str().into(),
                    kind: slot.kind,
                }
            };
        }

        for (cfg, slot) in settings.mounts.iter_mut().zip(self.disks.iter()) {
            *cfg = if slot.has_media() {
                MountSettings {
                    host_slot: slot.host_slot,
                    path: slot.filename.as_str().into(),
                    mode: slot.mode,
                }
            } else {
                MountSettings::default()
            };
        }
    }

    /// Device slot records for READ_DEVICE_SLOTS
    pub fn device_records(&self) -> Vec<DeviceSlotRecord> {
        self.disks.iter().map(DiskSlot::record).collect()
    }
}
