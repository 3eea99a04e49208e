//! Binary layouts of RAW payloads and responses
//!
//! Every block is built field by field. Multi-byte integers are
//! little-endian, strings are NUL padded to their field width.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Datelike, Timelike};

use super::dir_flags::EntryFlags;
use super::{MAX_DISK_DEVICES, MAX_DISPLAY_FILENAME_LEN, MAX_HOSTNAME_LEN, MAX_HOSTS};
use crate::error::{Error, Result};
use crate::media::MediaType;
use crate::platform::{DirEntry, NetConfig, NetInfo, ScanResult};
use crate::util::until_nul;

/// SSID field width (32 characters plus NUL)
pub const SSID_FIELD_LEN: usize = 33;
/// Passphrase field width
pub const PASSPHRASE_FIELD_LEN: usize = 64;
/// Hostname field width in the adapter config block
pub const ADAPTER_HOSTNAME_LEN: usize = 64;
/// Version field width in the adapter config block
pub const VERSION_FIELD_LEN: usize = 15;
/// Size of the READ/WRITE_HOST_SLOTS block
pub const HOST_BLOCK_LEN: usize = MAX_HOSTS * MAX_HOSTNAME_LEN;
/// Size of one device slot record
pub const DEVICE_RECORD_LEN: usize = 2 + MAX_DISPLAY_FILENAME_LEN;
/// Size of the READ/WRITE_DEVICE_SLOTS block
pub const DEVICE_BLOCK_LEN: usize = MAX_DISK_DEVICES * DEVICE_RECORD_LEN;
/// Size of the extended directory entry record
pub const DIR_ENTRY_META_LEN: usize = 10;
/// Size of the basic adapter config block
pub const ADAPTER_CONFIG_LEN: usize =
    SSID_FIELD_LEN + ADAPTER_HOSTNAME_LEN + 4 * 4 + 6 + 6 + VERSION_FIELD_LEN;
/// Size of the extended adapter config block
pub const ADAPTER_CONFIG_EXTENDED_LEN: usize = ADAPTER_CONFIG_LEN + 4 * 16 + 2 * 18;

/// Append `bytes` cut or NUL padded to exactly `width` bytes
pub fn put_padded(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    let n = bytes.len().min(width);
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (width - n), 0);
}

/// Append `s` as a NUL terminated string in a `width` byte field
///
/// At most `width - 1` bytes of `s` are kept.
pub fn put_cstr(out: &mut Vec<u8>, s: &str, width: usize) {
    put_padded(out, s.as_bytes(), width.saturating_sub(1));
    out.push(0);
}

/// Read a NUL padded string field
pub fn read_fixed_str(field: &[u8]) -> String {
    String::from_utf8_lossy(until_nul(field)).into_owned()
}

/// GET_SSID response: `ssid[33] password[64]`
pub fn encode_net_config(cfg: &NetConfig) -> Vec<u8> {
    let mut out = Vec::with_capacity(SSID_FIELD_LEN + PASSPHRASE_FIELD_LEN);
    put_padded(&mut out, cfg.ssid.as_bytes(), SSID_FIELD_LEN);
    put_padded(&mut out, cfg.password.as_bytes(), PASSPHRASE_FIELD_LEN);
    out
}

/// SET_SSID payload: `ssid NUL password [NUL]`
pub fn decode_set_ssid(payload: &[u8]) -> NetConfig {
    let ssid = until_nul(payload);
    let rest = payload.get(ssid.len() + 1..).unwrap_or(&[]);
    NetConfig {
        ssid: String::from_utf8_lossy(ssid).into_owned(),
        password: read_fixed_str(rest),
    }
}

/// GET_SCAN_RESULT response: `ssid[33] rssi`
pub fn encode_scan_result(result: &ScanResult) -> Vec<u8> {
    let mut out = Vec::with_capacity(SSID_FIELD_LEN + 1);
    put_padded(&mut out, result.ssid.as_bytes(), SSID_FIELD_LEN);
    out.push(result.rssi as u8);
    out
}

/// Adapter configuration as reported to the host computer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Interface details; SSID and hostname read `NOT CONNECTED` when offline
    pub net: NetInfo,
    /// Firmware version
    pub version: String,
}

impl AdapterConfig {
    /// GET_ADAPTERCONFIG layout
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADAPTER_CONFIG_LEN);
        let n = &self.net;
        put_cstr(&mut out, &n.ssid, SSID_FIELD_LEN);
        put_cstr(&mut out, &n.hostname, ADAPTER_HOSTNAME_LEN);
        out.extend_from_slice(&n.ip);
        out.extend_from_slice(&n.gateway);
        out.extend_from_slice(&n.netmask);
        out.extend_from_slice(&n.dns);
        out.extend_from_slice(&n.mac);
        out.extend_from_slice(&n.bssid);
        put_cstr(&mut out, &self.version, VERSION_FIELD_LEN);
        out
    }

    /// GET_ADAPTERCONFIG_EXTENDED layout: the basic block followed by the
    /// addresses rendered as text
    pub fn encode_extended(&self) -> Vec<u8> {
        let mut out = self.encode();
        out.reserve(ADAPTER_CONFIG_EXTENDED_LEN - out.len());
        let n = &self.net;
        put_cstr(&mut out, &dotted_quad(&n.ip), 16);
        put_cstr(&mut out, &dotted_quad(&n.gateway), 16);
        put_cstr(&mut out, &dotted_quad(&n.dns), 16);
        put_cstr(&mut out, &dotted_quad(&n.netmask), 16);
        put_cstr(&mut out, &colon_hex(&n.mac), 18);
        put_cstr(&mut out, &colon_hex(&n.bssid), 18);
        out
    }
}

/// `a.b.c.d`
pub fn dotted_quad(addr: &[u8; 4]) -> String {
    format!("{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
}

/// `AA:BB:CC:DD:EE:FF`
pub fn colon_hex(mac: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// READ_HOST_SLOTS response: eight NUL padded 32-byte hostnames
pub fn encode_host_block<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    let mut out = Vec::with_capacity(HOST_BLOCK_LEN);
    for name in names.into_iter().take(MAX_HOSTS) {
        put_padded(&mut out, name.as_bytes(), MAX_HOSTNAME_LEN);
    }
    out.resize(HOST_BLOCK_LEN, 0);
    out
}

/// WRITE_HOST_SLOTS payload
///
/// Only a block of exactly [`HOST_BLOCK_LEN`] bytes is accepted. The last
/// byte of each field is ignored so every name stays NUL terminated.
pub fn decode_host_block(payload: &[u8]) -> Result<Vec<String>> {
    if payload.len() != HOST_BLOCK_LEN {
        return Err(Error::Parameter("payload size incorrect"));
    }
    Ok(payload
        .chunks_exact(MAX_HOSTNAME_LEN)
        .map(|field| read_fixed_str(&field[..MAX_HOSTNAME_LEN - 1]))
        .collect())
}

/// One record of the device slot block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSlotRecord {
    /// Host slot, [`INVALID_HOST_SLOT`](super::INVALID_HOST_SLOT) if none
    pub host_slot: u8,
    /// Access mode byte
    pub mode: u8,
    /// Filename (first 36 bytes only)
    pub filename: String,
}

/// READ_DEVICE_SLOTS response: eight `{host, mode, name[36]}` records
pub fn encode_device_block(records: &[DeviceSlotRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(DEVICE_BLOCK_LEN);
    for rec in records.iter().take(MAX_DISK_DEVICES) {
        out.push(rec.host_slot);
        out.push(rec.mode);
        put_padded(&mut out, rec.filename.as_bytes(), MAX_DISPLAY_FILENAME_LEN);
    }
    out
}

/// WRITE_DEVICE_SLOTS payload
pub fn decode_device_block(payload: &[u8]) -> Result<Vec<DeviceSlotRecord>> {
    if payload.len() != DEVICE_BLOCK_LEN {
        return Err(Error::Parameter("payload size incorrect"));
    }
    Ok(payload
        .chunks_exact(DEVICE_RECORD_LEN)
        .map(|rec| DeviceSlotRecord {
            host_slot: rec[0],
            mode: rec[1],
            filename: read_fixed_str(&rec[2..]),
        })
        .collect())
}

/// Extended READ_DIR_ENTRY record
///
/// `[year-1900, month, day, hour, minute, second, size lo, size hi, flags,
/// media type]`, times in UTC. Sizes above 65535 read as 65535.
pub fn encode_dir_entry_meta(entry: &DirEntry, truncated: bool) -> [u8; DIR_ENTRY_META_LEN] {
    let t = DateTime::from_timestamp(entry.modified, 0).unwrap_or_default();
    let size = entry.size.min(u16::MAX as u32) as u16;

    let mut flags = EntryFlags::empty();
    flags.set(EntryFlags::DIR, entry.is_dir);
    flags.set(EntryFlags::TRUNCATED, truncated);

    let [size_lo, size_hi] = size.to_le_bytes();
    [
        (t.year() - 1900).clamp(0, 255) as u8,
        t.month() as u8,
        t.day() as u8,
        t.hour() as u8,
        t.minute() as u8,
        t.second() as u8,
        size_lo,
        size_hi,
        flags.bits(),
        MediaType::from_filename(&entry.name) as u8,
    ]
}

/// OPEN_APPKEY payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAppKeyParams {
    /// Creator id
    pub creator: u16,
    /// Application id
    pub app: u8,
    /// Key id
    pub key: u8,
    /// Mode byte
    pub mode: u8,
    /// Reserved byte
    pub reserved: u8,
}

/// Decode `creator:u16 app key mode reserved`
pub fn decode_open_app_key(payload: &[u8]) -> Result<OpenAppKeyParams> {
    match payload {
        [c0, c1, app, key, mode, reserved, ..] => Ok(OpenAppKeyParams {
            creator: u16::from_le_bytes([*c0, *c1]),
            app: *app,
            key: *key,
            mode: *mode,
            reserved: *reserved,
        }),
        _ => Err(Error::Parameter("invalid app key parameters")),
    }
}
