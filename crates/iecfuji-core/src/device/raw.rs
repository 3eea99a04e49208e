//! RAW opcode handlers
//!
//! Immediate opcodes run on the open frame. The rest read their parameters
//! from the following frame; see the layouts in [`crate::protocol::wire`].

use alloc::string::String;
use alloc::vec;

use super::FujiDevice;
use crate::error::{Error, Result};
use crate::platform::AccessMode;
use crate::protocol::wire::{
    decode_open_app_key, decode_set_ssid, encode_net_config, encode_scan_result,
};
use crate::protocol::Opcode;
use crate::response::WireFormat;
use crate::session::{AppKey, AppKeyMode, HashAlgorithm};
use crate::util::{hex_preview, until_nul};

/// Byte `i` of a continuation payload
fn arg(data: &[u8], i: usize) -> Result<u8> {
    data.get(i)
        .copied()
        .ok_or(Error::Parameter("invalid # of parameters"))
}

/// The single `is_hex` byte of HASH_LENGTH and HASH_OUTPUT; only `1` means hex
fn hex_flag(data: &[u8]) -> Result<bool> {
    match *data {
        [flag] => Ok(flag == 1),
        _ => Err(Error::Parameter("input should be 1 byte")),
    }
}

impl FujiDevice {
    /// Run `op` if it needs no parameters
    ///
    /// Returns `false` when the opcode must wait for a continuation frame.
    pub(super) fn dispatch_immediate(&mut self, op: Opcode, frame: &[u8]) -> bool {
        if !op.is_immediate() {
            return false;
        }
        // STATUS reports the previous result, so it must not overwrite it
        if op != Opcode::Status {
            self.succeed("");
        }

        let result = match op {
            Opcode::Reset => {
                self.reset_device();
                Ok(())
            }
            Opcode::GetSsid => {
                let cfg = self.get_ssid();
                self.response.set_binary(encode_net_config(&cfg));
                Ok(())
            }
            Opcode::ScanNetworks => {
                let count = self.scan_networks();
                self.response.set_binary(vec![count]);
                Ok(())
            }
            Opcode::GetWifiStatus => {
                let status = self.wifi_status();
                self.response.set_binary(vec![status]);
                Ok(())
            }
            Opcode::GetWifiEnabled => {
                let enabled = self.wifi_enabled();
                self.response.set_binary(vec![enabled as u8]);
                Ok(())
            }
            Opcode::CloseDirectory => {
                self.close_directory();
                Ok(())
            }
            Opcode::ReadHostSlots => {
                let block = self.host_block();
                self.response.set_binary(block);
                Ok(())
            }
            Opcode::WriteHostSlots => self.write_host_block(frame),
            Opcode::ReadDeviceSlots => {
                let block = self.device_block();
                self.response.set_binary(block);
                Ok(())
            }
            Opcode::GetAdapterConfig => {
                let config = self.adapter_config().encode();
                self.response.set_binary(config);
                Ok(())
            }
            Opcode::GetAdapterConfigExtended => {
                let config = self.adapter_config().encode_extended();
                self.response.set_binary(config);
                Ok(())
            }
            Opcode::GetDirectoryPosition => self.directory_position().map(|pos| {
                self.response.set_binary(pos.to_le_bytes().to_vec());
            }),
            Opcode::ReadAppKey => self.read_app_key().map(|data| {
                self.response.set_binary(data);
            }),
            Opcode::CloseAppKey => {
                self.close_app_key();
                Ok(())
            }
            Opcode::Status => {
                self.response.set_binary(self.status.to_bytes());
                Ok(())
            }
            Opcode::MountAll => self.mount_all(),
            Opcode::HashClear => {
                self.hash_clear();
                Ok(())
            }
            _ => return false,
        };

        self.finish(result, WireFormat::Raw);
        true
    }

    /// Run the pending `op` with its parameter frame
    ///
    /// Returns `false` for an opcode with no parameter handler, leaving it
    /// pending. Only opcodes declined by [`dispatch_immediate`] are parked
    /// by the decoder, so every one of them has a handler here.
    ///
    /// [`dispatch_immediate`]: Self::dispatch_immediate
    pub(super) fn dispatch_continuation(&mut self, op: Opcode, data: &[u8]) -> bool {
        let result = match op {
            Opcode::GetScanResult => arg(data, 0).map(|i| {
                let result = self.scan_result(i);
                self.response.set_binary(encode_scan_result(&result));
            }),
            Opcode::SetSsid => {
                let cfg = decode_set_ssid(data);
                self.set_ssid(&cfg, true)
            }
            Opcode::MountHost => arg(data, 0).and_then(|hs| self.mount_host(hs)),
            Opcode::UnmountHost => arg(data, 0).and_then(|hs| self.unmount_host(hs)),
            Opcode::MountImage => self.raw_mount_image(data),
            Opcode::UnmountImage => arg(data, 0).and_then(|ds| self.disk_image_umount(ds)),
            Opcode::OpenDirectory => self.raw_open_directory(data),
            Opcode::ReadDirEntry => self.raw_read_dir_entry(data),
            Opcode::WriteDeviceSlots => self.write_device_block(data),
            Opcode::SetDirectoryPosition => match *data {
                [lo, hi, ..] => self.set_directory_position(u16::from_le_bytes([lo, hi])),
                _ => Err(Error::Parameter("invalid # of parameters")),
            },
            Opcode::SetDeviceFullpath => self.raw_set_device_fullpath(data),
            Opcode::GetDeviceFullpath => arg(data, 0).and_then(|ds| {
                let name = self.device_filename(ds)?;
                let bytes = if name.is_empty() {
                    vec![0]
                } else {
                    name.as_bytes().to_vec()
                };
                self.response.set_binary(bytes);
                Ok(())
            }),
            Opcode::WriteAppKey => self.write_app_key(data).map(|count| {
                log::debug!("fuji: wrote {} byte app key", count);
            }),
            Opcode::OpenAppKey => decode_open_app_key(data).map(|p| {
                self.open_app_key(AppKey {
                    creator: p.creator,
                    app: p.app,
                    key: p.key,
                    mode: AppKeyMode::from_byte(p.mode),
                    reserved: p.reserved,
                });
            }),
            Opcode::ConfigBoot => arg(data, 0).and_then(|v| self.set_boot_config(v != 0)),
            Opcode::SetBootMode => arg(data, 0).and_then(|v| self.set_boot_mode(v)),
            Opcode::EnableDevice => self.set_devices_active(data, true),
            Opcode::DisableDevice => self.set_devices_active(data, false),
            Opcode::HashInput => {
                log::debug!("fuji: hash input: {}", hex_preview(data));
                self.hash_input(data);
                Ok(())
            }
            Opcode::HashCompute | Opcode::HashComputeNoClear => arg(data, 0)
                .and_then(HashAlgorithm::from_byte)
                .map(|alg| self.hash_compute(op == Opcode::HashCompute, alg)),
            Opcode::HashLength => hex_flag(data).map(|is_hex| {
                let len = self.hash_length(is_hex);
                self.response.set_binary(vec![len]);
            }),
            Opcode::HashOutput => hex_flag(data).map(|is_hex| {
                let out = self.hash_output(is_hex);
                self.response.set_binary(out);
            }),
            _ => {
                log::debug!("fuji: {} takes no data, still waiting", op.name());
                return false;
            }
        };

        self.succeed("");
        self.finish(result, WireFormat::Raw);
        true
    }

    fn raw_mount_image(&mut self, data: &[u8]) -> Result<()> {
        let ds = arg(data, 0)?;
        let mode = AccessMode::from_byte(arg(data, 1)?);
        self.disk_image_mount(ds, mode).map(|_| ())
    }

    /// `[host] path [NUL pattern]`
    fn raw_open_directory(&mut self, data: &[u8]) -> Result<()> {
        let (&host, rest) = data
            .split_first()
            .ok_or(Error::Parameter("invalid # of parameters"))?;
        let path_bytes = until_nul(rest);
        let pattern_bytes = rest.get(path_bytes.len() + 1..).map(until_nul);

        let path = String::from_utf8_lossy(path_bytes);
        let pattern = pattern_bytes.map(String::from_utf8_lossy);
        self.open_directory(host, &path, pattern.as_deref())
    }

    fn raw_read_dir_entry(&mut self, data: &[u8]) -> Result<()> {
        let maxlen = arg(data, 0)?;
        let options = arg(data, 1)?;
        let entry = self.read_directory_entry(maxlen, options)?;
        self.response.set_binary(entry);
        Ok(())
    }

    /// `[slot, host, mode] name`
    fn raw_set_device_fullpath(&mut self, data: &[u8]) -> Result<()> {
        match data {
            [slot, host, mode, name @ ..] => {
                let name = String::from_utf8_lossy(until_nul(name));
                self.set_device_filename(*slot, *host, AccessMode::from_byte(*mode), &name)
            }
            _ => Err(Error::Parameter("invalid # of parameters")),
        }
    }
}
