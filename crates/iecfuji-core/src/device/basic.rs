//! BASIC keyword handlers
//!
//! Replies go to the text buffer. Numbers are decimal except for the app-key
//! identifiers, which are hex as printed on the key files.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::FujiDevice;
use crate::error::{Error, Result, STATUS_OK};
use crate::frame::BasicLine;
use crate::platform::{AccessMode, NetConfig};
use crate::protocol::{BasicCommand, INVALID_DIRPOS, MAX_APPKEY_LEN, WIFI_CONNECTED};
use crate::response::WireFormat;
use crate::session::{AppKey, AppKeyMode};
use crate::util::{
    basename, is_numeric, parse_hex_u16, parse_hex_u8, parse_u16, parse_u8, split_at_delim,
    url_decode,
};

const ADAPTER_CONFIG_HINT: &str = "use localip netmask gateway dnsip bssid hostname version";
const BAD_PARAMS: Error = Error::Parameter("invalid # of parameters");

fn param(line: &BasicLine, i: usize) -> Result<&str> {
    line.param(i).ok_or(BAD_PARAMS)
}

fn slot_param(line: &BasicLine, i: usize) -> Result<u8> {
    parse_u8(param(line, i)?, "invalid slot number")
}

impl FujiDevice {
    pub(super) fn dispatch_basic(&mut self, line: &BasicLine) {
        let Some(cmd) = line.command() else {
            log::debug!("fuji: ignoring unknown BASIC command {:?}", line.keyword());
            return;
        };

        // FUJISTATUS reports the previous result
        if cmd != BasicCommand::Status {
            self.succeed("ok");
        }

        let result = match cmd {
            BasicCommand::AdapterConfig => {
                self.response.set_text(ADAPTER_CONFIG_HINT);
                Ok(())
            }
            BasicCommand::SetSsid => self.basic_set_ssid(line),
            BasicCommand::GetSsid => {
                let cfg = self.get_ssid();
                self.response.set_text(&cfg.ssid);
                Ok(())
            }
            BasicCommand::ScanResult => self.basic_scan_result(line),
            BasicCommand::ScanNetworks => {
                let count = self.scan_networks();
                self.response.set_text(&count.to_string());
                Ok(())
            }
            BasicCommand::WifiEnable => self.set_wifi_enabled(true).map(|_| self.reply("ok")),
            BasicCommand::WifiDisable => self.set_wifi_enabled(false).map(|_| self.reply("ok")),
            BasicCommand::WifiStatus => {
                let text = if self.wifi_status() == WIFI_CONNECTED {
                    "connected"
                } else {
                    "disconnected"
                };
                self.reply(text);
                Ok(())
            }
            BasicCommand::UnmountHost => slot_param(line, 0)
                .and_then(|hs| self.unmount_host(hs))
                .map(|_| self.reply("ok")),
            BasicCommand::MountHost => self.basic_mount_host(line),
            BasicCommand::UnmountDrive => slot_param(line, 0)
                .and_then(|ds| self.disk_image_umount(ds))
                .map(|_| self.reply("ok")),
            BasicCommand::MountDrive => self.basic_mount_drive(line),
            BasicCommand::MountAll => self.mount_all().map(|_| self.reply("ok")),
            BasicCommand::OpenDir => self.basic_open_dir(line),
            BasicCommand::ReadDir => self.basic_read_dir(line),
            BasicCommand::CloseDir => {
                self.close_directory();
                self.reply("ok");
                Ok(())
            }
            BasicCommand::GetDirPos => self.basic_get_dir_pos(),
            BasicCommand::SetDirPos => param(line, 0)
                .and_then(|p| parse_u16(p, "invalid directory position"))
                .and_then(|pos| self.set_directory_position(pos))
                .map(|_| self.reply("ok")),
            BasicCommand::ReadHostSlot => self.basic_get_host(line),
            BasicCommand::WriteHostSlot => self.basic_put_host(line),
            BasicCommand::SetDriveFilename => self.basic_set_drive_filename(line),
            BasicCommand::GetDriveFilename => slot_param(line, 0).and_then(|ds| {
                let name = self.device_filename(ds)?.to_string();
                self.response.set_text(&name);
                Ok(())
            }),
            BasicCommand::ReadDriveSlot => slot_param(line, 0).and_then(|ds| {
                let name = basename(self.device_filename(ds)?).to_string();
                self.response.set_text(&name);
                Ok(())
            }),
            BasicCommand::WriteDriveSlot => self.basic_put_drive(line),
            BasicCommand::WriteAppKey => self.basic_write_app_key(line),
            BasicCommand::ReadAppKey => self.read_app_key().map(|data| {
                self.response.set_text_bytes(&data);
            }),
            BasicCommand::OpenAppKey => self.basic_open_app_key(line),
            BasicCommand::CloseAppKey => {
                self.close_app_key();
                self.reply("ok");
                Ok(())
            }
            BasicCommand::BootConfig => param(line, 0)
                .and_then(|v| parse_u8(v, "invalid boot config"))
                .and_then(|v| self.set_boot_config(v != 0))
                .map(|_| self.reply("ok")),
            BasicCommand::BootMode => param(line, 0)
                .and_then(|v| parse_u8(v, "invalid boot mode"))
                .and_then(|v| self.set_boot_mode(v))
                .map(|_| self.reply("ok")),
            BasicCommand::Status => {
                let text = self.status.to_basic_string();
                self.response.set_text(&text);
                self.status.set(STATUS_OK, text);
                Ok(())
            }
            BasicCommand::LocalIp => {
                let ip = self.local_ip();
                self.succeed(&ip);
                Ok(())
            }
            BasicCommand::Reset => {
                self.reset_device();
                Ok(())
            }
            BasicCommand::EnableDevice => self.basic_toggle_devices(line, true),
            BasicCommand::DisableDevice => self.basic_toggle_devices(line, false),
        };

        self.finish(result, WireFormat::Basic);
    }

    /// Text reply that doubles as the status message
    fn reply(&mut self, text: &str) {
        self.response.set_text(text);
        self.succeed(text);
    }

    /// `SETSSID:ssid,pass`; a numeric SSID names a scanned network by CRC-8
    fn basic_set_ssid(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() != 2 {
            return Err(BAD_PARAMS);
        }
        let mut ssid = url_decode(param(line, 0)?);
        let password = url_decode(param(line, 1)?);

        if is_numeric(&ssid) {
            let crc = parse_u8(&ssid, "invalid network number")?;
            ssid = self
                .network_name_by_crc8(crc)
                .ok_or(Error::Parameter("unknown network"))?;
            log::debug!("fuji: network {} is {:?}", crc, ssid);
        }

        match self.set_ssid(&NetConfig { ssid, password }, true) {
            Ok(()) => {
                self.succeed("ssid set");
                Ok(())
            }
            Err(e) => {
                log::warn!("fuji: ssid not set: {}", e);
                Err(e)
            }
        }
    }

    /// `SCANRESULT:n` replies `rssi,"ssid"`
    fn basic_scan_result(&mut self, line: &BasicLine) -> Result<()> {
        let index = parse_u8(param(line, 0)?, "invalid scan index")?;
        let result = self.scan_result(index);
        self.response
            .set_text(&format!("{},\"{}\"", result.rssi, result.ssid));
        Ok(())
    }

    fn basic_mount_host(&mut self, line: &BasicLine) -> Result<()> {
        let hs = slot_param(line, 0)?;
        self.mount_host(hs)?;
        let text = format!("{} MOUNTED.", self.hostname(hs)?);
        self.reply(&text);
        Ok(())
    }

    /// `MOUNTDRIVE:slot,mode`
    fn basic_mount_drive(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 2 {
            return Err(BAD_PARAMS);
        }
        let ds = slot_param(line, 0)?;
        let mode = parse_u8(param(line, 1)?, "invalid mode")?;
        self.disk_image_mount(ds, AccessMode::from_byte(mode))?;
        self.reply("mounted");
        Ok(())
    }

    /// `OPENDIR:host,path[~pattern]`
    fn basic_open_dir(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 2 {
            return Err(BAD_PARAMS);
        }
        let hs = slot_param(line, 0)?;
        let (path, pattern) = split_at_delim(param(line, 1)?, '~');
        let pattern = (!pattern.is_empty()).then_some(pattern);
        self.open_directory(hs, path, pattern)
    }

    /// `READDIR:maxlen[,options]`
    fn basic_read_dir(&mut self, line: &BasicLine) -> Result<()> {
        let maxlen = parse_u8(param(line, 0)?, "invalid length")?;
        let options = match line.param(1) {
            Some(o) => parse_u8(o, "invalid options")?,
            None => 0,
        };
        let entry = self.read_directory_entry(maxlen, options)?;
        self.response.set_text_bytes(&entry);
        self.succeed("");
        Ok(())
    }

    fn basic_get_dir_pos(&mut self) -> Result<()> {
        let pos = self.directory_position()?;
        if pos == INVALID_DIRPOS {
            return Err(Error::io("invalid directory position"));
        }
        self.response.set_text(&pos.to_string());
        Ok(())
    }

    /// `GETHOST:n` replies the hostname, or `<empty>`
    fn basic_get_host(&mut self, line: &BasicLine) -> Result<()> {
        let hs = slot_param(line, 0)?;
        let name = self.hostname(hs)?;
        let text = if name.is_empty() {
            String::from("<empty>")
        } else {
            name.to_string()
        };
        self.response.set_text(&text);
        Ok(())
    }

    /// `PUTHOST:n[,name]`, a missing name clears the slot
    fn basic_put_host(&mut self, line: &BasicLine) -> Result<()> {
        let hs = slot_param(line, 0)?;
        let name = line.param(1).unwrap_or("");
        self.set_hostname(hs, name)?;
        self.reply("ok");
        Ok(())
    }

    /// `SETDRIVEFILENAME:slot,host,mode,name`
    fn basic_set_drive_filename(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 4 {
            return Err(BAD_PARAMS);
        }
        let ds = slot_param(line, 0)?;
        let hs = slot_param(line, 1)?;
        let mode = parse_u8(param(line, 2)?, "invalid mode")?;
        let name = param(line, 3)?;
        self.set_device_filename(ds, hs, AccessMode::from_byte(mode), name)?;
        self.reply("ok");
        Ok(())
    }

    /// `PUTDRIVE:slot,host,name,mode`
    fn basic_put_drive(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 4 {
            return Err(BAD_PARAMS);
        }
        let ds = slot_param(line, 0)?;
        let hs = slot_param(line, 1)?;
        let name = param(line, 2)?;
        let mode = parse_u8(param(line, 3)?, "invalid mode")?;
        self.set_device_filename(ds, hs, AccessMode::from_byte(mode), name)?;
        self.reply("ok");
        Ok(())
    }

    /// `WRITEAPPKEY:len,data`; the data is the rest of the line as sent, so it
    /// may contain commas
    fn basic_write_app_key(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 2 {
            return Err(BAD_PARAMS);
        }
        let len = parse_u8(param(line, 0)?, "invalid key length")? as usize;
        let data = line.raw_rest(1).ok_or(BAD_PARAMS)?;
        let data = &data[..data.len().min(len).min(MAX_APPKEY_LEN)];
        self.write_app_key(data)?;
        self.reply("ok");
        Ok(())
    }

    /// `OPENAPPKEY:creator,app,key,mode`, all hex
    fn basic_open_app_key(&mut self, line: &BasicLine) -> Result<()> {
        if line.param_count() < 4 {
            return Err(BAD_PARAMS);
        }
        let key = AppKey {
            creator: parse_hex_u16(param(line, 0)?, "invalid creator")?,
            app: parse_hex_u8(param(line, 1)?, "invalid app")?,
            key: parse_hex_u8(param(line, 2)?, "invalid key")?,
            mode: AppKeyMode::from_byte(parse_hex_u8(param(line, 3)?, "invalid mode")?),
            reserved: 0,
        };
        self.open_app_key(key);
        self.reply("ok");
        Ok(())
    }

    /// `ENABLE:ids` / `DISABLE:ids`
    fn basic_toggle_devices(&mut self, line: &BasicLine, active: bool) -> Result<()> {
        let devices = line
            .params()
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| parse_u8(p, "invalid device id"))
            .collect::<Result<Vec<u8>>>()?;
        self.set_devices_active(&devices, active)?;
        self.reply("ok");
        Ok(())
    }
}
