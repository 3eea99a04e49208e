//! Fuji control device protocol constants and types
//!
//! Opcode numbering follows the FujiNet command set so existing client
//! libraries on the retro side keep working.

mod keywords;
mod opcodes;
pub mod wire;

pub use keywords::{match_keyword, BasicCommand, KEYWORDS};
pub use opcodes::Opcode;

/// First byte of a RAW open frame
pub const RAW_MARKER: u8 = 0x01;

/// Number of host slots
pub const MAX_HOSTS: usize = 8;
/// Number of disk (device) slots
pub const MAX_DISK_DEVICES: usize = 8;

/// Width of a hostname field, including the NUL terminator
pub const MAX_HOSTNAME_LEN: usize = 32;
/// Longest path a disk slot can hold
pub const MAX_FILENAME_LEN: usize = 256;
/// Width of the filename field in the device slot block
pub const MAX_DISPLAY_FILENAME_LEN: usize = 36;

/// Longest SSID
pub const MAX_SSID_LEN: usize = 32;
/// Longest WPA passphrase
pub const MAX_PASSPHRASE_LEN: usize = 64;

/// Largest app-key blob
pub const MAX_APPKEY_LEN: usize = 64;
/// Directory holding app-key files on SD storage
pub const APPKEY_DIR: &str = "/FujiNet";

/// Directory position value meaning "no valid position"
pub const INVALID_DIRPOS: u16 = 0xFFFF;

/// Returned by READ_DIR_ENTRY once the listing is exhausted
pub const DIR_END_SENTINEL: [u8; 2] = [0x7F, 0x7F];

/// Bus channel the control device answers on
pub const COMMAND_CHANNEL: u8 = 15;

/// First bus device number used by disk drives
pub const FIRST_DRIVE_DEVICE: u8 = 8;

/// WiFi status byte: connected
pub const WIFI_CONNECTED: u8 = 3;
/// WiFi status byte: not connected
pub const WIFI_DISCONNECTED: u8 = 6;

/// Stall after a network scan so the WiFi can re-associate (ms)
pub const SCAN_SETTLE_MS: u32 = 5000;
/// Stall after restarting WiFi following SET_SSID (ms)
pub const WIFI_RESTART_SETTLE_MS: u32 = 4000;

/// Access mode byte for a read-only disk mount
pub const DISK_ACCESS_MODE_READ: u8 = 1;
/// Access mode byte for a read-write disk mount
pub const DISK_ACCESS_MODE_WRITE: u8 = 2;

/// Host slot byte meaning "no host"
pub const INVALID_HOST_SLOT: u8 = 0xFF;

/// READ_DIR_ENTRY option and result flags
pub mod dir_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Options byte sent with READ_DIR_ENTRY
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct DirOptions: u8 {
            /// Prepend the 10-byte metadata record
            const EXTENDED = 0x80;
        }
    }

    bitflags! {
        /// Flags byte inside the metadata record
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EntryFlags: u8 {
            /// Entry is a directory
            const DIR = 0x01;
            /// Filename was shortened to fit
            const TRUNCATED = 0x02;
        }
    }
}
