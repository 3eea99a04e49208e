//! iecfuji-core - Command protocol engine for the IEC fuji control device
//!
//! This crate emulates the control/configuration device of a retro-computer
//! storage adapter. The device receives command frames on a serial bus and
//! answers each one with exactly one response. Two encodings share the same
//! channel:
//!
//! - **RAW**: a two byte open frame `0x01 <opcode>`, optionally followed by a
//!   continuation frame carrying the opcode's parameters
//! - **BASIC**: an ASCII line `KEYWORD:param1,param2,...` typed from BASIC
//!
//! The engine multiplexes these commands onto a small set of exclusive
//! resources: host slots, disk slots, one directory cursor, one app-key
//! session and one hash accumulator. Everything outside the engine (host
//! filesystems, network stack, configuration storage, drive emulation) is
//! reached through the capability traits in [`platform`].
//!
//! The crate is `no_std` and needs `alloc`.
//!
//! # Features
//!
//! - `std` - Enable standard library support and serde derives
//! - `digest` - Built-in MD5/SHA-1/SHA-256/SHA-512 hash primitive
//!
//! # Example
//!
//! ```ignore
//! use iecfuji_core::{FujiDevice, platform::Peripherals};
//!
//! fn serve(peripherals: Peripherals, frames: &[&[u8]]) {
//!     let mut device = FujiDevice::new(peripherals);
//!     for frame in frames {
//!         let reply = device.process_frame(frame);
//!         println!("status {} -> {:02X?}", reply.status.code, reply.data);
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod device;
pub mod error;
pub mod frame;
pub mod media;
pub mod platform;
pub mod protocol;
pub mod response;
pub mod session;
pub mod slots;
pub mod util;

pub use device::FujiDevice;
pub use error::{Error, Result};
pub use response::{Reply, Status, WireFormat};
