//! Exclusive per-device sessions: directory cursor, app key, hash accumulator

mod appkey;
mod directory;
mod hash;

pub use appkey::{AppKey, AppKeyMode, AppKeySession};
pub use directory::{format_entry, DirectorySession};
pub use hash::{HashAlgorithm, HashSession};

#[cfg(feature = "digest")]
pub use hash::RustCryptoHash;
