//! Error types for iecfuji-core
//!
//! Every failure a command handler can hit is one of the families below.
//! None of them is fatal: the dispatcher turns each into a status code and
//! message on the bus and carries on with the next frame.

use alloc::string::String;
use core::fmt;

/// Which slot table an index was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Host slot table
    Host,
    /// Disk (device) slot table
    Device,
}

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed command arguments
    Parameter(&'static str),
    /// Slot index outside the fixed table
    SlotRange {
        /// Table that was indexed
        kind: SlotKind,
        /// Offending index
        index: u8,
    },
    /// Required storage or session is absent
    ResourceUnavailable(&'static str),
    /// Open/read/write failure reported by a collaborator
    Io(String),
    /// Opcode is not recognized by this device
    UnsupportedCommand(u8),
    /// Network operation failed
    NotConnected,
}

/// Status code reported for a successful command
pub const STATUS_OK: u8 = 0;

impl Error {
    /// Status code placed on the bus error channel for this error
    pub fn status_code(&self) -> u8 {
        match self {
            Self::Parameter(_) => 1,
            Self::SlotRange { .. } => 2,
            Self::ResourceUnavailable(_) => 3,
            Self::Io(_) => 4,
            Self::UnsupportedCommand(_) => 5,
            // Same code the network device uses for a dropped connection
            Self::NotConnected => 207,
        }
    }

    /// Shorthand for an I/O error with a message
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Device => write!(f, "device"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(msg) => write!(f, "{}", msg),
            Self::SlotRange { kind, index } => write!(f, "invalid {} slot {}", kind, index),
            Self::ResourceUnavailable(msg) => write!(f, "{}", msg),
            Self::Io(msg) => write!(f, "{}", msg),
            Self::UnsupportedCommand(cmd) => write!(f, "unrecognised command 0x{:02X}", cmd),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_status_codes_are_distinct_and_nonzero() {
        let errors = [
            Error::Parameter("x"),
            Error::SlotRange {
                kind: SlotKind::Host,
                index: 9,
            },
            Error::ResourceUnavailable("x"),
            Error::io("x"),
            Error::UnsupportedCommand(0x42),
            Error::NotConnected,
        ];
        for (i, a) in errors.iter().enumerate() {
            assert_ne!(a.status_code(), STATUS_OK);
            for b in &errors[i + 1..] {
                assert_ne!(a.status_code(), b.status_code());
            }
        }
    }

    #[test]
    fn test_display() {
        let e = Error::SlotRange {
            kind: SlotKind::Device,
            index: 12,
        };
        assert_eq!(e.to_string(), "invalid device slot 12");
        assert_eq!(
            Error::UnsupportedCommand(0x42).to_string(),
            "unrecognised command 0x42"
        );
    }
}
