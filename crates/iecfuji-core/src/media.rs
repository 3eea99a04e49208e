//! Commodore media types
//!
//! Detection here is by filename extension only. Parsing image contents is
//! the job of the drive emulation behind [`crate::platform::DriveBank`],
//! which may override the type on mount.

/// Media type byte reported in directory entries and disk slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MediaType {
    /// Not a recognized image
    #[default]
    Unknown = 0,
    /// 1541 disk image
    D64 = 1,
    /// 1571 disk image
    D71 = 2,
    /// 1581 disk image
    D81 = 3,
    /// 8050 disk image
    D80 = 4,
    /// 8250 disk image
    D82 = 5,
    /// GCR-level 1541 image
    G64 = 6,
    /// Tape archive
    T64 = 7,
    /// Raw tape image
    Tap = 8,
    /// Cartridge image
    Crt = 9,
    /// Program file
    Prg = 10,
    /// 8-bit partitioned image
    D8b = 11,
    /// CMD native partition
    Dnp = 12,
}

impl MediaType {
    /// Detect the media type from a filename extension (case-insensitive)
    pub fn from_filename(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => return Self::Unknown,
        };
        match ext.to_ascii_lowercase().as_str() {
            "d64" => Self::D64,
            "d71" => Self::D71,
            "d81" => Self::D81,
            "d80" => Self::D80,
            "d82" => Self::D82,
            "g64" => Self::G64,
            "t64" => Self::T64,
            "tap" => Self::Tap,
            "crt" => Self::Crt,
            "prg" => Self::Prg,
            "d8b" => Self::D8b,
            "dnp" => Self::Dnp,
            _ => Self::Unknown,
        }
    }

    /// Whether this is a mountable disk image
    pub fn is_disk(self) -> bool {
        matches!(
            self,
            Self::D64
                | Self::D71
                | Self::D81
                | Self::D80
                | Self::D82
                | Self::G64
                | Self::D8b
                | Self::Dnp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename() {
        assert_eq!(MediaType::from_filename("GAME.D64"), MediaType::D64);
        assert_eq!(MediaType::from_filename("/x/y/z.d81"), MediaType::D81);
        assert_eq!(MediaType::from_filename("tape.tap"), MediaType::Tap);
        assert_eq!(MediaType::from_filename("readme.txt"), MediaType::Unknown);
        assert_eq!(MediaType::from_filename("noext"), MediaType::Unknown);
        assert_eq!(MediaType::from_filename("archive.T64") as u8, 7);
    }

    #[test]
    fn test_is_disk() {
        assert!(MediaType::D71.is_disk());
        assert!(!MediaType::Prg.is_disk());
        assert!(!MediaType::Unknown.is_disk());
    }
}
