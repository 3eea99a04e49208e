//! Hash accumulator
//!
//! Input accumulates across HASH_INPUT frames until cleared. Computing keeps
//! the input unless asked to clear it, so the same data can be digested with
//! several algorithms.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::platform::HashPrimitive;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HashAlgorithm {
    /// MD5
    Md5 = 0,
    /// SHA-1
    Sha1 = 1,
    /// SHA-256
    Sha256 = 2,
    /// SHA-512
    Sha512 = 3,
}

impl HashAlgorithm {
    /// Decode the algorithm byte of HASH_COMPUTE
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Self::Md5),
            1 => Ok(Self::Sha1),
            2 => Ok(Self::Sha256),
            3 => Ok(Self::Sha512),
            _ => Err(Error::Parameter("unknown hash algorithm")),
        }
    }

    /// Digest size in bytes
    pub fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

/// Accumulated input plus the last computed digest
#[derive(Debug, Default)]
pub struct HashSession {
    input: Vec<u8>,
    output: Vec<u8>,
    algorithm: Option<HashAlgorithm>,
}

impl HashSession {
    /// Append to the accumulated input
    pub fn input(&mut self, data: &[u8]) {
        self.input.extend_from_slice(data);
    }

    /// Bytes accumulated so far
    pub fn pending_input(&self) -> &[u8] {
        &self.input
    }

    /// Digest the accumulated input, optionally clearing it afterwards
    pub fn compute(&mut self, hasher: &dyn HashPrimitive, algorithm: HashAlgorithm, clear_input: bool) {
        self.output = hasher.digest(algorithm, &self.input);
        self.algorithm = Some(algorithm);
        if clear_input {
            self.input.clear();
        }
    }

    /// Digest length in bytes, or in hex characters when `is_hex`
    ///
    /// Zero until an algorithm has been selected.
    pub fn length(&self, is_hex: bool) -> u8 {
        let len = self.algorithm.map_or(0, HashAlgorithm::digest_len);
        (if is_hex { len * 2 } else { len }) as u8
    }

    /// Last digest as bytes, or as lowercase hex text when `is_hex`
    pub fn output(&self, is_hex: bool) -> Vec<u8> {
        if is_hex {
            hex::encode(&self.output).into_bytes()
        } else {
            self.output.clone()
        }
    }

    /// Drop the input and any computed digest
    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
        self.algorithm = None;
    }
}

/// [`HashPrimitive`] backed by the RustCrypto digest crates
#[cfg(feature = "digest")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoHash;

#[cfg(feature = "digest")]
impl HashPrimitive for RustCryptoHash {
    fn digest(&self, algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        use sha2::Digest;

        match algorithm {
            HashAlgorithm::Md5 => md5::Md5::digest(data).to_vec(),
            HashAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }
}
