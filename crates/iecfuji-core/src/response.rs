//! Response and status handling
//!
//! A handler writes into one of two buffers: `text` for BASIC callers and
//! `binary` for RAW callers. Only the buffer matching the wire format of the
//! triggering frame is sent; output placed in the other one is dropped.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::{Error, STATUS_OK};
use crate::protocol::COMMAND_CHANNEL;
use crate::util::hex_preview;

/// Wire format of the frame being answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Binary opcode frames and their continuations
    Raw,
    /// ASCII keyword lines
    Basic,
}

/// Result of the most recent command, exposed on the bus error channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// 0 on success, otherwise [`Error::status_code`]
    pub code: u8,
    /// Network connectivity at the time of the command
    pub connected: bool,
    /// Channel the status belongs to
    pub channel: u8,
    /// Human readable message
    pub message: String,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            code: STATUS_OK,
            connected: false,
            channel: COMMAND_CHANNEL,
            message: String::new(),
        }
    }
}

impl Status {
    /// Whether the last command succeeded
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }

    /// RAW STATUS layout: `[code, connected, channel, message...]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + self.message.len());
        out.push(self.code);
        out.push(self.connected as u8);
        out.push(self.channel);
        out.extend_from_slice(self.message.as_bytes());
        out
    }

    /// BASIC FUJISTATUS rendering
    pub fn to_basic_string(&self) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail
        let _ = write!(
            s,
            "err={},conn={},chan={},msg={}",
            self.code, self.connected as u8, self.channel, self.message
        );
        s
    }

    pub(crate) fn set(&mut self, code: u8, message: impl Into<String>) {
        self.code = code;
        self.message = message.into();
    }

    pub(crate) fn set_error(&mut self, err: &Error) {
        let mut message = String::new();
        let _ = write!(message, "{}", err);
        self.set(err.status_code(), message);
    }
}

/// Response buffers for one command
#[derive(Debug, Default)]
pub struct Response {
    text: Vec<u8>,
    binary: Vec<u8>,
}

impl Response {
    /// Drop anything left from a previous command
    pub fn clear(&mut self) {
        self.text.clear();
        self.binary.clear();
    }

    /// Set the BASIC text response
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.extend_from_slice(text.as_bytes());
    }

    /// Set the BASIC response to arbitrary bytes
    pub fn set_text_bytes(&mut self, bytes: &[u8]) {
        self.text.clear();
        self.text.extend_from_slice(bytes);
    }

    /// Set the RAW binary response
    pub fn set_binary(&mut self, data: Vec<u8>) {
        self.binary = data;
    }

    /// Current BASIC text
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Current RAW bytes
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Take the buffer matching `format`, discarding the other one
    pub fn flush(&mut self, format: WireFormat) -> Vec<u8> {
        let (sent, dropped) = match format {
            WireFormat::Raw => (core::mem::take(&mut self.binary), core::mem::take(&mut self.text)),
            WireFormat::Basic => (core::mem::take(&mut self.text), core::mem::take(&mut self.binary)),
        };

        if !dropped.is_empty() {
            log::debug!(
                "fuji: dropping {} byte response not matching {:?} caller",
                dropped.len(),
                format
            );
        }
        if sent.is_empty() {
            log::debug!("fuji: no response");
        } else {
            match format {
                WireFormat::Raw => log::debug!("fuji: RAW response: {}", hex_preview(&sent)),
                WireFormat::Basic => log::debug!(
                    "fuji: BASIC response: {}",
                    String::from_utf8_lossy(&sent)
                ),
            }
        }
        sent
    }
}

/// Everything the bus layer sends back for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Wire format the frame was handled as
    pub format: WireFormat,
    /// Response bytes, possibly empty
    pub data: Vec<u8>,
    /// Status after the command
    pub status: Status,
}
