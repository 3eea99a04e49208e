//! Inbound frame classification
//!
//! A payload is read against the command state left by the previous frame:
//!
//! - idle, exactly `[0x01, op]`: a RAW open frame
//! - idle, anything else non-empty: a BASIC line
//! - waiting for data: the parameters of the pending RAW opcode
//!
//! The state is an explicit three-way machine. A RAW opcode first sits in
//! `AwaitingImmediate` while the dispatcher tries to run it without data; if
//! it needs parameters it moves to `AwaitingContinuation` until the next frame
//! is consumed.

use alloc::string::String;
use alloc::vec::Vec;

use crate::protocol::{match_keyword, BasicCommand, Opcode, RAW_MARKER};

/// Pending command state carried between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    /// No command in progress
    #[default]
    Idle,
    /// RAW open frame received, immediate dispatch not yet attempted
    AwaitingImmediate(Opcode),
    /// RAW command waiting for its parameter frame
    AwaitingContinuation(Opcode),
}

/// A tokenized BASIC command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLine {
    raw: Vec<u8>,
    tokens: Vec<String>,
    command: Option<BasicCommand>,
}

impl BasicLine {
    /// Tokenize a BASIC payload
    ///
    /// `CMD:P1,P2` and `CMD,P1,P2` are equivalent: the first `:` is turned
    /// into a `,` and the line split on `,`. Trailing CR/LF is dropped.
    pub fn parse(payload: &[u8]) -> Self {
        let end = payload
            .iter()
            .rposition(|&b| b != b'\r' && b != b'\n')
            .map_or(0, |i| i + 1);
        let mut raw = payload[..end].to_vec();
        if let Some(colon) = raw.iter().position(|&b| b == b':') {
            raw[colon] = b',';
        }

        let tokens: Vec<String> = raw
            .split(|&b| b == b',')
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .collect();
        let command = tokens.first().and_then(|kw| match_keyword(kw));

        Self {
            raw,
            tokens,
            command,
        }
    }

    /// Command resolved from the keyword token
    pub fn command(&self) -> Option<BasicCommand> {
        self.command
    }

    /// The keyword token as typed
    pub fn keyword(&self) -> &str {
        self.tokens.first().map_or("", String::as_str)
    }

    /// Parameter `i` (0 is the first after the keyword)
    pub fn param(&self, i: usize) -> Option<&str> {
        self.tokens.get(i + 1).map(String::as_str)
    }

    /// Parameter `i` as the undecoded bytes sent on the wire
    pub fn raw_param(&self, i: usize) -> Option<&[u8]> {
        self.raw.split(|&b| b == b',').nth(i + 1)
    }

    /// Undecoded bytes from parameter `i` to the end of the line, commas included
    pub fn raw_rest(&self, i: usize) -> Option<&[u8]> {
        let start = self
            .raw
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == b',')
            .nth(i)
            .map(|(pos, _)| pos + 1)?;
        Some(&self.raw[start..])
    }

    /// Number of parameters after the keyword
    pub fn param_count(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    /// All parameters
    pub fn params(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Nothing to do
    Empty,
    /// RAW open frame for a supported opcode
    RawOpen(Opcode),
    /// RAW open frame for an opcode this device does not know
    RawUnsupported(u8),
    /// BASIC command line
    Basic(BasicLine),
    /// Parameter frame for a pending RAW opcode
    Continuation(Opcode, &'a [u8]),
}

/// Frame decoder and command state tracker
#[derive(Debug, Default)]
pub struct Decoder {
    state: CommandState,
}

impl Decoder {
    /// New decoder in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current command state
    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Classify `payload`
    ///
    /// A supported RAW open frame moves the state to `AwaitingImmediate`; the
    /// caller must follow up with [`immediate_done`](Self::immediate_done).
    /// Continuation frames must be followed by
    /// [`continuation_done`](Self::continuation_done).
    pub fn decode<'a>(&mut self, payload: &'a [u8]) -> Frame<'a> {
        if payload.is_empty() {
            return Frame::Empty;
        }

        match self.state {
            CommandState::Idle => {
                if let [RAW_MARKER, op] = *payload {
                    match Opcode::from_byte(op) {
                        Some(opcode) => {
                            self.state = CommandState::AwaitingImmediate(opcode);
                            Frame::RawOpen(opcode)
                        }
                        None => Frame::RawUnsupported(op),
                    }
                } else {
                    Frame::Basic(BasicLine::parse(payload))
                }
            }
            CommandState::AwaitingImmediate(opcode) | CommandState::AwaitingContinuation(opcode) => {
                self.state = CommandState::AwaitingContinuation(opcode);
                Frame::Continuation(opcode, payload)
            }
        }
    }

    /// Record the outcome of immediate dispatch
    ///
    /// A handled opcode returns to idle, otherwise it waits for data.
    pub fn immediate_done(&mut self, handled: bool) {
        if let CommandState::AwaitingImmediate(opcode) = self.state {
            self.state = if handled {
                CommandState::Idle
            } else {
                CommandState::AwaitingContinuation(opcode)
            };
        }
    }

    /// Record the outcome of continuation dispatch
    ///
    /// An opcode the dispatcher did not handle stays pending, so the next
    /// frame is offered to it again.
    pub fn continuation_done(&mut self, handled: bool) {
        if handled {
            self.state = CommandState::Idle;
        }
    }

    /// Forget any pending command
    pub fn reset(&mut self) {
        self.state = CommandState::Idle;
    }
}
