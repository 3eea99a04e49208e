//! String and parameter helpers shared by the command handlers

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Number of bytes shown by [`hex_preview`] before truncating
pub const LOG_PREVIEW_LEN: usize = 64;

/// Shorten `name` to at most `max` bytes by replacing its middle with `...`
///
/// Names that already fit are returned unchanged. When `max` is too small to
/// hold an ellipsis the name is simply cut. Cuts never split a character, so
/// a multibyte name may come out a byte or two shorter than `max`.
pub fn ellipsize(name: &str, max: usize) -> String {
    if name.len() <= max {
        return String::from(name);
    }
    if max < 5 {
        return String::from(&name[..floor_boundary(name, max)]);
    }

    let keep = max - 3;
    let head = keep / 2;
    let tail = keep - head;

    let mut out = String::from(&name[..floor_boundary(name, head)]);
    out.push_str("...");
    out.push_str(&name[ceil_boundary(name, name.len() - tail)..]);
    out
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Last component of a `/` or `\` separated path
pub fn basename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Parse a decimal BASIC parameter
pub fn parse_u8(token: &str, what: &'static str) -> Result<u8> {
    token.trim().parse().map_err(|_| Error::Parameter(what))
}

/// Parse a decimal BASIC parameter
pub fn parse_u16(token: &str, what: &'static str) -> Result<u16> {
    token.trim().parse().map_err(|_| Error::Parameter(what))
}

/// Parse a hexadecimal BASIC parameter, with or without a `0x` prefix
pub fn parse_hex_u16(token: &str, what: &'static str) -> Result<u16> {
    let t = token.trim();
    let t = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);
    u16::from_str_radix(t, 16).map_err(|_| Error::Parameter(what))
}

/// Parse a hexadecimal byte parameter
pub fn parse_hex_u8(token: &str, what: &'static str) -> Result<u8> {
    let v = parse_hex_u16(token, what)?;
    u8::try_from(v).map_err(|_| Error::Parameter(what))
}

/// Split at the first `delim`
///
/// A trailing `/` on the first part is dropped, so `"/games/~*.d64"` splits
/// into `("/games", "*.d64")`.
pub fn split_at_delim(input: &str, delim: char) -> (&str, &str) {
    let (first, second) = match input.find(delim) {
        Some(pos) => (&input[..pos], &input[pos + delim.len_utf8()..]),
        None => (input, ""),
    };
    (first.strip_suffix('/').unwrap_or(first), second)
}

/// Bytes up to (not including) the first NUL
pub fn until_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Decode `%xx` escapes; `+` is left as a literal plus
///
/// Malformed escapes are kept verbatim.
pub fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Whether `s` is a non-empty run of ASCII digits
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Case-insensitive wildcard match: `*` is any run, `?` any one byte
///
/// Runs in `O(pattern * name)`: on a mismatch the scan resumes one byte past
/// where the last `*` started matching.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let (p, n) = (pattern.as_bytes(), name.as_bytes());
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        match p.get(pi) {
            Some(b'*') => {
                star = Some((pi, ni));
                pi += 1;
            }
            Some(b'?') => {
                pi += 1;
                ni += 1;
            }
            Some(c) if c.eq_ignore_ascii_case(&n[ni]) => {
                pi += 1;
                ni += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    pi = sp + 1;
                    ni = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == b'*')
}

/// Hex rendering of a buffer for log output, cut at [`LOG_PREVIEW_LEN`] bytes
pub fn hex_preview(data: &[u8]) -> String {
    if data.len() <= LOG_PREVIEW_LEN {
        return hex::encode(data);
    }
    let mut s = hex::encode(&data[..LOG_PREVIEW_LEN]);
    s.push_str(&alloc::format!(" [truncated from {}]", data.len()));
    s
}
