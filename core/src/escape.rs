//! Byte-level escaping for MySQL string contents.
//!
//! Two strategies are provided:
//!
//! - **Backslash** — the default server mode. Special bytes are replaced by a
//!   backslash escape (`\0`, `\n`, `\r`, `\Z`, `\'`, `\"`, `\\`).
//! - **Quote doubling** — used when the server runs with
//!   `NO_BACKSLASH_ESCAPES`. Only `'` is rewritten, to `''`.
//!
//! All functions append to a caller-owned buffer so that many escapes can be
//! batched into one allocation. The buffer grows exponentially when it runs
//! out of room, keeping repeated appends amortized O(n).
//!
//! # Example
//!
//! ```
//! use sqlstring_core::{escape_string_backslash, escape_string_quotes};
//!
//! let mut buf = Vec::new();
//! escape_string_backslash(&mut buf, "it's\n");
//! assert_eq!(buf, br"it\'s\n");
//!
//! let mut buf = Vec::new();
//! escape_string_quotes(&mut buf, "it's");
//! assert_eq!(buf, b"it''s");
//! ```

use serde::{Deserialize, Serialize};

/// Escaping strategy for string contents.
///
/// Both variants are immutable and `Copy`; pass them around freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escaping {
    /// Backslash escapes, the MySQL default.
    #[default]
    Backslash,
    /// `'` doubled to `''`, for `NO_BACKSLASH_ESCAPES` servers.
    QuoteDoubling,
}

impl Escaping {
    /// Appends the escaped form of `v` to `buf`.
    pub fn escape_bytes(self, buf: &mut Vec<u8>, v: &[u8]) {
        match self {
            Self::Backslash => escape_bytes_backslash(buf, v),
            Self::QuoteDoubling => escape_bytes_quotes(buf, v),
        }
    }

    /// Appends the escaped form of `v` to `buf`.
    pub fn escape_str(self, buf: &mut Vec<u8>, v: &str) {
        self.escape_bytes(buf, v.as_bytes());
    }
}

/// Makes sure `buf` can take `append_size` more bytes.
///
/// On overflow the capacity becomes `2 * len + append_size`.
fn reserve_buffer(buf: &mut Vec<u8>, append_size: usize) {
    if buf.capacity() - buf.len() < append_size {
        buf.reserve_exact(buf.len() + append_size);
    }
}

/// Appends `v` to `buf` with backslash escapes.
///
/// Follows the server's own `escape_string_for_mysql` table: NUL, `\n`,
/// `\r`, `\x1a`, `'`, `"` and `\` are escaped; every other byte is copied.
pub fn escape_bytes_backslash(buf: &mut Vec<u8>, v: &[u8]) {
    reserve_buffer(buf, v.len() * 2);

    for &c in v {
        let escaped = match c {
            b'\0' => b'0',
            b'\n' => b'n',
            b'\r' => b'r',
            b'\x1a' => b'Z',
            b'\'' => b'\'',
            b'"' => b'"',
            b'\\' => b'\\',
            _ => {
                buf.push(c);
                continue;
            }
        };
        buf.push(b'\\');
        buf.push(escaped);
    }
}

/// Same as [`escape_bytes_backslash`] for string input.
pub fn escape_string_backslash(buf: &mut Vec<u8>, v: &str) {
    escape_bytes_backslash(buf, v.as_bytes());
}

/// Appends `v` to `buf`, doubling every apostrophe.
///
/// This is the only escaping a `NO_BACKSLASH_ESCAPES` server understands.
pub fn escape_bytes_quotes(buf: &mut Vec<u8>, v: &[u8]) {
    reserve_buffer(buf, v.len() * 2);

    for &c in v {
        if c == b'\'' {
            buf.extend_from_slice(b"''");
        } else {
            buf.push(c);
        }
    }
}

/// Same as [`escape_bytes_quotes`] for string input.
pub fn escape_string_quotes(buf: &mut Vec<u8>, v: &str) {
    escape_bytes_quotes(buf, v.as_bytes());
}
