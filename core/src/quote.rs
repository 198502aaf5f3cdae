//! Quoting of string literals and identifiers.
//!
//! String literals use a character table that differs from the byte table in
//! [`escape`](crate::escape): it also escapes backspace and tab. This one
//! builds literals, the other frames raw bytes.

use crate::escape::{Escaping, escape_string_quotes};

/// Wraps `s` in single quotes using the backslash literal table.
///
/// `\` → `\\`, NUL → `\0`, backspace → `\b`, tab → `\t`, `\n` → `\n`,
/// `\r` → `\r`, `\x1a` → `\Z`, `"` → `\"`, `'` → `\'`.
///
/// # Examples
///
/// ```
/// use sqlstring_core::encode_string_literal;
///
/// assert_eq!(encode_string_literal("it's"), r"'it\'s'");
/// assert_eq!(encode_string_literal("a\tb"), r"'a\tb'");
/// ```
pub fn encode_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '\0' => out.push_str(r"\0"),
            '\u{8}' => out.push_str(r"\b"),
            '\t' => out.push_str(r"\t"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\u{1a}' => out.push_str(r"\Z"),
            '"' => out.push_str(r#"\""#),
            '\'' => out.push_str(r"\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

impl Escaping {
    /// Wraps `s` in single quotes using this strategy.
    ///
    /// [`Escaping::Backslash`] uses [`encode_string_literal`];
    /// [`Escaping::QuoteDoubling`] only doubles apostrophes.
    pub fn quote(self, s: &str) -> String {
        match self {
            Self::Backslash => encode_string_literal(s),
            Self::QuoteDoubling => {
                let mut buf = Vec::with_capacity(s.len() + 2);
                buf.push(b'\'');
                escape_string_quotes(&mut buf, s);
                buf.push(b'\'');
                // Only ASCII apostrophes were inserted into valid UTF-8.
                String::from_utf8(buf).unwrap_or_else(|e| {
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                })
            }
        }
    }
}

/// Quotes a table or column name with backticks.
///
/// Every backtick inside `name` is doubled. Unless `forbid_qualified` is set,
/// each `.` splits the name into qualified parts, so `db.table` becomes
/// `` `db`.`table` ``. With `forbid_qualified` the dot stays part of one name.
///
/// # Examples
///
/// ```
/// use sqlstring_core::encode_identifier;
///
/// assert_eq!(encode_identifier("a.b", false), "`a`.`b`");
/// assert_eq!(encode_identifier("a.b", true), "`a.b`");
/// assert_eq!(encode_identifier("we`ird", true), "`we``ird`");
/// ```
pub fn encode_identifier(name: &str, forbid_qualified: bool) -> String {
    let escaped = name.replace('`', "``");
    if forbid_qualified {
        format!("`{escaped}`")
    } else {
        format!("`{}`", escaped.replace('.', "`.`"))
    }
}

/// Quotes each name with [`encode_identifier`] and joins them with `, `.
pub fn encode_identifier_list<S: AsRef<str>>(names: &[S], forbid_qualified: bool) -> String {
    names
        .iter()
        .map(|name| encode_identifier(name.as_ref(), forbid_qualified))
        .collect::<Vec<_>>()
        .join(", ")
}
