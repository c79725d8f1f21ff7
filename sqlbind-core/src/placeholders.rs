//! Locating parameter placeholders in SQL text.
//!
//! Two styles are recognized and may be mixed:
//!
//! * positional: `INSERT INTO t VALUES (?, ?)`
//! * named: `INSERT INTO t VALUES (:id, :name)`
//!
//! Anything inside string literals, quoted identifiers and comments is skipped, as is the
//! `::` cast operator.

use std::ops::Range;

/// One parameter slot of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Zero-based slot index, in order of appearance.
    pub position: usize,

    /// The name of a `:name` placeholder, `None` for `?`.
    pub name: Option<String>,

    /// Byte range of the placeholder in the SQL text.
    pub span: Range<usize>,
}

impl Placeholder {
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(name))
    }
}

pub fn parse_placeholders(sql: &str) -> Vec<Placeholder> {
    let bytes = sql.as_bytes();
    let mut placeholders = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }

            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |end| i + end + 1);
            }

            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |end| i + 2 + end + 2);
            }

            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }

            b':' if bytes.get(i + 1).is_some_and(|&b| is_ident_start(b)) => {
                let start = i;
                let end = bytes[i + 1..]
                    .iter()
                    .position(|&b| !is_ident_continue(b))
                    .map_or(bytes.len(), |len| i + 1 + len);

                placeholders.push(Placeholder {
                    position: placeholders.len(),
                    name: Some(sql[start + 1..end].to_owned()),
                    span: start..end,
                });

                i = end;
            }

            b'?' => {
                placeholders.push(Placeholder {
                    position: placeholders.len(),
                    name: None,
                    span: i..i + 1,
                });

                i += 1;
            }

            _ => {
                i += 1;
            }
        }
    }

    placeholders
}

// a doubled quote character inside a quoted run is an escaped quote
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;

    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }

            return i + 1;
        }

        i += 1;
    }

    bytes.len()
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
