//! Purpose: Define the legal key alphabet and the prefix-to-range translation.
//! Exports: `KEY_SENTINEL`, `validate_key`, `validate_prefix`, `prefix_range`.
//! Role: Pure string layer shared by path validation and query construction.
//! Invariants: Every legal key byte collates strictly below `KEY_SENTINEL`.
//! Invariants: `prefix_range` never touches I/O; bounds are valid for any legal prefix.

use crate::core::error::{Error, ErrorKind};

/// Upper-bound sentinel for emulated prefix scans.
///
/// The store supports closed range scans over keys (`startAt <= key <= endAt`)
/// but no substring predicates. A scan from `prefix` to `prefix + KEY_SENTINEL`
/// returns exactly the keys beginning with `prefix`, provided every byte that
/// can appear in a key collates below the sentinel. `|` (0x7C) sits above the
/// whole legal alphabet enforced by [`validate_key`] and is itself rejected in
/// keys, so it can never collide with a stored key at the boundary.
///
/// This is a closed-world assumption: widen the key alphabet past the sentinel
/// (arbitrary Unicode, `}`, `~`) and the emulation silently drops keys that
/// sort above `prefix + KEY_SENTINEL`. The alphabet check exists to keep that
/// widening from happening by accident.
pub const KEY_SENTINEL: char = '|';

/// Returns whether `c` may appear in a stored key or path segment.
///
/// Legal bytes are printable ASCII strictly below [`KEY_SENTINEL`], excluding
/// `/`, which delimits path segments on the wire.
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_graphic() && c < KEY_SENTINEL && c != '/'
}

/// Validates a record key: non-empty and drawn from the legal alphabet.
pub fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("key must not be empty"));
    }
    check_alphabet(key).map_err(|err| err.with_key(key))
}

/// Validates a key prefix. Unlike a key, a prefix may be empty: the empty
/// prefix matches the entire keyspace.
pub fn validate_prefix(prefix: &str) -> Result<(), Error> {
    check_alphabet(prefix).map_err(|err| err.with_key(prefix))
}

fn check_alphabet(value: &str) -> Result<(), Error> {
    match value.chars().find(|c| !is_key_char(*c)) {
        Some(c) => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("illegal key character {c:?}"))),
        None => Ok(()),
    }
}

/// Translates a key prefix into closed range bounds for an ordered key scan.
///
/// The lower bound is the prefix itself (inclusive, so a prefix that is also a
/// complete key matches itself); the upper bound appends [`KEY_SENTINEL`].
/// Callers must validate the prefix first; this function is total over strings.
pub fn prefix_range(prefix: &str) -> (String, String) {
    let start_at = prefix.to_string();
    let mut end_at = String::with_capacity(prefix.len() + KEY_SENTINEL.len_utf8());
    end_at.push_str(prefix);
    end_at.push(KEY_SENTINEL);
    (start_at, end_at)
}
