/*!
 * Process Environment
 * Name lookup and bounds-checked positional access to the environment table
 *
 * The table is process-global. A snapshot reflects the environment at the
 * moment it was captured; another thread mutating the environment between
 * two captures can shift entry positions.
 *
 * Entries are enumerated through `std::env::vars_os`, which skips raw
 * entries without a `=`. If the process was started with such an entry,
 * indices here no longer line up with positions in the raw table.
 */

use crate::core::{NativeError, NativeResult};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};

/// Look up a variable by name
///
/// Names that can never be bound (empty, or containing `=` or NUL) are
/// reported as unset.
pub fn lookup(name: &str) -> Option<OsString> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return None;
    }
    std::env::var_os(name)
}

/// Convert native text into a UTF-8 string, replacing invalid sequences
#[inline]
pub fn native_text(value: &OsStr) -> Cow<'_, str> {
    value.to_string_lossy()
}

/// Owned snapshot of the environment table as raw `NAME=VALUE` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentTable {
    entries: Vec<OsString>,
}

impl EnvironmentTable {
    /// Snapshot the live process environment, in enumeration order
    pub fn capture() -> Self {
        let entries = std::env::vars_os()
            .map(|(name, value)| {
                let mut entry = OsString::with_capacity(name.len() + value.len() + 1);
                entry.push(&name);
                entry.push("=");
                entry.push(&value);
                entry
            })
            .collect();
        Self { entries }
    }

    /// Table over explicit entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of live entries (position of the terminating sentinel)
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, or a range error for negative or past-the-end indices
    pub fn entry(&self, index: i32) -> NativeResult<&OsStr> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(OsString::as_os_str)
            .ok_or(NativeError::Range {
                index: i64::from(index),
                len: self.entries.len(),
            })
    }

    /// Position of the first entry bound to `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| {
            entry
                .to_str()
                .and_then(|e| e.split_once('='))
                .is_some_and(|(key, _)| key == name)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.entries.iter().map(OsString::as_os_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_bounds() {
        let table = EnvironmentTable::from_entries(["A=1", "B=2"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(0).unwrap(), "A=1");
        assert_eq!(table.entry(1).unwrap(), "B=2");
        assert_eq!(table.entry(2), Err(NativeError::Range { index: 2, len: 2 }));
        assert_eq!(table.entry(-1), Err(NativeError::Range { index: -1, len: 2 }));
    }

    #[test]
    fn test_empty_table() {
        let table = EnvironmentTable::default();
        assert!(table.is_empty());
        assert!(matches!(table.entry(0), Err(NativeError::Range { len: 0, .. })));
    }

    #[test]
    fn test_position() {
        let table = EnvironmentTable::from_entries(["PATH=/bin", "EMPTY=", "X=a=b"]);
        assert_eq!(table.position("EMPTY"), Some(1));
        assert_eq!(table.position("X"), Some(2));
        assert_eq!(table.position("PAT"), None);
    }

    #[test]
    fn test_unbindable_names() {
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("A=B"), None);
        assert_eq!(lookup("A\0B"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_native_text_replaces_invalid_utf8() {
        use std::os::unix::ffi::OsStrExt;
        let raw = OsStr::from_bytes(b"caf\xff");
        assert_eq!(native_text(raw), "caf\u{FFFD}");
    }
}
