//! Ordered name/value lists for critical options and extensions.

use bytes::BufMut;

use crate::error::SshKeyError;
use crate::wire::{WireReader, WireWrite};

/// How an option's data field was framed on the wire.
///
/// OpenSSH writes flag-style options with empty data and valued options as
/// `string(string(value))`. A valued option whose value happens to be empty
/// is still framed, so the framing is tracked separately from the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Framing {
    Empty,
    Wrapped,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Entry {
    name: String,
    value: String,
    framing: Framing,
}

impl Entry {
    fn new(name: String, value: String) -> Self {
        let framing = if value.is_empty() {
            Framing::Empty
        } else {
            Framing::Wrapped
        };
        Self {
            name,
            value,
            framing,
        }
    }
}

/// Certificate critical options or extensions.
///
/// Entries keep their wire order, and re-encoding reproduces the decoded
/// bytes exactly. Duplicate names read from the wire are preserved; lookups
/// see the last entry with a given name.
///
/// Equality compares the `(name, value)` sequence.
#[derive(Debug, Clone, Default)]
pub struct CertificateOptions {
    entries: Vec<Entry>,
}

impl CertificateOptions {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the last entry named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Whether any entry is named `name`.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Set `name` to `value`.
    ///
    /// An existing entry is updated in place and any later duplicates are
    /// dropped; otherwise the entry is appended. Returns the previous value.
    ///
    /// An empty value written over an explicitly framed empty value keeps
    /// that framing, so the encoding does not change.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let mut entry = Entry::new(name.into(), value.into());
        let Some(first) = self.entries.iter().position(|e| e.name == entry.name) else {
            self.entries.push(entry);
            return None;
        };

        if entry.value.is_empty() {
            entry.framing = self.entries[first].framing;
        }
        let previous = self.get(&entry.name).map(str::to_owned);
        let name = entry.name.clone();
        self.entries[first] = entry;
        let mut index = 0;
        self.entries.retain(|e| {
            let keep = index <= first || e.name != name;
            index += 1;
            keep
        });
        previous
    }

    /// Remove every entry named `name`, returning the last value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let previous = self.get(name).map(str::to_owned);
        self.entries.retain(|e| e.name != name);
        previous
    }

    /// Iterate `(name, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    /// Iterate names in wire order, duplicates included.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Read a list framed as one `string` of name/data pairs.
    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, SshKeyError> {
        let mut list = reader.read_nested()?;
        let mut entries = Vec::new();
        while !list.is_empty() {
            let name = list
                .read_utf8()
                .map_err(|e| e.complete_input("truncated option name"))?;
            let data = list
                .read_string()
                .map_err(|e| e.complete_input("truncated option data"))?;
            let entry = if data.is_empty() {
                Entry {
                    name: name.to_owned(),
                    value: String::new(),
                    framing: Framing::Empty,
                }
            } else {
                let mut inner = WireReader::new(data);
                let value = inner
                    .read_utf8()
                    .map_err(|e| e.complete_input("truncated option value"))?;
                inner.expect_end("trailing option data")?;
                Entry {
                    name: name.to_owned(),
                    value: value.to_owned(),
                    framing: Framing::Wrapped,
                }
            };
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Length of the list body, without its own length prefix.
    pub(crate) fn encoded_len(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| {
                let data = match entry.framing {
                    Framing::Empty => 0,
                    Framing::Wrapped => 4 + entry.value.len(),
                };
                4 + entry.name.len() + 4 + data
            })
            .sum()
    }

    /// Write the list as one `string` of name/data pairs.
    pub(crate) fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_nested(|list| {
            for entry in &self.entries {
                list.put_ssh_str(&entry.name);
                match entry.framing {
                    Framing::Empty => list.put_ssh_string(&[]),
                    Framing::Wrapped => list.put_ssh_nested(|data| data.put_ssh_str(&entry.value)),
                }
            }
        });
    }
}

impl PartialEq for CertificateOptions {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for CertificateOptions {}

impl std::hash::Hash for CertificateOptions {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for (name, value) in self.iter() {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CertificateOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for CertificateOptions {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<CertificateOptions, SshKeyError> {
        let mut reader = WireReader::new(bytes);
        let options = CertificateOptions::read(&mut reader)?;
        reader.expect_end("trailing")?;
        Ok(options)
    }

    fn encode(options: &CertificateOptions) -> Vec<u8> {
        let mut buf = Vec::new();
        options.encode(&mut buf);
        buf
    }

    #[test]
    fn test_wire_framing_matches_openssh() {
        let options = CertificateOptions::from([("cats", "dogs"), ("permit-pty", "")]);
        let bytes = encode(&options);

        let mut expected = Vec::new();
        expected.put_ssh_nested(|list| {
            list.put_ssh_str("cats");
            list.put_ssh_nested(|data| data.put_ssh_str("dogs"));
            list.put_ssh_str("permit-pty");
            list.put_ssh_string(&[]);
        });
        assert_eq!(bytes, expected);
        assert_eq!(decode(&bytes).unwrap(), options);
    }

    #[test]
    fn test_explicit_empty_value_reencodes_exactly() {
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            list.put_ssh_str("force-command");
            list.put_ssh_nested(|data| data.put_ssh_str(""));
        });

        let options = decode(&bytes).unwrap();
        assert_eq!(options.get("force-command"), Some(""));
        assert_eq!(encode(&options), bytes);
    }

    #[test]
    fn test_duplicates_preserved_and_last_wins() {
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            for value in ["first", "second"] {
                list.put_ssh_str("source-address");
                list.put_ssh_nested(|data| data.put_ssh_str(value));
            }
        });

        let options = decode(&bytes).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options.get("source-address"), Some("second"));
        assert_eq!(encode(&options), bytes);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut options = CertificateOptions::from([("a", "1"), ("b", "2")]);
        assert_eq!(options.insert("a", "3"), Some("1".to_string()));
        assert_eq!(options.insert("c", "4"), None);

        let pairs: Vec<_> = options.iter().collect();
        assert_eq!(pairs, [("a", "3"), ("b", "2"), ("c", "4")]);
    }

    #[test]
    fn test_insert_collapses_duplicates() {
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            for (name, value) in [("x", "1"), ("y", "2"), ("x", "3")] {
                list.put_ssh_str(name);
                list.put_ssh_nested(|data| data.put_ssh_str(value));
            }
        });
        let mut options = decode(&bytes).unwrap();

        assert_eq!(options.insert("x", "4"), Some("3".to_string()));
        let pairs: Vec<_> = options.iter().collect();
        assert_eq!(pairs, [("x", "4"), ("y", "2")]);
    }

    #[test]
    fn test_insert_keeps_explicit_empty_framing() {
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            list.put_ssh_str("force-command");
            list.put_ssh_nested(|data| data.put_ssh_str(""));
        });
        let mut options = decode(&bytes).unwrap();

        assert_eq!(options.insert("force-command", ""), Some(String::new()));
        assert_eq!(encode(&options), bytes);

        // A real value is framed, and clearing it again keeps the framing.
        options.insert("force-command", "id");
        options.insert("force-command", "");
        assert_eq!(encode(&options), bytes);
    }

    #[test]
    fn test_insert_empty_over_flag_stays_flag() {
        let mut options = CertificateOptions::from([("permit-pty", "")]);
        let before = encode(&options);
        options.insert("permit-pty", "");
        assert_eq!(encode(&options), before);
    }

    #[test]
    fn test_encoded_len_matches_encoding() {
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            list.put_ssh_str("force-command");
            list.put_ssh_nested(|data| data.put_ssh_str(""));
            list.put_ssh_str("permit-pty");
            list.put_ssh_string(&[]);
            list.put_ssh_str("cats");
            list.put_ssh_nested(|data| data.put_ssh_str("dogs"));
        });
        let options = decode(&bytes).unwrap();
        assert_eq!(options.encoded_len() + 4, bytes.len());
        assert_eq!(CertificateOptions::new().encoded_len(), 0);
    }

    #[test]
    fn test_remove() {
        let mut options = CertificateOptions::from([("a", "1"), ("b", "2")]);
        assert_eq!(options.remove("a"), Some("1".to_string()));
        assert_eq!(options.remove("a"), None);
        assert!(!options.contains_key("a"));
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_malformed_data_rejected() {
        // Data that is not itself a string.
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| {
            list.put_ssh_str("cats");
            list.put_ssh_string(b"dogs");
        });
        assert!(matches!(decode(&bytes), Err(SshKeyError::Malformed(_))));

        // A name with no data field.
        let mut bytes = Vec::new();
        bytes.put_ssh_nested(|list| list.put_ssh_str("cats"));
        assert!(matches!(decode(&bytes), Err(SshKeyError::Malformed(_))));
    }

    #[test]
    fn test_truncated_list_needs_more_data() {
        let bytes = encode(&CertificateOptions::from([("cats", "dogs")]));
        for len in 0..bytes.len() {
            assert_eq!(decode(&bytes[..len]).unwrap_err(), SshKeyError::NeedMoreData);
        }
    }
}
