//! Export settings model
//!
//! `ExportSettings` is the record persisted inside a document's metadata:
//! the schema version that wrote it, the last export target and the
//! exporter options used for that target.

use crate::version::SCHEMA_VERSION;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Path placeholder for a document that has never been exported
pub const NEVER_EXPORTED: &str = "  -- Image not exported yet --";

/// Path placeholder for a document whose source format cannot hold settings
pub const UNSUPPORTED_SOURCE: &str = "  -- Not a Krita file --";

/// The persisted export configuration of a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Version tag of the tool that produced these settings
    pub schema_version: String,
    /// Last export target, or one of the sentinel placeholders
    pub export_path: String,
    /// Exporter-specific options, in insertion order
    pub format_options: FormatOptions,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            export_path: NEVER_EXPORTED.to_string(),
            format_options: FormatOptions::new(),
        }
    }
}

impl ExportSettings {
    /// Create settings pointing at a real export path with no options
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            export_path: path.into(),
            ..Self::default()
        }
    }

    /// Settings for a document whose format cannot carry a configuration
    pub fn unsupported_source() -> Self {
        Self {
            export_path: UNSUPPORTED_SOURCE.to_string(),
            ..Self::default()
        }
    }

    /// Classify the export path
    pub fn target(&self) -> ExportTarget<'_> {
        ExportTarget::classify(&self.export_path)
    }

    /// Whether the export path is a real filesystem target
    pub fn has_real_path(&self) -> bool {
        matches!(self.target(), ExportTarget::Path(_))
    }
}

/// What the `export_path` field actually refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget<'a> {
    /// The document was never exported
    NeverExported,
    /// The document is not in the native container format
    UnsupportedSource,
    /// A real export path
    Path(&'a str),
}

impl<'a> ExportTarget<'a> {
    /// Map a stored path string onto its meaning
    pub fn classify(path: &'a str) -> Self {
        match path {
            NEVER_EXPORTED => ExportTarget::NeverExported,
            UNSUPPORTED_SOURCE => ExportTarget::UnsupportedSource,
            "" => ExportTarget::NeverExported,
            path => ExportTarget::Path(path),
        }
    }

    /// The real path, if any
    pub fn path(&self) -> Option<&'a str> {
        match self {
            ExportTarget::Path(path) => Some(path),
            _ => None,
        }
    }
}

/// Insertion-ordered option map with unique keys
///
/// Re-inserting a key replaces its value in place, so the original
/// position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    entries: Vec<(String, String)>,
}

impl FormatOptions {
    /// Create an empty option map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an option, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get the value of an option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove an option, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Check whether an option is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormatOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = FormatOptions::new();
        options.extend(iter);
        options
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FormatOptions {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for FormatOptions {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FormatOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormatOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = FormatOptions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of option names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut options = FormatOptions::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    options.insert(key, value);
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}
