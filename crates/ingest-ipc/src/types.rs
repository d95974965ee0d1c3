//! Configuration snapshot types.

use serde::{Deserialize, Serialize};

/// One configuration section: ordered `(key, value)` entries, already decoded to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSection {
    /// Section name, e.g. `source.cam1` or `mix`.
    pub name: String,

    /// Entries in declaration order.
    #[serde(default)]
    pub entries: Vec<(String, String)>,
}

impl ConfigSection {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Value of a key. The last declaration wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries as borrowed pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Immutable view of the configuration handed to a source at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Sections in declaration order.
    #[serde(default)]
    pub sections: Vec<ConfigSection>,
}

impl ConfigSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section.
    pub fn with_section(mut self, section: ConfigSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Value of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Section name holding the settings of a capture source.
    pub fn source_section_name(source: &str) -> String {
        format!("source.{source}")
    }
}
