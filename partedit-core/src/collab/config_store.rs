// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

/// A value stored under a configuration-store key, loosely modeled on
/// Windows registry value types (the only two the firmware map and
/// mount-point writer need).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigValue {
    /// A NUL-terminated or plain string value (`REG_SZ`-like).
    Str(String),
    /// An opaque binary blob (`REG_BINARY`-like).
    Binary(Vec<u8>),
}

impl ConfigValue {
    /// Borrow the value as a string, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// Borrow the value as bytes, if it is binary.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            Self::Str(_) => None,
        }
    }
}

/// Hierarchical key/value configuration store, standing in for the
/// Windows registry paths the firmware map reads and the mount-point
/// writer writes.
pub trait ConfigStore {
    /// List the immediate subkey names under `path`, in an
    /// implementation-defined but stable order.
    fn subkeys(&self, path: &str) -> Vec<String>;

    /// Read a named value under `path`.
    fn read_value(&self, path: &str, name: &str) -> Option<ConfigValue>;

    /// Write a named value under `path`, creating the key if needed.
    fn write_value(&mut self, path: &str, name: &str, value: ConfigValue);
}

/// In-memory [`ConfigStore`] used by tests in place of the registry.
#[derive(Clone, Debug, Default)]
pub struct MapConfigStore {
    subkeys: BTreeMap<String, Vec<String>>,
    values: BTreeMap<(String, String), ConfigValue>,
}

impl MapConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subkey under `parent`, appending it to the ordered
    /// child list if not already present.
    pub fn add_subkey(&mut self, parent: &str, child: &str) {
        let children = self.subkeys.entry(parent.to_string()).or_default();
        if !children.iter().any(|c| c == child) {
            children.push(child.to_string());
        }
    }
}

impl ConfigStore for MapConfigStore {
    fn subkeys(&self, path: &str) -> Vec<String> {
        self.subkeys.get(path).cloned().unwrap_or_default()
    }

    fn read_value(&self, path: &str, name: &str) -> Option<ConfigValue> {
        self.values.get(&(path.to_string(), name.to_string())).cloned()
    }

    fn write_value(&mut self, path: &str, name: &str, value: ConfigValue) {
        self.values.insert((path.to_string(), name.to_string()), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_config_store_roundtrip() {
        let mut store = MapConfigStore::new();
        store.add_subkey("root", "0");
        store.add_subkey("root", "1");
        assert_eq!(store.subkeys("root"), vec!["0", "1"]);

        store.write_value("root/0", "Identifier", ConfigValue::Str("A-B-0".into()));
        assert_eq!(
            store.read_value("root/0", "Identifier").unwrap().as_str(),
            Some("A-B-0")
        );
        assert!(store.read_value("root/0", "Missing").is_none());
    }
}
