//! Subscription registry mapping option keys to descriptors

use super::option::{OptionDescriptor, OptionStore};
use crate::conf::error::{ConfError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe registry of subscribed option descriptors
///
/// Services consult the registry before any backend access; a key that was
/// never subscribed is rejected with [`ConfError::UnknownOption`].
pub struct OptionsRegistry {
    definitions: RwLock<HashMap<String, OptionDescriptor>>,
}

impl OptionsRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe a descriptor, replacing any earlier one with the same key
    pub fn subscribe(&self, def: OptionDescriptor) {
        let mut defs = self
            .definitions
            .write()
            .expect("options registry lock poisoned");
        if defs.contains_key(&def.key) {
            log::debug!("Replacing subscription for option: {}", def.key);
        } else {
            log::debug!("Subscribed option: {} ({})", def.key, def.store);
        }
        defs.insert(def.key.clone(), def);
    }

    /// Check whether a key is subscribed
    pub fn can_handle(&self, key: &str) -> bool {
        !key.is_empty()
            && self
                .definitions
                .read()
                .expect("options registry lock poisoned")
                .contains_key(key)
    }

    /// Get descriptor by key
    pub fn get_descriptor(&self, key: &str) -> Result<OptionDescriptor> {
        self.definitions
            .read()
            .expect("options registry lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| ConfError::UnknownOption(key.to_string()))
    }

    /// All subscribed keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let defs = self.definitions.read().expect("options registry lock poisoned");
        let mut keys: Vec<_> = defs.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// List all descriptors owned by one backend
    pub fn list_store(&self, store: OptionStore) -> Vec<OptionDescriptor> {
        let defs = self.definitions.read().expect("options registry lock poisoned");
        let mut options: Vec<_> = defs
            .values()
            .filter(|def| def.store == store)
            .cloned()
            .collect();

        // Sort by key for consistent ordering
        options.sort_by(|a, b| a.key.cmp(&b.key));
        options
    }

    /// List all descriptors
    pub fn list_all(&self) -> Vec<OptionDescriptor> {
        let defs = self.definitions.read().expect("options registry lock poisoned");
        let mut options: Vec<_> = defs.values().cloned().collect();
        options.sort_by(|a, b| a.key.cmp(&b.key));
        options
    }

    /// Get total number of subscribed options
    pub fn count(&self) -> usize {
        self.definitions
            .read()
            .expect("options registry lock poisoned")
            .len()
    }
}

impl Default for OptionsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::error::ConfErrorKind;
    use crate::options::OptionBuilder;

    #[test]
    fn test_subscribe_and_can_handle() {
        let registry = OptionsRegistry::new();
        assert!(!registry.can_handle("FOO_BAR"));
        assert!(!registry.can_handle(""));

        registry.subscribe(OptionBuilder::new("FOO_BAR").build().unwrap());
        assert!(registry.can_handle("FOO_BAR"));
        assert!(!registry.can_handle("foo_bar"));
    }

    #[test]
    fn test_unknown_descriptor() {
        let registry = OptionsRegistry::new();
        let err = registry.get_descriptor("MISSING").unwrap_err();
        assert_eq!(err.kind(), ConfErrorKind::UnknownOption);
    }

    #[test]
    fn test_later_subscription_wins() {
        let registry = OptionsRegistry::new();
        registry.subscribe(OptionBuilder::new("FOO_BAR").cache_ttl(0).build().unwrap());
        registry.subscribe(OptionBuilder::new("FOO_BAR").cache_ttl(10).build().unwrap());

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get_descriptor("FOO_BAR").unwrap().cache_ttl, 10);
    }

    #[test]
    fn test_list_store() {
        let registry = OptionsRegistry::new();
        registry.subscribe(OptionBuilder::new("B").persisted().build().unwrap());
        registry.subscribe(OptionBuilder::new("A").persisted().build().unwrap());
        registry.subscribe(OptionBuilder::new("C").build().unwrap());

        let persisted = registry.list_store(OptionStore::Persisted);
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].key, "A");

        assert_eq!(registry.list_store(OptionStore::Settings).len(), 1);
        assert_eq!(registry.keys(), vec!["A", "B", "C"]);
        assert_eq!(registry.list_all().len(), 3);
    }
}
