//! Fluent builder API for creating option descriptors

use super::option::{OptionDescriptor, OptionStore};
use super::types::ConfType;
use anyhow::Result;
use serde_json::Value;

/// Builder for creating option descriptors with a fluent API
///
/// Options start out optional, per-owner, non-secret, scalar, untyped, backed
/// by settings and uncached.
pub struct OptionBuilder {
    key: String,
    is_global: bool,
    is_secret: bool,
    is_optional: bool,
    is_list: bool,
    store: OptionStore,
    typing: Option<ConfType>,
    default: Option<Value>,
    options: Option<Vec<Value>>,
    cache_ttl: u64,
    description: Option<String>,
}

impl OptionBuilder {
    /// Create a new builder for an option key
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            is_global: false,
            is_secret: false,
            is_optional: true,
            is_list: false,
            store: OptionStore::Settings,
            typing: None,
            default: None,
            options: None,
            cache_ttl: 0,
            description: None,
        }
    }

    /// Mark as applying cluster-wide
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    /// Mark as secret (redacted in dict representations)
    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }

    /// Mark as required; resolution fails when the backend has no value
    pub fn required(mut self) -> Self {
        self.is_optional = false;
        self
    }

    /// Mark as a list of `typing` values
    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    /// Set the owning backend
    pub fn store(mut self, store: OptionStore) -> Self {
        self.store = store;
        self
    }

    /// Shorthand for `store(OptionStore::Persisted)`
    pub fn persisted(self) -> Self {
        self.store(OptionStore::Persisted)
    }

    /// Set the scalar type used for coercion
    pub fn typing(mut self, ty: ConfType) -> Self {
        self.typing = Some(ty);
        self
    }

    /// Set the default value
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict values to an allowed set
    pub fn allowed(mut self, values: Vec<Value>) -> Self {
        self.options = Some(values);
        self
    }

    /// Set the cache time-to-live in seconds
    pub fn cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl = seconds;
        self
    }

    /// Set the description (help text)
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Build the option descriptor
    ///
    /// Returns an error if the key is empty or the default does not fit the
    /// declared type and allowed values.
    pub fn build(self) -> Result<OptionDescriptor> {
        if self.key.trim().is_empty() {
            anyhow::bail!("option key is required");
        }

        let mut def = OptionDescriptor {
            key: self.key,
            is_global: self.is_global,
            is_secret: self.is_secret,
            is_optional: self.is_optional,
            is_list: self.is_list,
            store: self.store,
            typing: self.typing,
            default: None,
            options: self.options,
            cache_ttl: self.cache_ttl,
            description: self.description.unwrap_or_default(),
        };

        // A null default is the same as no default
        def.default = match self.default {
            Some(Value::Null) | None => None,
            Some(value) => Some(
                def.coerce(&value)
                    .map_err(|e| anyhow::anyhow!("invalid default: {}", e))?,
            ),
        };

        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let def = OptionBuilder::new("FOO_BAR").build().unwrap();

        assert_eq!(def.key, "FOO_BAR");
        assert!(def.is_optional);
        assert!(!def.is_global);
        assert!(!def.is_secret);
        assert!(!def.is_list);
        assert_eq!(def.store, OptionStore::Settings);
        assert_eq!(def.typing, None);
        assert_eq!(def.default, None);
        assert_eq!(def.cache_ttl, 0);
        assert_eq!(def.description, "");
    }

    #[test]
    fn test_persisted_builder() {
        let def = OptionBuilder::new("BUILD_JOBS_IMAGE_REUSE_SECONDS")
            .global()
            .persisted()
            .typing(ConfType::Int)
            .default(json!("3600"))
            .cache_ttl(60)
            .description("Reuse window")
            .build()
            .unwrap();

        assert_eq!(def.store, OptionStore::Persisted);
        assert!(def.is_global);
        // Default is coerced at build time
        assert_eq!(def.default, Some(json!(3600)));
        assert_eq!(def.cache_ttl, 60);
        assert_eq!(def.description, "Reuse window");
    }

    #[test]
    fn test_null_default_is_no_default() {
        let def = OptionBuilder::new("FOO_BAR").default(Value::Null).build().unwrap();
        assert_eq!(def.default, None);
    }

    #[test]
    fn test_missing_key() {
        assert!(OptionBuilder::new("  ").build().is_err());
    }

    #[test]
    fn test_default_must_match_type() {
        let result = OptionBuilder::new("FLAG")
            .typing(ConfType::Bool)
            .default(json!("sometimes"))
            .build();
        assert!(result.is_err());

        let result = OptionBuilder::new("MODE")
            .allowed(vec![json!("a"), json!("b")])
            .default(json!("c"))
            .build();
        assert!(result.is_err());
    }
}
