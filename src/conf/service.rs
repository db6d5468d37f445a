//! Shared get/set/delete protocol over a backend

use super::backend::ConfBackend;
use super::error::{ConfError, Result};
use crate::options::{OptionDescriptor, OptionDict, OptionsRegistry};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Option service bound to a registry and a backend
///
/// Checks run in a fixed order: unknown key, then missing required value on
/// reads, then invalid value on writes, then whatever the backend rejects.
pub struct ConfService<B> {
    registry: Arc<OptionsRegistry>,
    backend: B,
}

impl<B: ConfBackend> ConfService<B> {
    pub fn new(registry: Arc<OptionsRegistry>, backend: B) -> Self {
        Self { registry, backend }
    }

    pub fn registry(&self) -> &Arc<OptionsRegistry> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check whether the registry knows `key`
    pub fn can_handle(&self, key: &str) -> bool {
        self.registry.can_handle(key)
    }

    /// Descriptor for `key`, for building forms or redacted views
    pub fn descriptor(&self, key: &str) -> Result<OptionDescriptor> {
        self.registry.get_descriptor(key)
    }

    /// Resolve the value of `key`
    ///
    /// Returns `Ok(None)` for an optional option with no value and no default.
    pub async fn get(&self, key: &str, check_cache: bool) -> Result<Option<Value>> {
        let def = self.registry.get_descriptor(key)?;
        self.resolve(&def, check_cache).await
    }

    /// Resolve `key` into its dict representation
    pub async fn get_dict(&self, key: &str, check_cache: bool) -> Result<OptionDict> {
        let def = self.registry.get_descriptor(key)?;
        let value = self.resolve(&def, check_cache).await?;
        Ok(def.to_dict(value))
    }

    /// Validate and store a value for `key`
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        let def = self.registry.get_descriptor(key)?;
        if value.is_null() {
            return Err(ConfError::invalid(key, "value cannot be null"));
        }

        let value = def.coerce(&value)?;
        self.backend.write(&def, value).await?;
        debug!("Set option {} on {} backend", key, self.backend.name());
        Ok(())
    }

    /// Remove the stored value for `key`
    pub async fn delete(&self, key: &str) -> Result<()> {
        let def = self.registry.get_descriptor(key)?;
        self.backend.remove(&def).await?;
        debug!("Deleted option {} on {} backend", key, self.backend.name());
        Ok(())
    }

    pub async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_typed(key, Value::as_bool, "bool").await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_typed(key, Value::as_i64, "int").await
    }

    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.get_typed(key, Value::as_f64, "float").await
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_typed(key, |v| v.as_str().map(str::to_string), "str")
            .await
    }

    async fn get_typed<T>(
        &self,
        key: &str,
        extract: impl Fn(&Value) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>> {
        match self.get(key, true).await? {
            Some(value) => extract(&value)
                .map(Some)
                .ok_or_else(|| ConfError::invalid(key, format!("expected {}, got {}", expected, value))),
            None => Ok(None),
        }
    }

    async fn resolve(&self, def: &OptionDescriptor, check_cache: bool) -> Result<Option<Value>> {
        match self.backend.fetch(def, check_cache).await? {
            Some(raw) if !raw.is_null() => def.coerce(&raw).map(Some),
            _ if !def.is_optional => Err(ConfError::MissingRequiredOption(def.key.clone())),
            // Defaults are coerced when the descriptor is built
            _ => Ok(def.default.clone()),
        }
    }
}
