//! Backend capability set shared by all option stores

use super::error::Result;
use crate::options::OptionDescriptor;
use async_trait::async_trait;
use serde_json::Value;

/// Raw access to the store owning an option's value
///
/// Backends see descriptors only after the service validated the key and the
/// value; they return raw, uncoerced values and signal "no entry" with `None`.
#[async_trait]
pub trait ConfBackend: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Read the raw value, optionally served from a cache
    async fn fetch(&self, def: &OptionDescriptor, check_cache: bool) -> Result<Option<Value>>;

    /// Create or replace the stored value
    async fn write(&self, def: &OptionDescriptor, value: Value) -> Result<()>;

    /// Remove the stored value
    async fn remove(&self, def: &OptionDescriptor) -> Result<()>;
}
