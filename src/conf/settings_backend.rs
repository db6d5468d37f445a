//! Read-only backend over process-wide settings

use super::backend::ConfBackend;
use super::error::{ConfError, Result};
use crate::options::OptionDescriptor;
use crate::settings::Settings;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Backend reading live values from [`Settings`]
///
/// Settings are provisioned by the deployment, so writes and deletes are
/// always rejected. There is no cache: every fetch reads the current value.
pub struct SettingsBackend {
    settings: Arc<Settings>,
}

impl SettingsBackend {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }
}

#[async_trait]
impl ConfBackend for SettingsBackend {
    fn name(&self) -> &'static str {
        "settings"
    }

    async fn fetch(&self, def: &OptionDescriptor, _check_cache: bool) -> Result<Option<Value>> {
        Ok(self.settings.get(&def.key))
    }

    async fn write(&self, def: &OptionDescriptor, _value: Value) -> Result<()> {
        Err(ConfError::unsupported(&def.key, "set", self.name()))
    }

    async fn remove(&self, def: &OptionDescriptor) -> Result<()> {
        Err(ConfError::unsupported(&def.key, "delete", self.name()))
    }
}
