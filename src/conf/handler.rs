//! Routing of option calls to the service owning each key

use super::cluster_backend::ClusterBackend;
use super::error::{ConfError, Result};
use super::service::ConfService;
use super::settings_backend::SettingsBackend;
use super::{ClusterConfService, SettingsConfService};
use crate::options::{registrations, OptionDescriptor, OptionDict, OptionStore, OptionsRegistry};
use crate::settings::Settings;
use crate::store::db;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Owner persisted options belong to when none is given
pub const DEFAULT_OWNER: &str = "cluster";

/// One registry, both services; calls are routed by `descriptor.store`
pub struct ConfHandler {
    registry: Arc<OptionsRegistry>,
    settings: SettingsConfService,
    cluster: ClusterConfService,
}

impl ConfHandler {
    pub fn new(registry: Arc<OptionsRegistry>, settings: Arc<Settings>, cluster: ClusterBackend) -> Self {
        Self {
            settings: ConfService::new(registry.clone(), SettingsBackend::new(settings)),
            cluster: ConfService::new(registry.clone(), cluster),
            registry,
        }
    }

    /// Load settings, open the database at `db_path` and subscribe built-in options
    pub async fn open(settings: Settings, db_path: &Path, owner: &str) -> anyhow::Result<Self> {
        let pool = db::connect(db_path).await?;
        db::run_migrations(&pool).await?;

        let registry = Arc::new(OptionsRegistry::new());
        registrations::register_all(&registry)?;

        let cluster = ClusterBackend::new(pool, owner).await?;
        log::info!(
            "Option handler ready: {} options, owner '{}'",
            registry.count(),
            owner
        );
        Ok(Self::new(registry, Arc::new(settings), cluster))
    }

    /// [`ConfHandler::open`] with settings and database at their default locations
    pub async fn load() -> anyhow::Result<Self> {
        let settings = Settings::load()?;
        let db_path = db::default_db_path()?;
        Self::open(settings, &db_path, DEFAULT_OWNER).await
    }

    pub fn registry(&self) -> &Arc<OptionsRegistry> {
        &self.registry
    }

    pub fn settings_service(&self) -> &SettingsConfService {
        &self.settings
    }

    pub fn cluster_service(&self) -> &ClusterConfService {
        &self.cluster
    }

    pub fn subscribe(&self, def: OptionDescriptor) {
        self.registry.subscribe(def);
    }

    pub fn can_handle(&self, key: &str) -> bool {
        self.registry.can_handle(key)
    }

    pub async fn get(&self, key: &str, check_cache: bool) -> Result<Option<Value>> {
        match self.registry.get_descriptor(key)?.store {
            OptionStore::Settings => self.settings.get(key, check_cache).await,
            OptionStore::Persisted => self.cluster.get(key, check_cache).await,
        }
    }

    pub async fn get_dict(&self, key: &str, check_cache: bool) -> Result<OptionDict> {
        match self.registry.get_descriptor(key)?.store {
            OptionStore::Settings => self.settings.get_dict(key, check_cache).await,
            OptionStore::Persisted => self.cluster.get_dict(key, check_cache).await,
        }
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        match self.registry.get_descriptor(key)?.store {
            OptionStore::Settings => self.settings.set(key, value).await,
            OptionStore::Persisted => self.cluster.set(key, value).await,
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match self.registry.get_descriptor(key)?.store {
            OptionStore::Settings => self.settings.delete(key).await,
            OptionStore::Persisted => self.cluster.delete(key).await,
        }
    }

    /// Dict representations of every subscribed option, secrets redacted
    pub async fn list_dicts(&self) -> Result<Vec<OptionDict>> {
        let mut dicts = Vec::new();
        for def in self.registry.list_all() {
            let dict = match self.get_dict(&def.key, true).await {
                Ok(dict) => dict,
                // Unset required options are still listed so forms can show them
                Err(ConfError::MissingRequiredOption(_)) => def.to_dict(None),
                Err(e) => return Err(e),
            };
            dicts.push(dict);
        }
        Ok(dicts)
    }
}
