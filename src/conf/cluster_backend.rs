//! Owner-scoped persisted backend with per-key TTL caching

use super::backend::ConfBackend;
use super::cache::{CacheStats, OptionCache};
use super::error::{ConfError, Result};
use crate::options::{OptionDescriptor, OptionStore};
use crate::store::repository::{config_options, owners};
use crate::store::Owner;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use sqlx::SqlitePool;

/// Backend reading and writing `config_options` rows of one owner
///
/// Reads go through a private [`OptionCache`]. A cached read is served only
/// when the caller allows it and the descriptor's `cache_ttl` has not elapsed;
/// every store read refreshes the entry, even for a ttl of zero. Writes leave
/// the cache alone, deletes always evict.
pub struct ClusterBackend {
    pool: SqlitePool,
    owner: Owner,
    cache: OptionCache,
}

impl ClusterBackend {
    /// Bind to the owner named `owner_name`, creating it if needed
    pub async fn new(pool: SqlitePool, owner_name: &str) -> anyhow::Result<Self> {
        let owner = owners::get_or_create(&pool, owner_name).await?;
        Ok(Self::with_owner(pool, owner))
    }

    pub fn with_owner(pool: SqlitePool, owner: Owner) -> Self {
        Self {
            pool,
            owner,
            cache: OptionCache::new(),
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Drop the cached read for `key`
    pub fn evict(&self, key: &str) -> bool {
        self.cache.evict(self.owner.id, key)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn ensure_persisted(&self, def: &OptionDescriptor, operation: &'static str) -> Result<()> {
        if def.store != OptionStore::Persisted {
            return Err(ConfError::unsupported(&def.key, operation, self.name()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfBackend for ClusterBackend {
    fn name(&self) -> &'static str {
        "persisted"
    }

    async fn fetch(&self, def: &OptionDescriptor, check_cache: bool) -> Result<Option<Value>> {
        self.ensure_persisted(def, "get")?;

        if check_cache && def.cache_ttl > 0 {
            if let Some(value) = self.cache.lookup(self.owner.id, &def.key, def.cache_ttl) {
                return Ok(value);
            }
        }

        let value = config_options::get(&self.pool, self.owner.id, &def.key)
            .await?
            .map(|row| row.value)
            .filter(|value| !value.is_null());

        self.cache.store(self.owner.id, &def.key, value.clone());
        Ok(value)
    }

    async fn write(&self, def: &OptionDescriptor, value: Value) -> Result<()> {
        self.ensure_persisted(def, "set")?;
        config_options::upsert(&self.pool, self.owner.id, &def.key, &value).await?;
        Ok(())
    }

    async fn remove(&self, def: &OptionDescriptor) -> Result<()> {
        self.ensure_persisted(def, "delete")?;

        self.cache.evict(self.owner.id, &def.key);
        let existed = config_options::delete(&self.pool, self.owner.id, &def.key).await?;
        debug!(
            "Deleted option: {} (owner {}, existed: {})",
            def.key, self.owner.name, existed
        );
        Ok(())
    }
}
