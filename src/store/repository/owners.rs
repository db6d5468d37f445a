//! Repository for owner records
//!
//! An owner is the scope persisted options belong to (typically the cluster).

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Canonical owner record
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Owner {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Get an owner by name
pub async fn get(pool: &SqlitePool, name: &str) -> Result<Option<Owner>> {
    sqlx::query_as::<_, Owner>("SELECT id, uuid, name, created_at FROM owners WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get owner '{}'", name))
}

/// Resolve the canonical owner for a scope, creating it on first use
pub async fn get_or_create(pool: &SqlitePool, name: &str) -> Result<Owner> {
    if let Some(owner) = get(pool, name).await? {
        return Ok(owner);
    }

    // Another process may create the same owner concurrently
    sqlx::query("INSERT OR IGNORE INTO owners (uuid, name) VALUES (?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create owner '{}'", name))?;

    log::info!("Created owner: {}", name);

    get(pool, name)
        .await?
        .with_context(|| format!("Owner '{}' missing after creation", name))
}

/// List all owners
pub async fn list(pool: &SqlitePool) -> Result<Vec<Owner>> {
    sqlx::query_as::<_, Owner>("SELECT id, uuid, name, created_at FROM owners ORDER BY name")
        .fetch_all(pool)
        .await
        .context("Failed to list owners")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db;

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        assert!(get(&pool, "cluster").await.unwrap().is_none());

        let first = get_or_create(&pool, "cluster").await.unwrap();
        let second = get_or_create(&pool, "cluster").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "cluster");
        assert!(uuid::Uuid::parse_str(&first.uuid).is_ok());

        get_or_create(&pool, "team-a").await.unwrap();
        assert_eq!(list(&pool).await.unwrap().len(), 2);
    }
}
