//! Repository for owner-scoped option rows
//!
//! Values are type-erased JSON on disk and coerced by the option services on
//! read. At most one row exists per `(owner, key)`.

use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// Stored option row
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOptionRow {
    pub id: i64,
    pub owner_id: i64,
    pub key: String,
    pub value: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct RawRow {
    id: i64,
    owner_id: i64,
    key: String,
    value: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RawRow> for ConfigOptionRow {
    type Error = anyhow::Error;

    fn try_from(raw: RawRow) -> Result<Self> {
        let value = serde_json::from_str(&raw.value)
            .with_context(|| format!("Failed to parse stored value for option '{}'", raw.key))?;

        Ok(Self {
            id: raw.id,
            owner_id: raw.owner_id,
            key: raw.key,
            value,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

/// Get the row for `(owner, key)`
pub async fn get(pool: &SqlitePool, owner_id: i64, key: &str) -> Result<Option<ConfigOptionRow>> {
    let row: Option<RawRow> = sqlx::query_as(
        r#"
        SELECT id, owner_id, key, value, created_at, updated_at
        FROM config_options
        WHERE owner_id = ? AND key = ?
        "#,
    )
    .bind(owner_id)
    .bind(key)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to fetch option '{}'", key))?;

    row.map(ConfigOptionRow::try_from).transpose()
}

/// Create or update the row for `(owner, key)`
pub async fn upsert(pool: &SqlitePool, owner_id: i64, key: &str, value: &Value) -> Result<()> {
    let value_json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for option '{}'", key))?;

    sqlx::query(
        r#"
        INSERT INTO config_options (owner_id, key, value, created_at, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(owner_id, key) DO UPDATE SET
            value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(owner_id)
    .bind(key)
    .bind(&value_json)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to set option '{}'", key))?;

    log::debug!("Stored option: {} (owner {})", key, owner_id);
    Ok(())
}

/// Delete the row for `(owner, key)`; returns whether a row existed
pub async fn delete(pool: &SqlitePool, owner_id: i64, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM config_options WHERE owner_id = ? AND key = ?")
        .bind(owner_id)
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete option '{}'", key))?;

    Ok(result.rows_affected() > 0)
}

/// List all rows of an owner, ordered by key
pub async fn list(pool: &SqlitePool, owner_id: i64) -> Result<Vec<ConfigOptionRow>> {
    let rows: Vec<RawRow> = sqlx::query_as(
        r#"
        SELECT id, owner_id, key, value, created_at, updated_at
        FROM config_options
        WHERE owner_id = ?
        ORDER BY key
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("Failed to list options")?;

    rows.into_iter().map(ConfigOptionRow::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db;
    use crate::store::repository::owners;
    use serde_json::json;

    async fn setup() -> (SqlitePool, i64) {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let owner = owners::get_or_create(&pool, "cluster").await.unwrap();
        (pool, owner.id)
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row() {
        let (pool, owner_id) = setup().await;

        assert!(get(&pool, owner_id, "FOO_BAR").await.unwrap().is_none());

        upsert(&pool, owner_id, "FOO_BAR", &json!("foo")).await.unwrap();
        let first = get(&pool, owner_id, "FOO_BAR").await.unwrap().unwrap();
        assert_eq!(first.value, json!("foo"));

        upsert(&pool, owner_id, "FOO_BAR", &json!("bar")).await.unwrap();
        let second = get(&pool, owner_id, "FOO_BAR").await.unwrap().unwrap();
        assert_eq!(second.value, json!("bar"));
        assert_eq!(second.id, first.id);

        assert_eq!(list(&pool, owner_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_values_keep_json_types() {
        let (pool, owner_id) = setup().await;

        upsert(&pool, owner_id, "BOOL_KEY", &json!(false)).await.unwrap();
        upsert(&pool, owner_id, "LIST_KEY", &json!(["a", "b"])).await.unwrap();

        let rows = list(&pool, owner_id).await.unwrap();
        assert_eq!(rows[0].value, json!(false));
        assert_eq!(rows[1].value, json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_rows_are_owner_scoped() {
        let (pool, owner_id) = setup().await;
        let other = owners::get_or_create(&pool, "team-a").await.unwrap();

        upsert(&pool, owner_id, "FOO_BAR", &json!("foo")).await.unwrap();
        assert!(get(&pool, other.id, "FOO_BAR").await.unwrap().is_none());

        assert!(!delete(&pool, other.id, "FOO_BAR").await.unwrap());
        assert!(delete(&pool, owner_id, "FOO_BAR").await.unwrap());
        assert!(get(&pool, owner_id, "FOO_BAR").await.unwrap().is_none());
    }
}
