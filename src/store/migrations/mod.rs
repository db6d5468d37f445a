//! Embedded, checksummed schema migrations for the config database

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

pub mod manager;

pub use manager::MigrationManager;

/// A single migration with up and down SQL
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub up_sql: String,
    pub down_sql: String,
}

/// Migration status in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub checksum: String,
}

/// Direction for migration operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Load all available migrations from the embedded files
pub fn load_migrations() -> BTreeMap<i64, Migration> {
    let mut migrations = BTreeMap::new();

    migrations.insert(1, Migration {
        version: 1,
        name: "initial".to_string(),
        up_sql: include_str!("files/001_initial/up.sql").to_string(),
        down_sql: include_str!("files/001_initial/down.sql").to_string(),
    });

    migrations.insert(2, Migration {
        version: 2,
        name: "indexes".to_string(),
        up_sql: include_str!("files/002_indexes/up.sql").to_string(),
        down_sql: include_str!("files/002_indexes/down.sql").to_string(),
    });

    migrations
}

/// Initialize the migration tracking table
pub async fn init_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            checksum TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

/// Get list of applied migrations
pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<AppliedMigration>> {
    let migrations = sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .context("Failed to get applied migrations")?;

    Ok(migrations)
}

/// Checksum of a migration's SQL, used to detect edits after it was applied
pub fn calculate_checksum(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Validate that applied migrations match available ones
pub async fn validate_migrations(pool: &SqlitePool) -> Result<()> {
    let available = load_migrations();
    let applied = get_applied_migrations(pool).await?;

    for applied_migration in applied {
        let Some(available_migration) = available.get(&applied_migration.version) else {
            anyhow::bail!(
                "Applied migration {} '{}' not found in available migrations",
                applied_migration.version,
                applied_migration.name
            );
        };

        let expected_checksum = calculate_checksum(&available_migration.up_sql);
        if applied_migration.checksum != expected_checksum {
            anyhow::bail!(
                "Migration {} checksum mismatch! Applied: {}, Expected: {}",
                applied_migration.version,
                applied_migration.checksum,
                expected_checksum
            );
        }
    }

    Ok(())
}

/// Get pending migrations (available but not applied), in version order
pub async fn get_pending_migrations(pool: &SqlitePool) -> Result<Vec<Migration>> {
    let applied = get_applied_migrations(pool).await?;
    let applied_versions: std::collections::HashSet<i64> =
        applied.into_iter().map(|m| m.version).collect();

    Ok(load_migrations()
        .into_values()
        .filter(|migration| !applied_versions.contains(&migration.version))
        .collect())
}

/// Get the current schema version (highest applied migration)
pub async fn get_current_version(pool: &SqlitePool) -> Result<Option<i64>> {
    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await
        .context("Failed to get current schema version")?;

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_migrations() {
        let migrations = load_migrations();
        assert!(migrations.contains_key(&1));
        assert!(migrations.contains_key(&2));
        assert!(migrations[&1].up_sql.contains("config_options"));
    }

    #[test]
    fn test_calculate_checksum() {
        let sql = "CREATE TABLE test (id INTEGER);";
        assert_eq!(calculate_checksum(sql), calculate_checksum(sql));
        assert_ne!(
            calculate_checksum(sql),
            calculate_checksum("CREATE TABLE test2 (id INTEGER);")
        );
    }
}
