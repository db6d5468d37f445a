//! Migration manager for running up/down migrations

use anyhow::{Context, Result};
use log::{debug, info};
use sqlx::SqlitePool;

use super::{
    calculate_checksum, get_applied_migrations, get_current_version, get_pending_migrations,
    init_migration_table, load_migrations, validate_migrations, Direction, Migration,
};

/// Migration manager handles running migrations up and down
pub struct MigrationManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MigrationManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations
    pub async fn migrate_up(&self) -> Result<()> {
        init_migration_table(self.pool).await?;
        validate_migrations(self.pool).await?;

        let pending = get_pending_migrations(self.pool).await?;
        if pending.is_empty() {
            debug!("No pending migrations");
            return Ok(());
        }

        info!("Running {} pending migrations", pending.len());
        for migration in pending {
            self.apply_migration(&migration, Direction::Up).await?;
        }

        Ok(())
    }

    /// Roll back to a specific version (or all the way down if None)
    pub async fn migrate_down(&self, target_version: Option<i64>) -> Result<()> {
        init_migration_table(self.pool).await?;
        validate_migrations(self.pool).await?;

        let target = target_version.unwrap_or(0);
        let current = get_current_version(self.pool).await?.unwrap_or(0);
        if target >= current {
            info!("Already at or below target version {}", target);
            return Ok(());
        }

        let available = load_migrations();
        let applied = get_applied_migrations(self.pool).await?;
        for applied_migration in applied.into_iter().rev() {
            if applied_migration.version <= target {
                continue;
            }
            let migration = available.get(&applied_migration.version).with_context(|| {
                format!(
                    "Cannot roll back migration {} - migration file not found",
                    applied_migration.version
                )
            })?;
            self.apply_migration(migration, Direction::Down).await?;
        }

        info!("Rolled back to version {}", target);
        Ok(())
    }

    /// Apply a single migration in the specified direction
    async fn apply_migration(&self, migration: &Migration, direction: Direction) -> Result<()> {
        let sql = match direction {
            Direction::Up => &migration.up_sql,
            Direction::Down => &migration.down_sql,
        };

        info!(
            "{} migration {} '{}'",
            match direction {
                Direction::Up => "Applying",
                Direction::Down => "Rolling back",
            },
            migration.version,
            migration.name
        );
        debug!("Executing SQL:\n{}", sql);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start migration transaction")?;

        sqlx::raw_sql(sql).execute(&mut *tx).await.with_context(|| {
            format!(
                "Failed to execute migration {} {} SQL",
                migration.version,
                direction.as_str()
            )
        })?;

        match direction {
            Direction::Up => {
                sqlx::query(
                    "INSERT INTO schema_migrations (version, name, checksum) VALUES (?, ?, ?)",
                )
                .bind(migration.version)
                .bind(&migration.name)
                .bind(calculate_checksum(&migration.up_sql))
                .execute(&mut *tx)
                .await
                .context("Failed to record migration")?;
            }
            Direction::Down => {
                sqlx::query("DELETE FROM schema_migrations WHERE version = ?")
                    .bind(migration.version)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to remove migration record")?;
            }
        }

        tx.commit()
            .await
            .context("Failed to commit migration transaction")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db;

    #[tokio::test]
    async fn test_migrate_up_is_idempotent() {
        let pool = db::connect_memory().await.unwrap();
        let manager = MigrationManager::new(&pool);

        manager.migrate_up().await.unwrap();
        manager.migrate_up().await.unwrap();

        assert_eq!(get_current_version(&pool).await.unwrap(), Some(2));
        assert!(get_pending_migrations(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migrate_down_and_up_again() {
        let pool = db::connect_memory().await.unwrap();
        let manager = MigrationManager::new(&pool);

        manager.migrate_up().await.unwrap();
        manager.migrate_down(Some(1)).await.unwrap();
        assert_eq!(get_current_version(&pool).await.unwrap(), Some(1));

        manager.migrate_down(None).await.unwrap();
        assert_eq!(get_current_version(&pool).await.unwrap(), None);

        manager.migrate_up().await.unwrap();
        assert_eq!(get_current_version(&pool).await.unwrap(), Some(2));
    }
}
