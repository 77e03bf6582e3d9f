use std::{borrow::Cow, collections::HashSet, future::Future, pin::Pin};

use anyhow::{bail, Context};
use sqlx::{
    error::BoxDynError,
    migrate::{MigrationSource, MigrationType, Migrator},
};

use crate::DbPool;

/// Migration definition contributed by a module.
///
/// `version` must be unique across every module; it is the key sqlx records
/// in `_sqlx_migrations` together with a checksum of `up`.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub id: &'static str,
    pub up: &'static str,
}

/// Module migrations handed to the sqlx migrator, ordered by version.
#[derive(Debug)]
struct ModuleMigrations(Vec<sqlx::migrate::Migration>);

impl<'s> MigrationSource<'s> for ModuleMigrations {
    fn resolve(
        self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<sqlx::migrate::Migration>, BoxDynError>> + Send + 's>>
    {
        Box::pin(async move { Ok(self.0) })
    }
}

fn to_sqlx(migrations: &[(String, Migration)]) -> anyhow::Result<ModuleMigrations> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(migrations.len());

    for (module, migration) in migrations {
        if !seen.insert(migration.version) {
            bail!(
                "migration version {} ({}/{}) is used more than once",
                migration.version,
                module,
                migration.id
            );
        }
        resolved.push(sqlx::migrate::Migration::new(
            migration.version,
            Cow::Owned(format!("{} {}", module, migration.id)),
            MigrationType::Simple,
            Cow::Borrowed(migration.up),
            false,
        ));
    }

    resolved.sort_by_key(|m| m.version);
    Ok(ModuleMigrations(resolved))
}

async fn applied_versions(pool: &DbPool) -> anyhow::Result<HashSet<i64>> {
    let ledger: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if ledger == 0 {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
    Ok(versions.into_iter().collect())
}

/// Apply every `(module, migration)` pair that has not been recorded yet.
///
/// Each migration runs in its own transaction. A migration whose `up` changed
/// after it was applied fails the checksum check instead of being skipped.
/// Returns the number of migrations applied by this call.
pub async fn migrate(pool: &DbPool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    let source = to_sqlx(migrations)?;
    let before = applied_versions(pool)
        .await
        .context("failed to read migration ledger")?;
    let pending = source
        .0
        .iter()
        .filter(|m| !before.contains(&m.version))
        .count();

    let migrator = Migrator::new(source)
        .await
        .context("failed to resolve module migrations")?;
    migrator
        .run(pool)
        .await
        .context("failed to apply module migrations")?;

    for (module, migration) in migrations {
        if !before.contains(&migration.version) {
            tracing::info!(target: "folio-db", module = %module, id = migration.id, version = migration.version, "migration applied");
        }
    }

    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets(up: &'static str) -> Vec<(String, Migration)> {
        vec![(
            "widgets".to_string(),
            Migration {
                version: 1,
                id: "001_init",
                up,
            },
        )]
    }

    const WIDGETS: &str =
        "CREATE TABLE widgets (name TEXT PRIMARY KEY); CREATE INDEX widgets_name ON widgets (name);";

    async fn ledger_rows(pool: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn applies_each_migration_once() {
        let pool = crate::connect("sqlite::memory:", 1).await.unwrap();

        assert_eq!(migrate(&pool, &widgets(WIDGETS)).await.unwrap(), 1);
        assert_eq!(migrate(&pool, &widgets(WIDGETS)).await.unwrap(), 0);
        assert_eq!(ledger_rows(&pool).await, 1);
    }

    #[tokio::test]
    async fn edited_migration_fails_checksum() {
        let pool = crate::connect("sqlite::memory:", 1).await.unwrap();
        migrate(&pool, &widgets(WIDGETS)).await.unwrap();

        let edited = widgets("CREATE TABLE widgets (name TEXT PRIMARY KEY, size INTEGER);");
        assert!(migrate(&pool, &edited).await.is_err());
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = crate::connect("sqlite::memory:", 1).await.unwrap();

        assert!(migrate(&pool, &widgets("CREATE TABLE oops (")).await.is_err());

        let recorded: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(recorded, 0);
    }

    #[tokio::test]
    async fn duplicate_versions_are_rejected() {
        let pool = crate::connect("sqlite::memory:", 1).await.unwrap();
        let mut clashing = widgets(WIDGETS);
        clashing.push((
            "gadgets".to_string(),
            Migration {
                version: 1,
                id: "001_init",
                up: "CREATE TABLE gadgets (name TEXT);",
            },
        ));

        assert!(migrate(&pool, &clashing).await.is_err());
    }
}
