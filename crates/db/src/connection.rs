use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

/// Whether a missing database file may be created on connect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
    #[default]
    Existing,
    CreateIfMissing,
}

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 30, OpenMode::Existing).await
}

/// Opens a single-connection pool holding an exclusive lock on the store, so
/// a run never observes another writer's half-built stage tables.
pub async fn connect_with_settings(
    database_url: &str,
    timeout_secs: u64,
    mode: OpenMode,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(mode == OpenMode::CreateIfMissing);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA locking_mode = EXCLUSIVE").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect_with(options)
        .await
}

/// Copies the input store file to `transformed_url` and opens the copy, so
/// stage tables never land in the loader's database. An in-memory input has
/// nothing to copy and gets an empty transformed store.
pub async fn fork_store(
    source_url: &str,
    transformed_url: &str,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    if let Some(target) = sqlite_file_path(transformed_url) {
        if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        if let Some(source) = sqlite_file_path(source_url) {
            if source == target {
                return Err(sqlx::Error::Configuration(
                    "transformed store must differ from the input store".into(),
                ));
            }
            remove_sidecars(&target).await?;
            tokio::fs::copy(&source, &target).await?;
        }
    }

    connect_with_settings(transformed_url, timeout_secs, OpenMode::CreateIfMissing).await
}

/// A leftover journal from an earlier run would be replayed into the fresh copy.
async fn remove_sidecars(target: &Path) -> Result<(), io::Error> {
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut sidecar = target.as_os_str().to_owned();
        sidecar.push(suffix);
        match tokio::fs::remove_file(&sidecar).await {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error),
        }
    }
    Ok(())
}

/// File behind a `sqlite://` URL, or `None` for in-memory databases.
pub fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::{connect, connect_with_settings, fork_store, sqlite_file_path, OpenMode};

    #[tokio::test]
    async fn in_memory_pool_keeps_its_only_connection() {
        let pool = connect("sqlite::memory:").await.expect("connect");

        sqlx::query("CREATE TABLE probe (n INTEGER)").execute(&pool).await.expect("create");
        sqlx::query("INSERT INTO probe VALUES (1)").execute(&pool).await.expect("insert");
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM probe").fetch_one(&pool).await.expect("count");

        assert_eq!(count, 1);
        assert_eq!(pool.options().get_max_connections(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error_unless_creation_is_allowed() {
        let dir = TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("absent.db").display());

        assert!(connect_with_settings(&url, 1, OpenMode::Existing).await.is_err());
        let pool = connect_with_settings(&url, 1, OpenMode::CreateIfMissing)
            .await
            .expect("create database");
        pool.close().await;
        assert!(dir.path().join("absent.db").exists());
    }

    #[tokio::test]
    async fn forked_store_leaves_the_input_untouched() {
        let dir = TempDir::new().expect("temp dir");
        let source_url = format!("sqlite://{}", dir.path().join("input.db").display());
        let target_path = dir.path().join("out").join("transformed.db");
        let target_url = format!("sqlite://{}", target_path.display());

        let source = connect_with_settings(&source_url, 1, OpenMode::CreateIfMissing)
            .await
            .expect("create input");
        sqlx::query("CREATE TABLE orders (order_id INTEGER)").execute(&source).await.expect("create");
        sqlx::query("INSERT INTO orders VALUES (7)").execute(&source).await.expect("insert");

        let forked = fork_store(&source_url, &target_url, 1).await.expect("fork");
        sqlx::query("CREATE TABLE fe_features (n INTEGER)").execute(&forked).await.expect("stage");
        let copied: i64 = sqlx::query_scalar("SELECT order_id FROM orders")
            .fetch_one(&forked)
            .await
            .expect("input rows are copied");
        forked.close().await;

        let input_tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND substr(name, 1, 3) = 'fe_'",
        )
        .fetch_one(&source)
        .await
        .expect("inspect input");
        source.close().await;

        assert_eq!(copied, 7);
        assert_eq!(input_tables, 0);
        assert!(target_path.exists());
    }

    #[tokio::test]
    async fn forking_onto_the_input_file_is_refused() {
        let dir = TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("input.db").display());

        let error = fork_store(&url, &url, 1).await.expect_err("same file");

        assert!(error.to_string().contains("transformed store"));
    }

    #[test]
    fn file_urls_resolve_to_paths() {
        assert_eq!(
            sqlite_file_path("sqlite://data/interim/instacart_2017_05_01.db"),
            Some(PathBuf::from("data/interim/instacart_2017_05_01.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/orders.db?mode=rwc"),
            Some(PathBuf::from("/tmp/orders.db"))
        );
    }

    #[test]
    fn memory_urls_have_no_file() {
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path(":memory:"), None);
    }
}
