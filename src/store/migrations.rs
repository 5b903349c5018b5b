//! Schema migrations for the settings database.
//!
//! The applied version lives in SQLite's `user_version` pragma. Each entry
//! of `MIGRATIONS` is applied once, in order, and bumps the version by one.

use libsql::Connection;
use tracing::{debug, info};

use crate::error::DatabaseError;

/// (name, SQL) per schema version, starting at version 1. Append only.
const MIGRATIONS: &[(&str, &str)] = &[(
    "settings",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );",
)];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

/// Bring the database up to `latest_version()`.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let applied = schema_version(conn).await?;
    if applied > latest_version() {
        return Err(DatabaseError::Migration(format!(
            "database schema v{applied} is newer than this build (v{})",
            latest_version()
        )));
    }

    for (version, (name, sql)) in (1..).zip(MIGRATIONS).skip(applied as usize) {
        info!(version, name, "Applying migration");
        conn.execute_batch(sql)
            .await
            .map_err(|e| DatabaseError::Migration(format!("V{version} ({name}): {e}")))?;
        conn.execute_batch(&format!("PRAGMA user_version = {version}"))
            .await
            .map_err(|e| DatabaseError::Migration(format!("recording V{version}: {e}")))?;
    }

    let version = schema_version(conn).await?;
    debug!(version, "Settings schema up to date");
    Ok(())
}

/// The schema version recorded in the database, 0 for a fresh file.
pub async fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("PRAGMA user_version", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("reading user_version: {e}")))?;

    match rows.next().await {
        Ok(Some(row)) => row
            .get::<i64>(0)
            .map_err(|e| DatabaseError::Migration(format!("parsing user_version: {e}"))),
        Ok(None) => Ok(0),
        Err(e) => Err(DatabaseError::Migration(format!("reading user_version: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_conn() -> Connection {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap();
        db.connect().unwrap()
    }

    #[tokio::test]
    async fn fresh_database_reaches_latest_version() {
        let conn = memory_conn().await;
        assert_eq!(schema_version(&conn).await.unwrap(), 0);

        run_migrations(&conn).await.unwrap();
        assert_eq!(schema_version(&conn).await.unwrap(), latest_version());

        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'settings'",
                (),
            )
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn rerunning_is_a_no_op() {
        let conn = memory_conn().await;
        run_migrations(&conn).await.unwrap();
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES ('theme', '\"dark\"', 'now')",
            (),
        )
        .await
        .unwrap();

        run_migrations(&conn).await.unwrap();
        assert_eq!(schema_version(&conn).await.unwrap(), latest_version());

        let mut rows = conn.query("SELECT COUNT(*) FROM settings", ()).await.unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn runs_on_a_spawned_task() {
        let version = tokio::spawn(async {
            let conn = memory_conn().await;
            run_migrations(&conn).await?;
            schema_version(&conn).await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(version, latest_version());
    }

    #[tokio::test]
    async fn newer_schema_is_refused() {
        let conn = memory_conn().await;
        conn.execute_batch(&format!("PRAGMA user_version = {}", latest_version() + 1))
            .await
            .unwrap();
        let err = run_migrations(&conn).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Migration(_)));
    }
}
