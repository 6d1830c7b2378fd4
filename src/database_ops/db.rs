use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::database_ops::sqlite::SqliteRepository;

/// Versioned schema steps, applied in order and recorded in `_migrations`.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "create_spy_merchant_profile",
        "CREATE TABLE spy_merchant_profile (
            id_merchant_profile INTEGER PRIMARY KEY AUTOINCREMENT,
            fk_merchant INTEGER NOT NULL,
            attributes TEXT NOT NULL DEFAULT '{}',
            glossary_keys TEXT NOT NULL DEFAULT '{}',
            created_at TEXT,
            updated_at TEXT
        );
        CREATE UNIQUE INDEX spy_merchant_profile_unique_fk_merchant
            ON spy_merchant_profile (fk_merchant);",
    ),
    (
        2,
        "create_spy_glossary",
        "CREATE TABLE spy_glossary_key (
            id_glossary_key INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );
        CREATE UNIQUE INDEX spy_glossary_key_unique_key ON spy_glossary_key (key);
        CREATE TABLE spy_glossary_translation (
            id_glossary_translation INTEGER PRIMARY KEY AUTOINCREMENT,
            fk_glossary_key INTEGER NOT NULL REFERENCES spy_glossary_key (id_glossary_key),
            fk_locale INTEGER NOT NULL,
            value TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE UNIQUE INDEX spy_glossary_translation_unique_key_locale
            ON spy_glossary_translation (fk_glossary_key, fk_locale);",
    ),
    (
        3,
        "create_spy_url",
        "CREATE TABLE spy_url (
            id_url INTEGER PRIMARY KEY AUTOINCREMENT,
            fk_resource_merchant_profile INTEGER REFERENCES spy_merchant_profile (id_merchant_profile),
            fk_locale INTEGER NOT NULL,
            url TEXT NOT NULL
        );
        CREATE UNIQUE INDEX spy_url_unique_url ON spy_url (url);
        CREATE UNIQUE INDEX spy_url_unique_merchant_profile_locale
            ON spy_url (fk_resource_merchant_profile, fk_locale);",
    ),
];

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Open (or create) the database file and bring the schema up to date.
    #[instrument(skip(path), fields(db_path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open {}", path.as_ref().display()))?;
        Self::with_connection(conn)
    }

    /// Fresh in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::run_migrations(&conn)?;
        info!("sqlite store ready");
        Ok(Self { conn })
    }

    /// Repository bound to this connection; every entity table goes through it.
    pub fn repository(&self) -> SqliteRepository<'_> {
        SqliteRepository::new(&self.conn)
    }

    /// Number of migrations recorded as applied.
    pub fn schema_version(&self) -> Result<i64> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |r| r.get(0),
        )?;
        Ok(version)
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                installed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
             )",
        )?;
        let applied: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |r| r.get(0),
        )?;

        for (version, description, sql) in MIGRATIONS {
            if *version <= applied {
                continue;
            }
            // Each step and its bookkeeping row land together or not at all.
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)
                .with_context(|| format!("migration {version}_{description} failed"))?;
            tx.execute(
                "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
                rusqlite::params![version, description],
            )?;
            tx.commit()?;
            info!(version, description, "applied migration");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Db) -> Vec<String> {
        let mut stmt = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'spy_%' ORDER BY name")
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn in_memory_db_has_full_schema() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(
            table_names(&db),
            vec![
                "spy_glossary_key",
                "spy_glossary_translation",
                "spy_merchant_profile",
                "spy_url"
            ]
        );
        assert_eq!(db.schema_version().unwrap(), MIGRATIONS.len() as i64);
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = Db::open_in_memory().unwrap();
        Db::run_migrations(&db.conn).unwrap();
        let recorded: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(recorded, MIGRATIONS.len() as i64);
    }
}
