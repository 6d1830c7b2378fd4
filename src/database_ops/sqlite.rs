use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::database_ops::entities::{
    Entity, GlossaryKeyRow, GlossaryTranslationRow, MerchantProfileRow, UrlRow,
};
use crate::database_ops::error::StoreError;
use crate::database_ops::repository::Repository;
use crate::database_ops::tracked::{Changed, Tracked};

/// Row mapping between an entity and its SQLite table.
pub trait SqliteEntity: Entity + Sized {
    fn select(
        conn: &Connection,
        filter: &Self::Filter,
    ) -> Result<Option<Tracked<Self>>, StoreError>;

    /// Insert and return the new row id.
    fn insert(&self, conn: &Connection, at: DateTime<Utc>) -> Result<i64, StoreError>;

    fn update(&self, conn: &Connection, id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Repository over a borrowed connection. Cheap to create; the profile, glossary
/// and URL repositories of one import usually share the same connection (and the
/// caller's transaction on it).
#[derive(Clone, Copy)]
pub struct SqliteRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl<E: SqliteEntity> Repository<E> for SqliteRepository<'_> {
    fn find_or_create(&mut self, filter: &E::Filter) -> Result<Tracked<E>, StoreError> {
        Ok(E::select(self.conn, filter)?
            .unwrap_or_else(|| Tracked::new(E::from_filter(filter))))
    }

    fn save(&mut self, row: &mut Tracked<E>) -> Result<Changed, StoreError> {
        let changed = row.pending();
        let now = Utc::now();
        let id = match changed {
            Changed::Unchanged => return Ok(changed),
            Changed::Created => row.row().insert(self.conn, now)?,
            Changed::Updated => {
                let id = row.persisted_id()?;
                row.row().update(self.conn, id, now)?;
                id
            }
        };
        row.mark_persisted(id, now);
        debug!(table = E::TABLE, id, ?changed, "row saved");
        Ok(changed)
    }
}

fn missing_row(table: &'static str, id: i64, affected: usize) -> Result<(), StoreError> {
    if affected == 0 {
        return Err(StoreError::MissingRow { table, id });
    }
    Ok(())
}

type Timestamps = (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

fn timestamps(row: &Row<'_>) -> rusqlite::Result<Timestamps> {
    Ok((row.get("created_at")?, row.get("updated_at")?))
}

impl SqliteEntity for MerchantProfileRow {
    fn select(conn: &Connection, fk_merchant: &i64) -> Result<Option<Tracked<Self>>, StoreError> {
        let found = conn
            .query_row(
                "SELECT id_merchant_profile, fk_merchant, attributes, glossary_keys, created_at, updated_at
                 FROM spy_merchant_profile WHERE fk_merchant = ?1",
                params![fk_merchant],
                |r| {
                    let id: i64 = r.get("id_merchant_profile")?;
                    let fk_merchant: i64 = r.get("fk_merchant")?;
                    let attributes: String = r.get("attributes")?;
                    let glossary_keys: String = r.get("glossary_keys")?;
                    let (created_at, updated_at) = timestamps(r)?;
                    Ok((id, fk_merchant, attributes, glossary_keys, created_at, updated_at))
                },
            )
            .optional()?;

        let Some((id, fk_merchant, attributes, glossary_keys, created_at, updated_at)) = found else {
            return Ok(None);
        };
        let row = MerchantProfileRow {
            fk_merchant,
            attributes: serde_json::from_str::<BTreeMap<_, _>>(&attributes)?,
            glossary_keys: serde_json::from_str::<BTreeMap<_, _>>(&glossary_keys)?,
        };
        Ok(Some(Tracked::loaded(id, row, created_at, updated_at)))
    }

    fn insert(&self, conn: &Connection, at: DateTime<Utc>) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO spy_merchant_profile (fk_merchant, attributes, glossary_keys, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                self.fk_merchant,
                serde_json::to_string(&self.attributes)?,
                serde_json::to_string(&self.glossary_keys)?,
                at
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let affected = conn.execute(
            "UPDATE spy_merchant_profile
             SET fk_merchant = ?1, attributes = ?2, glossary_keys = ?3, updated_at = ?4
             WHERE id_merchant_profile = ?5",
            params![
                self.fk_merchant,
                serde_json::to_string(&self.attributes)?,
                serde_json::to_string(&self.glossary_keys)?,
                at,
                id
            ],
        )?;
        missing_row(Self::TABLE, id, affected)
    }
}

impl SqliteEntity for GlossaryKeyRow {
    fn select(conn: &Connection, key: &String) -> Result<Option<Tracked<Self>>, StoreError> {
        let found = conn
            .query_row(
                "SELECT id_glossary_key, key, is_active FROM spy_glossary_key WHERE key = ?1",
                params![key],
                |r| {
                    let id: i64 = r.get("id_glossary_key")?;
                    let row = GlossaryKeyRow {
                        key: r.get("key")?,
                        is_active: r.get("is_active")?,
                    };
                    Ok(Tracked::loaded(id, row, None, None))
                },
            )
            .optional()?;
        Ok(found)
    }

    fn insert(&self, conn: &Connection, _at: DateTime<Utc>) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO spy_glossary_key (key, is_active) VALUES (?1, ?2)",
            params![self.key, self.is_active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64, _at: DateTime<Utc>) -> Result<(), StoreError> {
        let affected = conn.execute(
            "UPDATE spy_glossary_key SET key = ?1, is_active = ?2 WHERE id_glossary_key = ?3",
            params![self.key, self.is_active, id],
        )?;
        missing_row(Self::TABLE, id, affected)
    }
}

impl SqliteEntity for GlossaryTranslationRow {
    fn select(
        conn: &Connection,
        &(fk_glossary_key, fk_locale): &(i64, i64),
    ) -> Result<Option<Tracked<Self>>, StoreError> {
        let found = conn
            .query_row(
                "SELECT id_glossary_translation, fk_glossary_key, fk_locale, value, created_at, updated_at
                 FROM spy_glossary_translation WHERE fk_glossary_key = ?1 AND fk_locale = ?2",
                params![fk_glossary_key, fk_locale],
                |r| {
                    let id: i64 = r.get("id_glossary_translation")?;
                    let row = GlossaryTranslationRow {
                        fk_glossary_key: r.get("fk_glossary_key")?,
                        fk_locale: r.get("fk_locale")?,
                        value: r.get("value")?,
                    };
                    let (created_at, updated_at) = timestamps(r)?;
                    Ok(Tracked::loaded(id, row, created_at, updated_at))
                },
            )
            .optional()?;
        Ok(found)
    }

    fn insert(&self, conn: &Connection, at: DateTime<Utc>) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO spy_glossary_translation (fk_glossary_key, fk_locale, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![self.fk_glossary_key, self.fk_locale, self.value, at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let affected = conn.execute(
            "UPDATE spy_glossary_translation
             SET fk_glossary_key = ?1, fk_locale = ?2, value = ?3, updated_at = ?4
             WHERE id_glossary_translation = ?5",
            params![self.fk_glossary_key, self.fk_locale, self.value, at, id],
        )?;
        missing_row(Self::TABLE, id, affected)
    }
}

impl SqliteEntity for UrlRow {
    fn select(
        conn: &Connection,
        &(fk_resource_merchant_profile, fk_locale): &(i64, i64),
    ) -> Result<Option<Tracked<Self>>, StoreError> {
        let found = conn
            .query_row(
                "SELECT id_url, fk_resource_merchant_profile, fk_locale, url
                 FROM spy_url WHERE fk_resource_merchant_profile = ?1 AND fk_locale = ?2",
                params![fk_resource_merchant_profile, fk_locale],
                |r| {
                    let id: i64 = r.get("id_url")?;
                    let row = UrlRow {
                        fk_resource_merchant_profile: r.get("fk_resource_merchant_profile")?,
                        fk_locale: r.get("fk_locale")?,
                        url: r.get("url")?,
                    };
                    Ok(Tracked::loaded(id, row, None, None))
                },
            )
            .optional()?;
        Ok(found)
    }

    fn insert(&self, conn: &Connection, _at: DateTime<Utc>) -> Result<i64, StoreError> {
        conn.execute(
            "INSERT INTO spy_url (fk_resource_merchant_profile, fk_locale, url) VALUES (?1, ?2, ?3)",
            params![self.fk_resource_merchant_profile, self.fk_locale, self.url],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, conn: &Connection, id: i64, _at: DateTime<Utc>) -> Result<(), StoreError> {
        let affected = conn.execute(
            "UPDATE spy_url SET fk_resource_merchant_profile = ?1, fk_locale = ?2, url = ?3 WHERE id_url = ?4",
            params![self.fk_resource_merchant_profile, self.fk_locale, self.url, id],
        )?;
        missing_row(Self::TABLE, id, affected)
    }
}
