//! In-memory repositories for tests and dry runs.
//!
//! Rows are kept as their last saved `Tracked` snapshot, so a later
//! `find_or_create` returns exactly what a database read would.
use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tracing::debug;

use crate::database_ops::entities::{Entity, GlossaryKeyRow, GlossaryTranslationRow};
use crate::database_ops::error::StoreError;
use crate::database_ops::repository::Repository;
use crate::database_ops::tracked::{Changed, Tracked};

#[derive(Debug, Clone)]
pub struct InMemoryRepository<E: Entity> {
    rows: BTreeMap<i64, Tracked<E>>,
    by_filter: HashMap<E::Filter, i64>,
    next_id: i64,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            by_filter: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Tracked<E>> {
        self.rows.get(&id)
    }

    pub fn find(&self, filter: &E::Filter) -> Option<&Tracked<E>> {
        self.by_filter.get(filter).and_then(|id| self.rows.get(id))
    }

    /// Saved rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = &Tracked<E>> {
        self.rows.values()
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn find_or_create(&mut self, filter: &E::Filter) -> Result<Tracked<E>, StoreError> {
        Ok(match self.find(filter) {
            Some(stored) => stored.clone(),
            None => Tracked::new(E::from_filter(filter)),
        })
    }

    fn save(&mut self, row: &mut Tracked<E>) -> Result<Changed, StoreError> {
        let changed = row.pending();
        let id = match changed {
            Changed::Unchanged => return Ok(changed),
            Changed::Created => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            Changed::Updated => {
                let id = row.persisted_id()?;
                let previous = self.rows.get(&id).ok_or(StoreError::MissingRow {
                    table: E::TABLE,
                    id,
                })?;
                self.by_filter.remove(&previous.row().filter());
                id
            }
        };

        row.mark_persisted(id, Utc::now());
        self.by_filter.insert(row.row().filter(), id);
        self.rows.insert(id, row.clone());
        debug!(table = E::TABLE, id, ?changed, "in-memory row saved");
        Ok(changed)
    }
}

/// Glossary keys and their translations, kept together like the glossary module
/// owns both tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGlossaryStore {
    pub keys: InMemoryRepository<GlossaryKeyRow>,
    pub translations: InMemoryRepository<GlossaryTranslationRow>,
}

impl InMemoryGlossaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translation of `key` in `fk_locale`, if both exist.
    pub fn translation(&self, key: &str, fk_locale: i64) -> Option<&str> {
        let key_id = self.keys.find(&key.to_string())?.id()?;
        self.translations
            .find(&(key_id, fk_locale))
            .map(|t| t.row().value.as_str())
    }
}

impl Repository<GlossaryKeyRow> for InMemoryGlossaryStore {
    fn find_or_create(&mut self, key: &String) -> Result<Tracked<GlossaryKeyRow>, StoreError> {
        self.keys.find_or_create(key)
    }

    fn save(&mut self, row: &mut Tracked<GlossaryKeyRow>) -> Result<Changed, StoreError> {
        self.keys.save(row)
    }
}

impl Repository<GlossaryTranslationRow> for InMemoryGlossaryStore {
    fn find_or_create(
        &mut self,
        filter: &(i64, i64),
    ) -> Result<Tracked<GlossaryTranslationRow>, StoreError> {
        self.translations.find_or_create(filter)
    }

    fn save(&mut self, row: &mut Tracked<GlossaryTranslationRow>) -> Result<Changed, StoreError> {
        self.translations.save(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::entities::UrlRow;

    #[test]
    fn find_or_create_does_not_write() {
        let mut repo = InMemoryRepository::<UrlRow>::new();
        let row = repo.find_or_create(&(1, 66)).unwrap();
        assert!(row.is_new());
        assert!(repo.is_empty());
    }

    #[test]
    fn save_reports_created_updated_unchanged() {
        let mut repo = InMemoryRepository::<UrlRow>::new();
        let mut row = repo.find_or_create(&(1, 66)).unwrap();
        row.row_mut().url = "/en/merchant/a".to_string();
        assert_eq!(repo.save(&mut row).unwrap(), Changed::Created);
        assert_eq!(row.id(), Some(1));

        let mut again = repo.find_or_create(&(1, 66)).unwrap();
        assert_eq!(again.id(), Some(1));
        again.row_mut().url = "/en/merchant/a".to_string();
        assert_eq!(repo.save(&mut again).unwrap(), Changed::Unchanged);

        again.row_mut().url = "/en/merchant/b".to_string();
        assert_eq!(repo.save(&mut again).unwrap(), Changed::Updated);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(1).unwrap().row().url, "/en/merchant/b");
    }

    #[test]
    fn ids_are_sequential_per_repository() {
        let mut repo = InMemoryRepository::<UrlRow>::new();
        for locale in [46, 66] {
            let mut row = repo.find_or_create(&(1, locale)).unwrap();
            row.row_mut().url = format!("/{locale}/m");
            repo.save(&mut row).unwrap();
        }
        let ids: Vec<_> = repo.rows().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn updating_unknown_row_is_an_error() {
        let mut repo = InMemoryRepository::<UrlRow>::new();
        let mut ghost = Tracked::loaded(
            9,
            UrlRow::from_filter(&(1, 66)),
            None,
            None,
        );
        ghost.row_mut().url = "/x".to_string();
        let err = repo.save(&mut ghost).unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { table: "spy_url", id: 9 }));
    }

    #[test]
    fn glossary_store_resolves_translations() {
        let mut store = InMemoryGlossaryStore::new();
        let mut key: Tracked<GlossaryKeyRow> =
            Repository::<GlossaryKeyRow>::find_or_create(&mut store, &"merchant.title.1".to_string())
                .unwrap();
        Repository::<GlossaryKeyRow>::save(&mut store, &mut key).unwrap();
        let key_id = key.id().unwrap();

        let mut translation: Tracked<GlossaryTranslationRow> =
            Repository::<GlossaryTranslationRow>::find_or_create(&mut store, &(key_id, 66)).unwrap();
        translation.row_mut().value = "Hello".to_string();
        Repository::<GlossaryTranslationRow>::save(&mut store, &mut translation).unwrap();

        assert_eq!(store.translation("merchant.title.1", 66), Some("Hello"));
        assert_eq!(store.translation("merchant.title.1", 46), None);
    }
}
