use chrono::{DateTime, Utc};

use crate::database_ops::entities::Entity;
use crate::database_ops::error::StoreError;

/// What a `save` did to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Changed {
    Created,
    Updated,
    Unchanged,
}

impl Changed {
    /// True when a row was written.
    pub fn is_changed(self) -> bool {
        !matches!(self, Changed::Unchanged)
    }
}

/// A row plus the state it had when loaded, so callers can ask whether it is
/// new or modified before deciding to write it.
///
/// Timestamps are bookkeeping only and never make a row "modified".
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<E> {
    id: Option<i64>,
    loaded: Option<E>,
    current: E,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl<E: Entity> Tracked<E> {
    /// A row that does not exist in the store yet.
    pub fn new(row: E) -> Self {
        Self {
            id: None,
            loaded: None,
            current: row,
            created_at: None,
            updated_at: None,
        }
    }

    /// A row as read back from the store.
    pub fn loaded(
        id: i64,
        row: E,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            loaded: Some(row.clone()),
            current: row,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Id of a row that must already be saved (e.g. the parent of a child row).
    pub fn persisted_id(&self) -> Result<i64, StoreError> {
        self.id
            .ok_or(StoreError::NotPersisted { table: E::TABLE })
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_modified(&self) -> bool {
        match &self.loaded {
            Some(loaded) => loaded != &self.current,
            None => true,
        }
    }

    /// What a save would do right now.
    pub fn pending(&self) -> Changed {
        if self.is_new() {
            Changed::Created
        } else if self.is_modified() {
            Changed::Updated
        } else {
            Changed::Unchanged
        }
    }

    pub fn row(&self) -> &E {
        &self.current
    }

    pub fn row_mut(&mut self) -> &mut E {
        &mut self.current
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Record a successful write: the current state becomes the loaded state.
    pub fn mark_persisted(&mut self, id: i64, at: DateTime<Utc>) {
        self.id = Some(id);
        self.loaded = Some(self.current.clone());
        self.created_at.get_or_insert(at);
        self.updated_at = Some(at);
    }
}
