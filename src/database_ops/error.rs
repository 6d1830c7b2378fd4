use thiserror::Error;

/// Failures raised by repository backends. The writer step never handles these
/// itself; they travel up to whoever drives the import.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored attributes are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{table} row {id} does not exist")]
    MissingRow { table: &'static str, id: i64 },

    #[error("{table} row has not been saved yet")]
    NotPersisted { table: &'static str },
}
