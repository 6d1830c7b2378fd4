use thiserror::Error;

use crate::database_ops::error::StoreError;

#[derive(Error, Debug)]
pub enum ImportError {
    /// A required data set key is absent or blank. Raised before anything is written.
    #[error("\"{key}\" is required.")]
    InvalidData { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    pub fn is_invalid_data(&self) -> bool {
        matches!(self, ImportError::InvalidData { .. })
    }
}
