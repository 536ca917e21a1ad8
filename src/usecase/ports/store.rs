use thiserror::Error;

use crate::domain::entities::dataset::{Dataset, DatasetId, RowSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("{0}")]
    Message(String),
}

impl StorageError {
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        StorageError::Message(format!("{err:#}"))
    }
}

/// Durable mapping from dataset id to metadata plus row payload.
///
/// Metadata and payload of one id are always written and removed together.
pub trait DatasetStore: Send + Sync {
    fn init(&self) -> Result<(), StorageError>;

    /// Overwrites any existing records under `dataset.id`.
    fn put(&self, dataset: &Dataset, rows: &RowSet) -> Result<(), StorageError>;
    fn list_metadata(&self) -> Result<Vec<Dataset>, StorageError>;
    /// An unknown id yields an empty row set.
    fn get_rows(&self, id: &DatasetId) -> Result<RowSet, StorageError>;
    /// Deleting an unknown id is a no-op.
    fn delete(&self, id: &DatasetId) -> Result<(), StorageError>;
}
