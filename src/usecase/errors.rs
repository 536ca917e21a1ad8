use thiserror::Error;

use crate::domain::entities::dataset::DatasetId;
use crate::usecase::ports::store::StorageError;

/// Failure of an engine action, kept in the state's error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the CSV file is empty or has no header row")]
    ParseEmpty,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("dataset not found: {0}")]
    NotFound(DatasetId),

    #[error("please choose a .csv file (got '{0}')")]
    UnsupportedFile(String),

    #[error("failed to read file: {0}")]
    Read(String),

    #[error("failed to export: {0}")]
    Export(String),
}
