use std::path::PathBuf;

use crate::domain::entities::dataset::{Dataset, DatasetId, RowSet};
use crate::infra::sqlite::queries::{delete_dataset, get_rows, list_metadata, put_dataset};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::store::{DatasetStore, StorageError};

pub struct SqliteStore {
    pub db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl DatasetStore for SqliteStore {
    fn init(&self) -> Result<(), StorageError> {
        init_db(&self.db_path).map_err(StorageError::from_anyhow)
    }

    fn put(&self, dataset: &Dataset, rows: &RowSet) -> Result<(), StorageError> {
        put_dataset(&self.db_path, dataset, rows).map_err(StorageError::from_anyhow)
    }

    fn list_metadata(&self) -> Result<Vec<Dataset>, StorageError> {
        list_metadata(&self.db_path).map_err(StorageError::from_anyhow)
    }

    fn get_rows(&self, id: &DatasetId) -> Result<RowSet, StorageError> {
        get_rows(&self.db_path, id).map_err(StorageError::from_anyhow)
    }

    fn delete(&self, id: &DatasetId) -> Result<(), StorageError> {
        delete_dataset(&self.db_path, id).map_err(StorageError::from_anyhow)
    }
}
