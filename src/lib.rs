//! Local CSV workbench: parse CSV files, keep them in a SQLite store, and
//! query them through a filter / sort / paginate engine with numeric
//! statistics, chart sampling and CSV export.

pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod platform;
pub mod ui;
pub mod usecase;

pub use domain::entities::dataset::{
    Dataset, DatasetId, FilterState, Pagination, Row, RowSet, SortDirection, SortSpec,
};
pub use infra::export::csv::encode_csv;
pub use infra::import::csv::{parse_csv, ParsedCsv};
pub use infra::sqlite::repo::SqliteStore;
pub use ui::state::app_state::AppState;
pub use usecase::errors::EngineError;
pub use usecase::ports::store::{DatasetStore, StorageError};
pub use usecase::services::engine::{CsvEngine, EngineConfig};
