use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::entities::dataset::{DatasetId, Row, SortSpec, DEFAULT_PAGE_SIZE};
use crate::infra::export::csv::{encode_csv, export_file_name, write_export};
use crate::platform::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::usecase::errors::EngineError;
use crate::usecase::ports::store::DatasetStore;
use crate::usecase::services::analytics_service::{
    chart_series, column_stats, default_axes, numeric_columns, ChartAxes, ChartSeries, ColumnStats,
};
use crate::usecase::services::import_service::{
    import_csv, ImportProgress, ImportStage, ProgressReporter,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub page_size: usize,
    /// Pause between import stages. Zero disables it.
    pub stage_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            stage_delay: Duration::ZERO,
        }
    }
}

/// The query/view engine: owns the active dataset and all view state, and is
/// the only way to change either.
///
/// Actions never return errors. A failure is logged and left in
/// [`CsvEngine::error`] until the next action that clears it.
///
/// Only one import may run at a time; callers must not start a second one
/// before the first completes.
pub struct CsvEngine {
    store: Arc<dyn DatasetStore>,
    state: AppState,
    progress: watch::Sender<ImportProgress>,
    stage_delay: Duration,
}

impl CsvEngine {
    pub fn new(store: Arc<dyn DatasetStore>, config: EngineConfig) -> Self {
        let (progress, _) = watch::channel(ImportProgress::IDLE);
        Self {
            store,
            state: AppState::new(config.page_size),
            progress,
            stage_delay: config.stage_delay,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.state.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.error.as_ref().map(ToString::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn import_progress(&self) -> ImportProgress {
        *self.progress.borrow()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ImportProgress> {
        self.progress.subscribe()
    }

    fn record_error(&mut self, action: &str, err: EngineError) {
        warn!(action, error = %err, "engine action failed");
        self.state.error = Some(err);
    }

    pub async fn load_datasets(&mut self) {
        self.state.is_loading = true;
        self.state.error = None;

        let store = self.store.clone();
        match run_blocking(move || store.list_metadata()).await {
            Ok(datasets) => {
                debug!(count = datasets.len(), "loaded datasets");
                self.state.datasets = datasets;
            }
            Err(err) => self.record_error("load_datasets", err.into()),
        }

        self.state.is_loading = false;
    }

    pub async fn import_csv_file(&mut self, path: &Path) {
        self.state.is_loading = true;
        self.state.error = None;

        let reporter = ProgressReporter::new(&self.progress, self.stage_delay);
        reporter.report(ImportStage::Preparing, 0);

        match import_csv(self.store.clone(), path, &reporter).await {
            Ok((dataset, rows)) => {
                self.state.activate(&dataset, rows);
                self.state.datasets.push(dataset);
                reporter.report(ImportStage::Done, 100);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "import failed");
                self.state.error = Some(err);
            }
        }

        reporter.pause().await;
        reporter.reset();
        self.state.is_loading = false;
    }

    pub async fn select_dataset(&mut self, id: &DatasetId) {
        self.state.is_loading = true;
        self.state.error = None;

        let Some(dataset) = self
            .state
            .datasets
            .iter()
            .find(|dataset| &dataset.id == id)
            .cloned()
        else {
            self.record_error("select_dataset", EngineError::NotFound(id.clone()));
            self.state.is_loading = false;
            return;
        };

        let store = self.store.clone();
        let lookup = id.clone();
        match run_blocking(move || store.get_rows(&lookup)).await {
            Ok(rows) => {
                info!(dataset_id = %id, rows = rows.len(), "selected dataset");
                self.state.activate(&dataset, rows);
            }
            Err(err) => self.record_error("select_dataset", err.into()),
        }

        self.state.is_loading = false;
    }

    pub async fn remove_dataset(&mut self, id: &DatasetId) {
        self.state.is_loading = true;
        self.state.error = None;

        let store = self.store.clone();
        let target = id.clone();
        match run_blocking(move || store.delete(&target)).await {
            Ok(()) => {
                info!(dataset_id = %id, "removed dataset");
                self.state.datasets.retain(|dataset| &dataset.id != id);
                if self.state.active_dataset_id.as_ref() == Some(id) {
                    self.state.clear_active();
                }
            }
            Err(err) => self.record_error("remove_dataset", err.into()),
        }

        self.state.is_loading = false;
    }

    /// Page numbers are 1-indexed; 0 is treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.state.pagination.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.pagination.page_size = page_size.max(1);
        self.state.pagination.page = 1;
    }

    pub fn set_global_search(&mut self, query: &str) {
        self.state.filters.global_search = query.to_string();
        self.state.pagination.page = 1;
    }

    pub fn set_column_filter(&mut self, column: &str, value: &str) {
        self.state
            .filters
            .column_filters
            .insert(column.to_string(), value.to_string());
        self.state.pagination.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.global_search.clear();
        self.state.filters.column_filters.clear();
        self.state.sort = None;
        self.state.pagination.page = 1;
    }

    /// asc -> desc -> none for the same column; any other column starts at asc.
    pub fn set_sort(&mut self, column: &str) {
        self.state.sort = SortSpec::cycle(self.state.sort.as_ref(), column);
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.state.filtered_rows()
    }

    pub fn paginated_rows(&self) -> Vec<&Row> {
        self.state.paginated_rows()
    }

    pub fn total_pages(&self) -> usize {
        self.state.total_pages()
    }

    pub fn total_filtered_rows(&self) -> usize {
        self.state.total_filtered_rows()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        numeric_columns(&self.state.columns, &self.state.all_rows)
    }

    /// Statistics over all rows of the active dataset, ignoring filters.
    pub fn column_stats(&self) -> Vec<ColumnStats> {
        column_stats(&self.state.columns, &self.state.all_rows)
    }

    pub fn default_chart_axes(&self) -> Option<ChartAxes> {
        default_axes(&self.state.columns, &self.numeric_columns())
    }

    /// Chart points sampled from the filtered view.
    pub fn chart_series(&self, axes: &ChartAxes) -> ChartSeries {
        chart_series(&self.filtered_rows(), axes)
    }

    /// Writes the filtered view of the active dataset into `dir` as
    /// `<name>[_filtered].csv`.
    pub fn export_filtered(&mut self, dir: &Path) -> Option<PathBuf> {
        self.state.error = None;

        let rows = self.filtered_rows();
        let row_count = rows.len();
        let content = encode_csv(&self.state.columns, rows);
        let name = self.state.active_dataset().map(|dataset| dataset.name.clone());
        let file_name = export_file_name(name.as_deref(), self.state.has_active_filters());

        match write_export(dir, &file_name, &content) {
            Ok(path) => {
                info!(path = %path.display(), rows = row_count, "exported csv");
                Some(path)
            }
            Err(err) => {
                self.record_error("export_filtered", EngineError::Export(format!("{err:#}")));
                None
            }
        }
    }
}
