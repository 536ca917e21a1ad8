use crate::domain::entities::dataset::{
    Dataset, DatasetId, FilterState, Pagination, Row, RowSet, SortSpec,
};
use crate::usecase::errors::EngineError;
use crate::usecase::services::query_service::{filtered_rows, paginate};

/// Everything the presentation layer reads: the known datasets, the active
/// one with its rows, and the view settings applied to it.
///
/// Views (`filtered_rows`, `paginated_rows`, ...) are recomputed from the raw
/// fields on every call.
#[derive(Debug, Clone)]
pub struct AppState {
    pub datasets: Vec<Dataset>,
    pub active_dataset_id: Option<DatasetId>,
    pub columns: Vec<String>,
    pub all_rows: RowSet,
    pub pagination: Pagination,
    pub filters: FilterState,
    pub sort: Option<SortSpec>,
    pub is_loading: bool,
    pub error: Option<EngineError>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            datasets: Vec::new(),
            active_dataset_id: None,
            columns: Vec::new(),
            all_rows: RowSet::new(),
            pagination: Pagination::with_page_size(page_size),
            filters: FilterState::default(),
            sort: None,
            is_loading: false,
            error: None,
        }
    }

    /// Back to page 1 with no search, column filters or sort. Page size is kept.
    pub fn reset_view(&mut self) {
        self.pagination.page = 1;
        self.filters = FilterState::default();
        self.sort = None;
    }

    pub fn activate(&mut self, dataset: &Dataset, rows: RowSet) {
        self.active_dataset_id = Some(dataset.id.clone());
        self.columns = dataset.columns.clone();
        self.all_rows = rows;
        self.reset_view();
    }

    pub fn clear_active(&mut self) {
        self.active_dataset_id = None;
        self.columns.clear();
        self.all_rows.clear();
        self.reset_view();
    }

    pub fn active_dataset(&self) -> Option<&Dataset> {
        let id = self.active_dataset_id.as_ref()?;
        self.datasets.iter().find(|dataset| &dataset.id == id)
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        filtered_rows(&self.all_rows, &self.filters, self.sort.as_ref())
    }

    pub fn paginated_rows(&self) -> Vec<&Row> {
        paginate(&self.filtered_rows(), self.pagination)
    }

    pub fn total_filtered_rows(&self) -> usize {
        self.filtered_rows().len()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.total_filtered_rows())
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.is_active()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::domain::entities::dataset::DEFAULT_PAGE_SIZE)
    }
}
