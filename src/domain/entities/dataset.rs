use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DatasetId {
    fn from(value: String) -> Self {
        DatasetId(value)
    }
}

impl From<&str> for DatasetId {
    fn from(value: &str) -> Self {
        DatasetId(value.to_string())
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata of one imported CSV file. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// One record of a dataset: column name to raw string value.
///
/// Missing keys read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &str {
        self.0.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect())
    }
}

pub type RowSet = Vec<Row>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Next state of the asc -> desc -> none cycle when `column` is clicked.
    pub fn cycle(current: Option<&SortSpec>, column: &str) -> Option<SortSpec> {
        let direction = match current {
            Some(sort) if sort.column == column => match sort.direction {
                SortDirection::Asc => Some(SortDirection::Desc),
                SortDirection::Desc => None,
            },
            _ => Some(SortDirection::Asc),
        };

        direction.map(|direction| SortSpec {
            column: column.to_string(),
            direction,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub global_search: String,
    pub column_filters: BTreeMap<String, String>,
}

impl FilterState {
    /// A blank query (empty or whitespace only) is no constraint.
    pub fn is_active(&self) -> bool {
        !self.global_search.trim().is_empty()
            || self
                .column_filters
                .values()
                .any(|value| !value.trim().is_empty())
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn total_pages(&self, filtered_count: usize) -> usize {
        filtered_count.div_ceil(self.page_size.max(1)).max(1)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}
