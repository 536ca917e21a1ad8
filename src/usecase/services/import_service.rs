use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::entities::dataset::{Dataset, DatasetId, RowSet};
use crate::infra::import::csv::{dataset_name_from_file, is_csv_file_name, parse_csv, read_csv_text};
use crate::platform::blocking::run_blocking;
use crate::usecase::errors::EngineError;
use crate::usecase::ports::store::DatasetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Idle,
    Preparing,
    Reading,
    Parsing,
    Saving,
    Done,
}

impl ImportStage {
    pub fn label(self) -> &'static str {
        match self {
            ImportStage::Idle => "",
            ImportStage::Preparing => "Preparing…",
            ImportStage::Reading => "Reading file…",
            ImportStage::Parsing => "Parsing CSV…",
            ImportStage::Saving => "Saving to local storage…",
            ImportStage::Done => "Done!",
        }
    }
}

/// Import status for display only; percentages only ever grow during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProgress {
    pub stage: ImportStage,
    pub percent: u8,
}

impl ImportProgress {
    pub const IDLE: ImportProgress = ImportProgress {
        stage: ImportStage::Idle,
        percent: 0,
    };
}

/// Publishes progress and applies the optional pause between stages.
pub struct ProgressReporter<'a> {
    sender: &'a watch::Sender<ImportProgress>,
    stage_delay: Duration,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sender: &'a watch::Sender<ImportProgress>, stage_delay: Duration) -> Self {
        Self {
            sender,
            stage_delay,
        }
    }

    pub fn report(&self, stage: ImportStage, percent: u8) {
        debug!(stage = ?stage, percent, "import progress");
        self.sender.send_replace(ImportProgress { stage, percent });
    }

    pub async fn pause(&self) {
        if !self.stage_delay.is_zero() {
            tokio::time::sleep(self.stage_delay).await;
        }
    }

    pub fn reset(&self) {
        self.sender.send_replace(ImportProgress::IDLE);
    }
}

pub fn new_dataset_id(created_at: i64) -> DatasetId {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    DatasetId(format!("csv_{created_at}_{}", &suffix[..8]))
}

/// Reads, parses and persists one CSV file. Nothing is written when the
/// file yields no header row.
pub async fn import_csv(
    store: Arc<dyn DatasetStore>,
    path: &Path,
    reporter: &ProgressReporter<'_>,
) -> Result<(Dataset, RowSet), EngineError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    if !is_csv_file_name(&file_name) {
        return Err(EngineError::UnsupportedFile(file_name));
    }

    reporter.report(ImportStage::Preparing, 5);
    reporter.pause().await;

    reporter.report(ImportStage::Reading, 15);
    let text = read_csv_text(path)
        .await
        .map_err(|err| EngineError::Read(format!("{err:#}")))?;
    reporter.report(ImportStage::Reading, 30);
    reporter.pause().await;

    reporter.report(ImportStage::Parsing, 40);
    reporter.pause().await;
    let parsed = tokio::task::spawn_blocking(move || parse_csv(&text))
        .await
        .map_err(|err| EngineError::Read(format!("csv parse task failed: {err}")))?;
    reporter.report(ImportStage::Parsing, 60);
    reporter.pause().await;

    if parsed.headers.is_empty() {
        return Err(EngineError::ParseEmpty);
    }

    reporter.report(ImportStage::Saving, 70);
    reporter.pause().await;
    let created_at = Utc::now().timestamp_millis();
    let dataset = Dataset {
        id: new_dataset_id(created_at),
        name: dataset_name_from_file(&file_name),
        created_at,
        row_count: parsed.rows.len(),
        columns: parsed.headers,
    };
    let rows = parsed.rows;

    reporter.report(ImportStage::Saving, 80);
    let (dataset, rows) = run_blocking(move || {
        store.put(&dataset, &rows)?;
        Ok((dataset, rows))
    })
    .await?;
    reporter.report(ImportStage::Saving, 90);
    reporter.pause().await;
    reporter.report(ImportStage::Saving, 95);
    reporter.pause().await;

    info!(
        dataset_id = %dataset.id,
        rows = dataset.row_count,
        columns = dataset.columns.len(),
        "imported csv"
    );
    Ok((dataset, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_ids_are_prefixed_and_unique() {
        let first = new_dataset_id(1_700_000_000_000);
        let second = new_dataset_id(1_700_000_000_000);

        assert!(first.as_str().starts_with("csv_1700000000000_"));
        assert_eq!(first.as_str().len(), "csv_1700000000000_".len() + 8);
        assert_ne!(first, second);
    }

    #[test]
    fn stage_labels_match_progress_text() {
        assert_eq!(ImportStage::Idle.label(), "");
        assert_eq!(ImportStage::Preparing.label(), "Preparing…");
        assert_eq!(ImportStage::Reading.label(), "Reading file…");
        assert_eq!(ImportStage::Parsing.label(), "Parsing CSV…");
        assert_eq!(ImportStage::Saving.label(), "Saving to local storage…");
        assert_eq!(ImportStage::Done.label(), "Done!");
    }

    #[test]
    fn reporter_publishes_latest_progress() {
        let (sender, receiver) = watch::channel(ImportProgress::IDLE);
        let reporter = ProgressReporter::new(&sender, Duration::ZERO);

        reporter.report(ImportStage::Parsing, 40);
        assert_eq!(
            *receiver.borrow(),
            ImportProgress {
                stage: ImportStage::Parsing,
                percent: 40
            }
        );

        reporter.reset();
        assert_eq!(*receiver.borrow(), ImportProgress::IDLE);
    }
}
