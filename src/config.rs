use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::domain::entities::dataset::DEFAULT_PAGE_SIZE;
use crate::usecase::services::engine::EngineConfig;

pub const DB_FILE_NAME: &str = "visual-csv-db.sqlite";
pub const DB_PATH_ENV: &str = "VISUAL_CSV_DB";
pub const STAGE_DELAY_ENV: &str = "VISUAL_CSV_STAGE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub page_size: usize,
    pub stage_delay: Duration,
}

impl AppConfig {
    /// An explicit database path wins over the per-user data directory.
    pub fn resolve(db_path: Option<PathBuf>, stage_delay_ms: u64) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            page_size: DEFAULT_PAGE_SIZE,
            stage_delay: Duration::from_millis(stage_delay_ms),
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            page_size: self.page_size,
            stage_delay: self.stage_delay,
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "visualcsv", "visual-csv")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_db_path_is_used_verbatim() {
        let config = AppConfig::resolve(Some(PathBuf::from("/tmp/custom.sqlite")), 250)
            .expect("config should resolve");

        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.sqlite"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.stage_delay, Duration::from_millis(250));
    }

    #[test]
    fn engine_config_carries_page_size_and_delay() {
        let config = AppConfig::resolve(Some(PathBuf::from("db.sqlite")), 0)
            .expect("config should resolve")
            .with_page_size(0);

        let engine = config.engine_config();
        assert_eq!(engine.page_size, 1);
        assert!(engine.stage_delay.is_zero());
    }
}
