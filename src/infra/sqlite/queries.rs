use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::domain::entities::dataset::{Dataset, DatasetId, RowSet};
use crate::infra::sqlite::schema::open_connection;

pub fn put_dataset(db_path: &Path, dataset: &Dataset, rows: &RowSet) -> Result<()> {
    let columns_json =
        serde_json::to_string(&dataset.columns).context("failed to encode dataset columns")?;
    let rows_json = serde_json::to_string(rows).context("failed to encode dataset rows")?;

    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset write transaction")?;

    tx.execute(
        "INSERT INTO dataset(id, name, created_at, row_count, columns)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             created_at = excluded.created_at,
             row_count = excluded.row_count,
             columns = excluded.columns",
        params![
            dataset.id.as_str(),
            dataset.name,
            dataset.created_at,
            dataset.row_count as i64,
            columns_json
        ],
    )
    .with_context(|| format!("failed to write metadata for dataset {}", dataset.id))?;

    tx.execute(
        "INSERT INTO dataset_payload(dataset_id, rows)
         VALUES (?1, ?2)
         ON CONFLICT(dataset_id) DO UPDATE SET rows = excluded.rows",
        params![dataset.id.as_str(), rows_json],
    )
    .with_context(|| format!("failed to write rows for dataset {}", dataset.id))?;

    tx.commit()
        .context("failed to commit dataset write transaction")?;
    Ok(())
}

pub fn list_metadata(db_path: &Path) -> Result<Vec<Dataset>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, created_at, row_count, columns
             FROM dataset
             ORDER BY created_at ASC, id ASC",
        )
        .context("failed to prepare datasets query")?;

    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect datasets")?;

    raw.into_iter()
        .map(|(id, name, created_at, row_count, columns_json)| {
            let columns: Vec<String> = serde_json::from_str(&columns_json)
                .with_context(|| format!("failed to decode columns of dataset {id}"))?;
            Ok(Dataset {
                id: DatasetId(id),
                name,
                created_at,
                row_count: row_count.max(0) as usize,
                columns,
            })
        })
        .collect()
}

pub fn get_rows(db_path: &Path, dataset_id: &DatasetId) -> Result<RowSet> {
    let conn = open_connection(db_path)?;
    let rows_json: Option<String> = conn
        .query_row(
            "SELECT rows FROM dataset_payload WHERE dataset_id = ?1",
            params![dataset_id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to query rows for dataset {dataset_id}"))?;

    match rows_json {
        Some(json) => serde_json::from_str(&json)
            .with_context(|| format!("failed to decode rows of dataset {dataset_id}")),
        None => Ok(RowSet::new()),
    }
}

pub fn delete_dataset(db_path: &Path, dataset_id: &DatasetId) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start delete transaction")?;
    tx.execute(
        "DELETE FROM dataset_payload WHERE dataset_id = ?1",
        params![dataset_id.as_str()],
    )
    .with_context(|| format!("failed to delete rows for dataset {dataset_id}"))?;
    tx.execute(
        "DELETE FROM dataset WHERE id = ?1",
        params![dataset_id.as_str()],
    )
    .with_context(|| format!("failed to delete dataset {dataset_id}"))?;
    tx.commit().context("failed to commit delete transaction")?;
    Ok(())
}
