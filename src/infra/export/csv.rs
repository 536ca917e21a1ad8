use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::entities::dataset::Row;

const UTF8_BOM: &str = "\u{feff}";

/// Quotes a field only when it holds a comma, a double quote or a newline.
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Encodes rows as comma separated text, one `\n` separated line per record.
pub fn encode_csv<'a>(columns: &[String], rows: impl IntoIterator<Item = &'a Row>) -> String {
    let mut lines = Vec::new();
    lines.push(
        columns
            .iter()
            .map(|column| escape_field(column))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|column| escape_field(row.get(column)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

pub fn export_file_name(dataset_name: Option<&str>, filtered: bool) -> String {
    let base = dataset_name.unwrap_or("export");
    let suffix = if filtered { "_filtered" } else { "" };
    format!("{base}{suffix}.csv")
}

/// Writes the encoded CSV, prefixed with a UTF-8 byte-order mark.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, format!("{UTF8_BOM}{content}"))
        .with_context(|| format!("failed to write export: {}", path.display()))?;
    Ok(path)
}
