//! CSV text parsing.
//!
//! The delimiter is picked once from the first line; the tokenizer is a
//! single pass over the characters with a quoted and an unquoted state.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::dataset::{Row, RowSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: RowSet,
}

pub fn parse_csv(raw: &str) -> ParsedCsv {
    let delimiter = detect_delimiter(raw);
    let mut lines = tokenize(raw, delimiter).into_iter();

    let Some(header_line) = lines.next() else {
        return ParsedCsv::default();
    };
    let headers: Vec<String> = header_line
        .iter()
        .map(|field| field.trim().to_string())
        .collect();

    let rows = lines
        .filter(|line| !(line.len() == 1 && line[0].is_empty()))
        .map(|line| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = line.get(idx).map(|field| field.trim()).unwrap_or("");
                    (header.clone(), value.to_string())
                })
                .collect::<Row>()
        })
        .collect();

    ParsedCsv { headers, rows }
}

/// Tab wins ties, semicolon must beat comma strictly, comma otherwise.
pub fn detect_delimiter(raw: &str) -> char {
    let first_line = raw.split(['\r', '\n']).next().unwrap_or("");

    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();
    let semicolons = first_line.matches(';').count();

    if tabs >= commas && tabs >= semicolons {
        '\t'
    } else if semicolons > commas {
        ';'
    } else {
        ','
    }
}

pub fn tokenize(raw: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            '\r' | '\n' => {
                current.push(std::mem::take(&mut field));
                lines.push(std::mem::take(&mut current));
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            c if c == delimiter => current.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }

    if !field.is_empty() || !current.is_empty() {
        current.push(field);
        lines.push(current);
    }

    lines
}

/// Accepts only `.csv` file names, ignoring case.
pub fn is_csv_file_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

/// Display name of a dataset imported from `file_name`.
pub fn dataset_name_from_file(file_name: &str) -> String {
    if is_csv_file_name(file_name) {
        file_name[..file_name.len() - ".csv".len()].to_string()
    } else {
        file_name.to_string()
    }
}

pub async fn read_csv_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read csv: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}
