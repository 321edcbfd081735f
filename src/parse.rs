use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::errors::BenchplotError;
use crate::types::{Descriptor, MeasurementTable, TAG_COLUMNS};

/// Parse a whitespace-delimited table with a header row.
///
/// Blank lines are skipped. Header names must be unique and must not reuse a
/// tag column name (`lang`, `prog`, `size`, `col`). Every data line must have
/// as many fields as the header and every field must parse as `f64`. `path`
/// is only used in errors.
pub fn parse_table(text: &str, path: &Path) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let parse_err = |line: usize, detail: String| BenchplotError::FileParse {
        path: path.to_path_buf(),
        line,
        detail,
    };

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((header_line, header)) = lines.next() else {
        return Err(parse_err(1, "no header row".to_string()).into());
    };

    let columns: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            return Err(parse_err(header_line, format!("duplicate column '{}'", name)).into());
        }
        if TAG_COLUMNS.contains(&name.as_str()) {
            return Err(parse_err(
                header_line,
                format!("column '{}' clashes with a tag column", name),
            )
            .into());
        }
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let mut row = Vec::with_capacity(columns.len());
        for field in line.split_whitespace() {
            let value: f64 = field
                .parse()
                .map_err(|_| parse_err(line_no, format!("'{}' is not a number", field)))?;
            row.push(value);
        }

        if row.len() != columns.len() {
            return Err(parse_err(
                line_no,
                format!("expected {} fields, found {}", columns.len(), row.len()),
            )
            .into());
        }

        rows.push(row);
    }

    Ok((columns, rows))
}

/// Read the descriptor's file (relative to `base_dir`) and tag it.
pub fn load_table(descriptor: &Descriptor, base_dir: &Path) -> Result<MeasurementTable> {
    let full_path = base_dir.join(&descriptor.path);
    let text = std::fs::read_to_string(&full_path).map_err(|source| BenchplotError::FileRead {
        path: descriptor.path.clone(),
        source,
    })?;

    let (columns, rows) = parse_table(&text, &descriptor.path)?;
    if rows.is_empty() {
        warn!(path = %descriptor.path.display(), "header only, no measurements");
    }
    info!(
        path = %descriptor.path.display(),
        lang = %descriptor.lang,
        prog = %descriptor.prog,
        size = %descriptor.size,
        col = %descriptor.col,
        rows = rows.len(),
        "loaded"
    );

    Ok(MeasurementTable {
        descriptor: descriptor.clone(),
        columns,
        rows,
    })
}
