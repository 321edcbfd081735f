use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::parse::load_table;
use crate::types::{Descriptor, MeasurementTable, Row, UnifiedTable};

/// Load every descriptor in order and concatenate the results.
///
/// Files are read one at a time. The first failure aborts the whole load, so
/// callers never see a partial table.
pub fn load_all(descriptors: &[Descriptor], base_dir: &Path) -> Result<UnifiedTable> {
    let mut tables = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        info!(path = %descriptor.path.display(), "loading");
        tables.push(load_table(descriptor, base_dir)?);
    }
    Ok(concat(tables))
}

/// Row-wise concatenation with a fresh 0-based index.
///
/// The column set is the union of all input columns in first-seen order.
/// Rows whose table lacks a column get `NaN` there.
pub fn concat(tables: Vec<MeasurementTable>) -> UnifiedTable {
    let mut columns: Vec<String> = Vec::new();
    for table in &tables {
        for name in &table.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let total: usize = tables.iter().map(MeasurementTable::len).sum();
    let mut rows = Vec::with_capacity(total);

    for table in tables {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|c| table.columns.iter().position(|t| t == c))
            .collect();

        let Descriptor { lang, prog, size, col, .. } = table.descriptor;
        for values in table.rows {
            let aligned = positions
                .iter()
                .map(|pos| pos.map_or(f64::NAN, |i| values[i]))
                .collect();
            rows.push(Row {
                index: rows.len(),
                values: aligned,
                lang: lang.clone(),
                prog: prog.clone(),
                size: size.clone(),
                col: col.clone(),
            });
        }
    }

    UnifiedTable { columns, rows }
}
