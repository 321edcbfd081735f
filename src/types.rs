use std::path::PathBuf;

/// One benchmark result file and the dimension tags it was enumerated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub path: PathBuf,
    pub lang: String,
    pub prog: String,
    pub size: String,
    pub col: String,
}

/// Parsed contents of one result file, tagged by its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    pub descriptor: Descriptor,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl MeasurementTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single row of the unified table. `values` lines up with `UnifiedTable::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub values: Vec<f64>,
    pub lang: String,
    pub prog: String,
    pub size: String,
    pub col: String,
}

/// Concatenation of every measurement table, re-indexed from zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Names of the tag columns appended to every row, in display order.
pub const TAG_COLUMNS: [&str; 4] = ["lang", "prog", "size", "col"];

impl UnifiedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Total column count as a dataframe would report it: numeric plus tag columns.
    pub fn width(&self) -> usize {
        self.columns.len() + TAG_COLUMNS.len()
    }

    /// Distinct values of a tag in order of first appearance.
    pub fn distinct<F>(&self, tag: F) -> Vec<String>
    where
        F: Fn(&Row) -> &str,
    {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            let value = tag(row);
            if !seen.iter().any(|s| s == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }
}
