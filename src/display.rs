use owo_colors::{OwoColorize, Stream, Style};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{Row, TAG_COLUMNS, UnifiedTable};

/// Render a measurement as a dataframe would: integral values without a
/// fractional part, `NaN` spelled out.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

fn style_header() -> Style {
    Style::new().bold()
}

fn style_index() -> Style {
    Style::new().cyan()
}

fn cells(row: &Row) -> Vec<String> {
    let mut out: Vec<String> = row.values.iter().map(|v| format_value(*v)).collect();
    out.push(row.lang.clone());
    out.push(row.prog.clone());
    out.push(row.size.clone());
    out.push(row.col.clone());
    out
}

/// Pick which rows to print. With more rows than `max_rows` the head and tail
/// halves are kept, and the position of the `...` line between them is
/// returned. `max_rows == 0` prints everything.
fn visible_rows(table: &UnifiedTable, max_rows: usize) -> (Vec<&Row>, Option<usize>) {
    if max_rows == 0 || table.len() <= max_rows {
        return (table.rows.iter().collect(), None);
    }
    let head = max_rows.div_ceil(2);
    let tail = max_rows / 2;
    let mut rows: Vec<&Row> = table.rows[..head].iter().collect();
    rows.extend(table.rows[table.len() - tail..].iter());
    (rows, Some(head))
}

/// Plain-text table: header, aligned columns, optional `...` gap, shape footer.
pub fn format_table(table: &UnifiedTable, max_rows: usize) -> String {
    let mut headers: Vec<String> = table.columns.clone();
    headers.extend(TAG_COLUMNS.iter().map(|s| s.to_string()));

    let (rows, gap_at) = visible_rows(table, max_rows);
    let body: Vec<(String, Vec<String>)> = rows
        .iter()
        .map(|r| (r.index.to_string(), cells(r)))
        .collect();

    let mut index_width = body.iter().map(|(i, _)| i.len()).max().unwrap_or(0);
    if gap_at.is_some() {
        index_width = index_width.max(3);
    }
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            body.iter()
                .map(|(_, cells)| cells[c].len())
                .max()
                .unwrap_or(0)
                .max(h.len())
        })
        .collect();

    let hdr_style = style_header();
    let idx_style = style_index();

    let mut out = String::new();

    // Header: blank index cell, then right-aligned column names
    out.push_str(&" ".repeat(index_width));
    for (h, w) in headers.iter().zip(&widths) {
        let padded = format!("  {:>width$}", h, width = *w);
        out.push_str(
            &padded
                .if_supports_color(Stream::Stdout, |s| s.style(hdr_style))
                .to_string(),
        );
    }
    out.push('\n');

    for (n, (index, row_cells)) in body.iter().enumerate() {
        if gap_at == Some(n) {
            out.push_str(&format!("{:<width$}", "...", width = index_width));
            for w in &widths {
                out.push_str(&format!("  {:>width$}", "...", width = *w));
            }
            out.push('\n');
        }

        let idx_padded = format!("{:<width$}", index, width = index_width);
        out.push_str(
            &idx_padded
                .if_supports_color(Stream::Stdout, |s| s.style(idx_style))
                .to_string(),
        );
        for (cell, w) in row_cells.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = *w));
        }
        out.push('\n');
    }

    out.push_str(&format!("\n[{} rows x {} columns]\n", table.len(), table.width()));
    out
}

/// One JSON object per row, keys in table order.
struct JsonRecord<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 5))?;
        map.serialize_entry("index", &self.row.index)?;
        for (name, value) in self.columns.iter().zip(&self.row.values) {
            let value = value.is_finite().then_some(*value);
            map.serialize_entry(name, &value)?;
        }
        map.serialize_entry("lang", &self.row.lang)?;
        map.serialize_entry("prog", &self.row.prog)?;
        map.serialize_entry("size", &self.row.size)?;
        map.serialize_entry("col", &self.row.col)?;
        map.end()
    }
}

pub fn format_json(table: &UnifiedTable) -> String {
    let records: Vec<JsonRecord<'_>> = table
        .rows
        .iter()
        .map(|row| JsonRecord {
            columns: &table.columns,
            row,
        })
        .collect();

    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}
