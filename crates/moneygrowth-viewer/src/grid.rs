//! Tabular snapshot and box-drawing rendering

use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use moneygrowth_core::Row;
use moneygrowth_utils::format_number;

use crate::window::ViewWindow;

pub const PLACEHOLDER_COLUMN: &str = "System";
pub const PLACEHOLDER_VALUE: &str = "No data found";

/// Rows flattened to display strings under a fixed column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    cells: Vec<Vec<String>>,
}

impl Dataset {
    /// Build from fetched rows.
    ///
    /// Columns follow first appearance across all rows. An empty input gives
    /// a single placeholder row.
    pub fn from_rows(rows: &[Row]) -> Self {
        if rows.is_empty() {
            return Self::placeholder();
        }

        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let cells = rows
            .iter()
            .map(|row| columns.iter().map(|c| cell_text(row.get(c))).collect())
            .collect();

        Self { columns, cells }
    }

    fn placeholder() -> Self {
        Self {
            columns: vec![PLACEHOLDER_COLUMN.to_string()],
            cells: vec![vec![PLACEHOLDER_VALUE.to_string()]],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Grid lines for the window, header first
    pub fn render(&self, window: &ViewWindow, max_cell_width: usize) -> Vec<String> {
        let cols: Vec<usize> = window.cols().collect();
        let fit = |s: &str| truncate_string(s, max_cell_width);

        let header: Vec<String> = cols.iter().map(|&c| fit(&self.columns[c])).collect();
        let body: Vec<Vec<String>> = window
            .rows()
            .map(|r| cols.iter().map(|&c| fit(&self.cells[r][c])).collect())
            .collect();

        let widths: Vec<usize> = (0..cols.len())
            .map(|i| {
                body.iter()
                    .map(|line| line[i].width())
                    .chain(std::iter::once(header[i].width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(body.len() + 4);
        lines.push(border(&widths, '┌', '┬', '┐'));
        lines.push(grid_row(&header, &widths));
        lines.push(border(&widths, '├', '┼', '┤'));
        for line in &body {
            lines.push(grid_row(line, &widths));
        }
        lines.push(border(&widths, '└', '┴', '┘'));
        lines
    }
}

/// Null and missing cells are blank; strings are shown without quotes
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Cut a string to `max_width` columns, ending in `..` when shortened
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width < 3 {
        return take_width(s, max_width);
    }
    let mut result = take_width(s, max_width - 2);
    result.push_str("..");
    result
}

fn take_width(s: &str, max_width: usize) -> String {
    let mut used = 0;
    s.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= max_width
        })
        .collect()
}

/// `Rows: a-b of N | Cols: c-d of M`, 1-indexed
pub fn status_line(window: &ViewWindow) -> String {
    let rows = window.rows();
    let cols = window.cols();
    format!(
        "Rows: {}-{} of {} | Cols: {}-{} of {}",
        format_number(rows.start + 1),
        format_number(rows.end),
        format_number(window.total_rows()),
        format_number(cols.start + 1),
        format_number(cols.end),
        format_number(window.total_cols()),
    )
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}", left, inner.join(&mid.to_string()), right)
}

fn grid_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!(" {}{} ", cell, " ".repeat(w.saturating_sub(cell.width()))))
        .collect();
    format!("│{}│", padded.join("│"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    }

    #[test]
    fn test_empty_dataset_placeholder() {
        let dataset = Dataset::from_rows(&[]);
        assert_eq!(dataset.columns(), &["System".to_string()]);
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.cell(0, 0), Some("No data found"));

        let window = ViewWindow::new(dataset.row_count(), dataset.column_count(), 15, 5);
        let lines = dataset.render(&window, 24);
        assert_eq!(lines.len(), 5);
        assert!(lines[3].contains("No data found"));
        assert_eq!(status_line(&window), "Rows: 1-1 of 1 | Cols: 1-1 of 1");
    }

    #[test]
    fn test_column_order_is_first_appearance() {
        let dataset = Dataset::from_rows(&rows(vec![
            json!({"id": 1}),
            json!({"id": 2, "amount": 5}),
            json!({"note": "late"}),
        ]));
        assert_eq!(dataset.columns(), &["id", "amount", "note"]);
        assert_eq!(dataset.cell(0, 1), Some(""));
        assert_eq!(dataset.cell(1, 1), Some("5"));
        assert_eq!(dataset.cell(2, 0), Some(""));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("snack"))), "snack");
        assert_eq!(cell_text(Some(&json!(2.5))), "2.5");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a long description", 8), "a long..");
        assert_eq!(truncate_string("abcdef", 2), "ab");
        assert_eq!(truncate_string("日本語テキスト", 6), "日本..");
    }

    #[test]
    fn test_render_window_slice() {
        let data: Vec<Value> = (0..4)
            .map(|i| json!({"a": i, "b": "x", "c": "y", "d": format!("d{}", i)}))
            .collect();
        let dataset = Dataset::from_rows(&rows(data));
        let window = ViewWindow::new(dataset.row_count(), dataset.column_count(), 2, 2);
        let lines = dataset.render(&window, 24);

        assert_eq!(lines[0], "┌───┬───┐");
        assert_eq!(lines[1], "│ a │ b │");
        assert_eq!(lines[3], "│ 0 │ x │");
        assert_eq!(lines[4], "│ 1 │ x │");
        assert_eq!(lines.len(), 6);
        assert!(!lines.iter().any(|l| l.contains("d0")));
    }

    #[test]
    fn test_status_line_thousands() {
        let window = ViewWindow::new(12_500, 10, 15, 5);
        assert_eq!(status_line(&window), "Rows: 1-15 of 12,500 | Cols: 1-5 of 10");
    }
}
