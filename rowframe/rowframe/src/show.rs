//! Text rendering for `show`.

use rowframe_arrow::format_table;
use rowframe_core::{Row, Schema};

use crate::error::FrameError;

/// Render `rows` under `schema` as a bordered table. With `truncate` set,
/// header names and cells longer than the width are cut.
/// `more` appends the `only showing top n rows` footer.
pub(crate) fn render_rows(
    schema: &Schema,
    rows: &[Row],
    truncate: Option<usize>,
    more: bool,
) -> Result<String, FrameError> {
    let header: Vec<String> = schema.names().map(|name| cell(name, truncate)).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|v| cell(&v.to_string(), truncate)).collect())
        .collect();

    let mut out = format_table(&header, &cells)?;
    out.push('\n');
    if more {
        out.push_str(&format!("only showing top {} rows\n", rows.len()));
    }
    Ok(out)
}

fn cell(text: &str, truncate: Option<usize>) -> String {
    match truncate {
        Some(width) if text.chars().count() > width => {
            if width < 4 {
                text.chars().take(width).collect()
            } else {
                let mut cut: String = text.chars().take(width - 3).collect();
                cut.push_str("...");
                cut
            }
        }
        _ => text.to_string(),
    }
}
