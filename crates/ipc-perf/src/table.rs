//! Markdown and CSV rendering of result tables.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::PerfError;

/// Centered-alignment cell of a Markdown alignment row.
pub const ALIGN_MARKER: &str = ":---:";

fn markdown_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    format!("| {} |", cells.join(" | "))
}

/// Render rows as Markdown lines: header, alignment row, then data rows.
///
/// Fails with [`PerfError::EmptyTable`] when there is no header row.
pub fn to_markdown(rows: &[Vec<String>]) -> Result<Vec<String>, PerfError> {
    let (header, data) = rows.split_first().ok_or(PerfError::EmptyTable)?;

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(markdown_row(header));
    lines.push(markdown_row(&vec![ALIGN_MARKER; header.len()]));
    lines.extend(data.iter().map(|row| markdown_row(row)));
    Ok(lines)
}

/// Write rows verbatim as CSV, replacing any existing file.
pub fn to_csv(rows: &[Vec<String>], destination: impl AsRef<Path>) -> Result<(), PerfError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(destination.as_ref())?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|source| PerfError::Io {
        path: destination.as_ref().to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read a CSV file back into rows, header included.
pub fn read_csv(source: impl AsRef<Path>) -> Result<Vec<Vec<String>>, PerfError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(source.as_ref())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
