//! CSV export of built report tables, preserving the displayed values.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::table::ReportTable;

/// Writes the table to any writer as CSV: header row first, then every body
/// row (section captions included, as they appear on screen).
pub fn write_csv<W: Write>(table: &ReportTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&table.columns)
        .context("write report header")?;
    for row in &table.rows {
        csv.write_record(row.cells.iter().map(|cell| cell.text.as_str()))
            .context("write report row")?;
    }
    csv.flush().context("flush report csv")?;
    Ok(())
}

/// Writes the table to a file path.
pub fn export_csv(table: &ReportTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create {}", path.display()))?;
    write_csv(table, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ReportRow, RowKind};

    #[test]
    fn csv_matches_displayed_cells() {
        let mut table = ReportTable::new(
            "t",
            vec!["A".to_string(), "B".to_string()],
        );
        table.push(ReportRow::new(
            RowKind::Detail,
            vec![Cell::text("1,000"), Cell::text("-")],
        ));
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "A,B\n\"1,000\",-\n");
    }
}
