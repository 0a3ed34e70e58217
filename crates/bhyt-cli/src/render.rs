//! Terminal rendering of report tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bhyt_model::period::YearMonth;
use bhyt_report::table::{ReportRow, ReportTable, RowKind, Tone};

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn body_cell(row: &ReportRow, cell: &bhyt_report::table::Cell) -> Cell {
    let mut out = Cell::new(&cell.text);
    out = match cell.tone {
        Tone::Favorable => out.fg(Color::Green).add_attribute(Attribute::Bold),
        Tone::Unfavorable => out.fg(Color::Red).add_attribute(Attribute::Bold),
        Tone::Neutral => out,
    };
    match row.kind {
        RowKind::Section => out.fg(Color::Blue).add_attribute(Attribute::Bold),
        RowKind::Subtotal => out.add_attribute(Attribute::Italic).add_attribute(Attribute::Bold),
        RowKind::Total => out.add_attribute(Attribute::Bold),
        RowKind::Detail => out,
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

/// Builds the terminal table for a report.
pub fn report_to_table(report: &ReportTable) -> Table {
    let mut table = Table::new();
    table.set_header(report.columns.iter().map(|label| header_cell(label)));
    apply_table_style(&mut table);
    for (idx, _) in report.columns.iter().enumerate().skip(2) {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for row in &report.rows {
        table.add_row(row.cells.iter().map(|cell| body_cell(row, cell)));
    }
    table
}

/// Prints a report with its title.
pub fn print_report(report: &ReportTable) {
    println!("{}", report.title);
    println!("{}", report_to_table(report));
}

/// Prints the available settlement months.
pub fn print_periods(months: &[YearMonth]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Năm"), header_cell("Tháng")]);
    apply_table_style(&mut table);
    for month in months {
        table.add_row(vec![Cell::new(month.year), Cell::new(format!("{:02}", month.month))]);
    }
    if months.is_empty() {
        table.add_row(vec![dim_cell("-"), dim_cell("-")]);
    }
    println!("{table}");
}
