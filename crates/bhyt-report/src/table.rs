//! Structured report tables.
//!
//! Builders produce a flat, renderer-agnostic table: one label row of
//! columns and typed body rows. The CLI turns this into a terminal table;
//! the CSV export writes it verbatim. Tone carries the sign semantics of
//! comparison cells (favorable / unfavorable / neutral) without committing
//! to any particular styling.

use bhyt_model::period::Period;
use bhyt_model::query::{GroupRow, Totals};

/// Sign semantics of a comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    Favorable,
    Unfavorable,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Neutral,
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A section caption (`I. Ngoại trú`).
    Section,
    Detail,
    /// Per-section sum row.
    Subtotal,
    /// Grand-total row.
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl ReportRow {
    pub fn new(kind: RowKind, cells: Vec<Cell>) -> Self {
        Self { kind, cells }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    /// A section row: blanks everywhere except the given label position.
    pub fn section(&mut self, label_at: usize, label: impl Into<String>) {
        let mut cells = vec![Cell::blank(); self.columns.len()];
        cells[label_at] = Cell::text(label);
        self.rows.push(ReportRow::new(RowKind::Section, cells));
    }
}

/// One selected period together with its aggregated rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSeries {
    pub period: Period,
    pub rows: Vec<GroupRow>,
}

impl PeriodSeries {
    pub fn new(period: Period, rows: Vec<GroupRow>) -> Self {
        Self { period, rows }
    }

    pub fn label(&self) -> String {
        self.period.label()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of every group row — the period's own grand total.
    pub fn grand_totals(&self) -> Totals {
        let mut totals = Totals::default();
        for row in &self.rows {
            totals.merge(&row.totals);
        }
        totals
    }
}
