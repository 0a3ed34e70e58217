//! Diagnosis-code analysis.
//!
//! Aggregates by the three-character primary-diagnosis prefix, selects the
//! codes that carry the head of the chosen metric up to a cumulative share
//! threshold in one *anchor* period, and shows those codes across every
//! selected period. Codes outside the anchor head never appear, even when
//! they exist in other periods.

use bhyt_model::metric::ValueField;
use bhyt_model::query::{GroupRow, Totals};

use crate::format::{fmt_decimal2, fmt_grouped, fmt_pct2};
use crate::table::{Cell, PeriodSeries, ReportRow, ReportTable, RowKind, Tone};

/// The metric whose shares drive sorting and the cumulative cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMetric {
    Visits,
    TotalCost,
    InsurerCost,
}

impl ShareMetric {
    pub fn value(self, totals: &Totals) -> f64 {
        match self {
            Self::Visits => totals.count() as f64,
            Self::TotalCost => totals.get(ValueField::TongChi),
            Self::InsurerCost => totals.get(ValueField::Bhtt),
        }
    }

    pub fn pct_label(self) -> &'static str {
        match self {
            Self::Visits => "%Số lượt",
            Self::TotalCost => "%Tổng CP",
            Self::InsurerCost => "%CP BHYT",
        }
    }

    /// Label of the per-visit-cost column, which follows the metric.
    pub fn bq_label(self) -> &'static str {
        match self {
            Self::InsurerCost => "BQĐT BHYT",
            _ => "BQĐT Tổng chi",
        }
    }

    /// Default cumulative threshold per report scope.
    pub fn default_threshold_for_scope(scope: Option<&str>) -> f64 {
        match scope {
            Some(bhyt_model::ML2_OUTPATIENT) => 80.0,
            _ => 70.0,
        }
    }
}

/// Derived metric available for the optional difference columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcdDiffMetric {
    Visits,
    AverageStay,
    CostPerVisit,
    Share,
}

impl IcdDiffMetric {
    /// Short label of the absolute-difference column.
    pub fn value_label(self) -> &'static str {
        match self {
            Self::Visits => "Lượt",
            Self::AverageStay => "Ngày",
            Self::CostPerVisit | Self::Share => "Chi phí",
        }
    }
}

/// Difference direction: forward is last-minus-first; reverse is the
/// explicit, opt-in first-minus-last toggle this report alone offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffDirection {
    #[default]
    Forward,
    Reverse,
}

impl DiffDirection {
    pub fn header_tag(self) -> &'static str {
        match self {
            Self::Forward => "P-T",
            Self::Reverse => "T-P",
        }
    }
}

/// Outcome of the cumulative cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSelection {
    /// Codes in descending-share order.
    pub codes: Vec<String>,
    /// Share actually accumulated by `codes`.
    pub cumulative: f64,
    /// How many codes the anchor period had in total.
    pub total_codes: usize,
}

/// Selects the minimal descending-share prefix of diagnosis codes whose
/// cumulative share stays within `threshold`.
///
/// Inclusion stops before the first code that would push the running sum
/// strictly above the threshold; landing exactly on it keeps the code. When
/// even the top code exceeds the threshold on its own it is still included,
/// so the head is never empty while data exists.
pub fn cumulative_head(
    rows: &[GroupRow],
    metric: ShareMetric,
    threshold: f64,
) -> CumulativeSelection {
    let total: f64 = rows.iter().map(|row| metric.value(&row.totals)).sum();
    let mut shares: Vec<(&str, f64)> = rows
        .iter()
        .filter_map(|row| {
            let code = row.key.icd.as_deref()?;
            let share = if total == 0.0 {
                0.0
            } else {
                metric.value(&row.totals) / total * 100.0
            };
            Some((code, share))
        })
        .collect();
    shares.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    let mut codes = Vec::new();
    for (code, share) in &shares {
        if cumulative + share > threshold {
            break;
        }
        cumulative += share;
        codes.push((*code).to_string());
    }
    if codes.is_empty() {
        if let Some((code, share)) = shares.first() {
            cumulative = *share;
            codes.push((*code).to_string());
        }
    }
    CumulativeSelection {
        codes,
        cumulative,
        total_codes: shares.len(),
    }
}

/// Derived values of one code in one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcdRowValues {
    pub so_luot: f64,
    pub ngay_dttb: f64,
    pub bq_dt: f64,
    pub pct: f64,
}

impl IcdRowValues {
    fn get(&self, metric: IcdDiffMetric) -> f64 {
        match metric {
            IcdDiffMetric::Visits => self.so_luot,
            IcdDiffMetric::AverageStay => self.ngay_dttb,
            IcdDiffMetric::CostPerVisit => self.bq_dt,
            IcdDiffMetric::Share => self.pct,
        }
    }
}

/// Computes the four derived values for one code against its period total.
pub fn icd_row_values(totals: &Totals, metric: ShareMetric, period_total: &Totals) -> IcdRowValues {
    let visits = totals.count() as f64;
    let days = totals.get(ValueField::SoNgayDtri);
    let cost = match metric {
        ShareMetric::InsurerCost => totals.get(ValueField::Bhtt),
        _ => totals.get(ValueField::TongChi),
    };
    let total = metric.value(period_total);
    IcdRowValues {
        so_luot: visits,
        ngay_dttb: if visits == 0.0 { 0.0 } else { days / visits },
        bq_dt: if visits == 0.0 { 0.0 } else { cost / visits },
        pct: if total == 0.0 {
            0.0
        } else {
            metric.value(totals) / total * 100.0
        },
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IcdOptions {
    pub diff: Option<IcdDiffMetric>,
    pub direction: DiffDirection,
}

/// Builds the diagnosis table: the anchor head codes as rows, four derived
/// columns per period, the optional difference pair, and a grand-total row
/// computed from each period's full (unfiltered) aggregation.
pub fn icd_table(
    periods: &[PeriodSeries],
    selection: &CumulativeSelection,
    metric: ShareMetric,
    options: IcdOptions,
) -> ReportTable {
    let n = periods.len();
    let show_diff = options.diff.is_some() && n >= 2;

    let mut header = vec!["STT".to_string(), "Mã bệnh".to_string()];
    for series in periods {
        let label = series.label();
        header.push(format!("Số lượt {label}"));
        header.push(format!("Ngày ĐTTB {label}"));
        header.push(format!("{} {label}", metric.bq_label()));
        header.push(format!("{} {label}", metric.pct_label()));
    }
    if show_diff {
        header.push(format!("Chênh lệch ({})", options.direction.header_tag()));
        header.push("%".to_string());
    }
    let mut table = ReportTable::new("Phân tích ICD", header);

    let period_totals: Vec<Totals> = periods.iter().map(PeriodSeries::grand_totals).collect();

    for (idx, code) in selection.codes.iter().enumerate() {
        let mut cells = vec![Cell::text((idx + 1).to_string()), Cell::text(code.as_str())];
        let mut computed: Vec<Option<IcdRowValues>> = Vec::with_capacity(n);
        for (series, totals) in periods.iter().zip(&period_totals) {
            let row = series
                .rows
                .iter()
                .find(|row| row.key.icd.as_deref() == Some(code.as_str()));
            match row {
                Some(row) => {
                    let values = icd_row_values(&row.totals, metric, totals);
                    computed.push(Some(values));
                    push_value_cells(&mut cells, &values);
                }
                None => {
                    computed.push(None);
                    push_missing_cells(&mut cells);
                }
            }
        }
        if show_diff {
            push_diff_cells(&mut cells, &computed, options);
        }
        table.push(ReportRow::new(RowKind::Detail, cells));
    }

    // Grand totals over the full aggregation, not just the selected head.
    let mut cells = vec![Cell::blank(), Cell::text("TỔNG TOÀN BỘ")];
    let mut computed: Vec<Option<IcdRowValues>> = Vec::with_capacity(n);
    for (series, totals) in periods.iter().zip(&period_totals) {
        if series.is_empty() {
            computed.push(None);
            push_missing_cells(&mut cells);
            continue;
        }
        let mut values = icd_row_values(totals, metric, totals);
        values.pct = 100.0;
        computed.push(Some(values));
        push_value_cells(&mut cells, &values);
    }
    if show_diff {
        push_diff_cells(&mut cells, &computed, options);
    }
    table.push(ReportRow::new(RowKind::Total, cells));

    table
}

fn push_value_cells(cells: &mut Vec<Cell>, values: &IcdRowValues) {
    cells.push(Cell::text(fmt_grouped(values.so_luot)));
    cells.push(Cell::text(fmt_decimal2(values.ngay_dttb)));
    cells.push(Cell::text(fmt_grouped(values.bq_dt)));
    cells.push(Cell::text(fmt_pct2(values.pct)));
}

fn push_missing_cells(cells: &mut Vec<Cell>) {
    for _ in 0..4 {
        cells.push(Cell::text("-"));
    }
}

fn push_diff_cells(cells: &mut Vec<Cell>, computed: &[Option<IcdRowValues>], options: IcdOptions) {
    let Some(metric) = options.diff else {
        return;
    };
    let (Some(Some(first)), Some(Some(last))) = (computed.first(), computed.last()) else {
        cells.push(Cell::text("-"));
        cells.push(Cell::text("-"));
        return;
    };
    let (a, b) = match options.direction {
        DiffDirection::Forward => (last.get(metric), first.get(metric)),
        DiffDirection::Reverse => (first.get(metric), last.get(metric)),
    };
    let diff = a - b;
    let pct = if b == 0.0 { 0.0 } else { diff / b * 100.0 };
    let text = match metric {
        IcdDiffMetric::Visits | IcdDiffMetric::CostPerVisit => {
            signed(fmt_grouped(diff), diff)
        }
        IcdDiffMetric::AverageStay => signed(fmt_decimal2(diff), diff),
        IcdDiffMetric::Share => signed(fmt_pct2(diff), diff),
    };
    cells.push(Cell::toned(text, tone_of(diff)));
    cells.push(Cell::toned(signed(fmt_pct2(pct), pct), tone_of(pct)));
}

fn signed(text: String, value: f64) -> String {
    if value > 0.0 {
        format!("+{text}")
    } else {
        text
    }
}

fn tone_of(value: f64) -> Tone {
    if value > 0.0 {
        Tone::Favorable
    } else if value < 0.0 {
        Tone::Unfavorable
    } else {
        Tone::Neutral
    }
}
