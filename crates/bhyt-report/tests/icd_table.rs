//! Diagnosis table behavior across periods.

use bhyt_model::metric::ValueField;
use bhyt_model::period::Period;
use bhyt_model::query::{GroupKey, GroupRow, Totals};
use bhyt_report::icd::{
    CumulativeSelection, DiffDirection, IcdDiffMetric, IcdOptions, ShareMetric, cumulative_head,
    icd_table,
};
use bhyt_report::table::{PeriodSeries, RowKind};

fn icd_row(code: &str, visits: u64, tongchi: f64, days: f64) -> GroupRow {
    let mut totals = Totals::default();
    for i in 0..visits {
        let mut values = [None; ValueField::ALL.len()];
        if i == 0 {
            values[ValueField::TongChi.index()] = Some(tongchi);
            values[ValueField::SoNgayDtri.index()] = Some(days);
        }
        totals.add_record(values);
    }
    GroupRow {
        key: GroupKey {
            icd: Some(code.to_string()),
            ..GroupKey::default()
        },
        totals,
    }
}

fn series(spec: &str, rows: Vec<GroupRow>) -> PeriodSeries {
    PeriodSeries::new(spec.parse::<Period>().unwrap(), rows)
}

fn selection(codes: &[&str]) -> CumulativeSelection {
    CumulativeSelection {
        codes: codes.iter().map(|c| (*c).to_string()).collect(),
        cumulative: 0.0,
        total_codes: codes.len(),
    }
}

#[test]
fn anchor_codes_define_rows_for_all_periods() {
    let jan = series(
        "2026-01",
        vec![icd_row("J18", 10, 1_000.0, 40.0), icd_row("A09", 5, 500.0, 10.0)],
    );
    // February carries an extra code that must never appear, and misses A09.
    let feb = series(
        "2026-02",
        vec![icd_row("J18", 20, 3_000.0, 60.0), icd_row("I10", 9, 900.0, 9.0)],
    );
    let head = cumulative_head(&jan.rows, ShareMetric::TotalCost, 100.0);
    assert_eq!(head.codes, vec!["J18", "A09"]);

    let table = icd_table(&[jan, feb], &head, ShareMetric::TotalCost, IcdOptions::default());
    let codes: Vec<&str> = table
        .rows
        .iter()
        .filter(|row| row.kind == RowKind::Detail)
        .map(|row| row.cells[1].text.as_str())
        .collect();
    assert_eq!(codes, vec!["J18", "A09"]);

    // A09 exists in January but not February: its February cells are dashes.
    let a09 = &table.rows[1];
    assert_eq!(a09.cells[2].text, "5"); // January visits
    assert_eq!(a09.cells[6].text, "-"); // February visits
    assert_eq!(a09.cells[7].text, "-");
}

#[test]
fn per_period_share_uses_that_periods_total() {
    let jan = series(
        "2026-01",
        vec![icd_row("J18", 10, 750.0, 0.0), icd_row("A09", 10, 250.0, 0.0)],
    );
    let head = selection(&["J18", "A09"]);
    let table = icd_table(&[jan], &head, ShareMetric::TotalCost, IcdOptions::default());
    // %Tổng CP of J18 = 750 / 1000 = 75.00%.
    assert_eq!(table.rows[0].cells[5].text, "75.00%");
    assert_eq!(table.rows[1].cells[5].text, "25.00%");
    // Grand-total row shows 100%.
    let total = table.rows.last().unwrap();
    assert_eq!(total.kind, RowKind::Total);
    assert_eq!(total.cells[1].text, "TỔNG TOÀN BỘ");
    assert_eq!(total.cells[5].text, "100.00%");
}

#[test]
fn forward_and_reverse_directions_swap_operands() {
    let jan = series("2026-01", vec![icd_row("J18", 10, 0.0, 0.0)]);
    let mar = series("2026-03", vec![icd_row("J18", 30, 0.0, 0.0)]);

    let forward = icd_table(
        &[jan.clone(), mar.clone()],
        &selection(&["J18"]),
        ShareMetric::Visits,
        IcdOptions {
            diff: Some(IcdDiffMetric::Visits),
            direction: DiffDirection::Forward,
        },
    );
    let cells = &forward.rows[0].cells;
    // Last - first = +20, relative to first: +200%.
    assert_eq!(cells[cells.len() - 2].text, "+20");
    assert_eq!(cells[cells.len() - 1].text, "+200.00%");

    let reverse = icd_table(
        &[jan, mar],
        &selection(&["J18"]),
        ShareMetric::Visits,
        IcdOptions {
            diff: Some(IcdDiffMetric::Visits),
            direction: DiffDirection::Reverse,
        },
    );
    let cells = &reverse.rows[0].cells;
    // First - last = -20, relative to last.
    assert_eq!(cells[cells.len() - 2].text, "-20");
    assert!(cells[cells.len() - 1].text.starts_with("-66.67"));
}

#[test]
fn insurer_metric_switches_the_cost_basis() {
    let mut row = icd_row("J18", 10, 1_000.0, 0.0);
    // Add insurer-paid spend on top.
    let mut values = [None; ValueField::ALL.len()];
    values[ValueField::Bhtt.index()] = Some(4_400.0);
    row.totals.add_record(values);
    let jan = series("2026-01", vec![row]);
    let table = icd_table(
        &[jan],
        &selection(&["J18"]),
        ShareMetric::InsurerCost,
        IcdOptions::default(),
    );
    assert!(table.columns[4].starts_with("BQĐT BHYT"));
    // 4,400 insurer-paid over 11 visits.
    assert_eq!(table.rows[0].cells[4].text, "400");
}

#[test]
fn header_tags_follow_direction() {
    assert_eq!(DiffDirection::Forward.header_tag(), "P-T");
    assert_eq!(DiffDirection::Reverse.header_tag(), "T-P");
}
