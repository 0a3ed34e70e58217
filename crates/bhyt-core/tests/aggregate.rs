//! Aggregation behavior over a hand-built fact frame.

use polars::prelude::{Column, DataFrame};

use bhyt_core::aggregate::{aggregate_frame, distinct_departments, distinct_year_months};
use bhyt_model::lookup::{DepartmentRow, FacilityRow, LookupSet, Validity, VisitTypeRow};
use bhyt_model::metric::ValueField;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::query::{AggregateRequest, Grouping};
use bhyt_model::visit::col;

const OPEN: Validity = Validity {
    valid_from: Some(20_250_101),
    valid_to: None,
};

fn lookups() -> LookupSet {
    LookupSet {
        visit_types: vec![
            VisitTypeRow {
                ma_loaikcb: Some(1),
                ml2: Some("Ngoại trú".to_string()),
                ml4: Some("Khám bệnh".to_string()),
                validity: OPEN,
            },
            VisitTypeRow {
                ma_loaikcb: Some(3),
                ml2: Some("Nội trú".to_string()),
                ml4: None,
                validity: OPEN,
            },
        ],
        facilities: vec![FacilityRow {
            ma_cskcb: Some("01234".to_string()),
            ten_cskcb: Some("TTYT".to_string()),
            validity: OPEN,
        }],
        departments: vec![DepartmentRow {
            ma_cskcb: Some("01234".to_string()),
            makhoa_xml: Some("K02".to_string()),
            short_name: Some("Nội tổng hợp".to_string()),
            validity: OPEN,
            ..DepartmentRow::default()
        }],
    }
}

struct Row {
    nam_qt: i64,
    thang_qt: i64,
    ma_loaikcb: Option<i64>,
    ma_khoa: &'static str,
    ma_benh: Option<&'static str>,
    t_tongchi: Option<f64>,
}

fn fact_frame(rows: &[Row]) -> DataFrame {
    let mut columns = vec![
        Column::new(
            col::NAM_QT.into(),
            rows.iter().map(|r| r.nam_qt).collect::<Vec<_>>(),
        ),
        Column::new(
            col::THANG_QT.into(),
            rows.iter().map(|r| r.thang_qt).collect::<Vec<_>>(),
        ),
        Column::new(
            col::MA_LOAIKCB.into(),
            rows.iter().map(|r| r.ma_loaikcb).collect::<Vec<_>>(),
        ),
        Column::new(
            col::MA_CSKCB.into(),
            rows.iter().map(|_| "01234").collect::<Vec<_>>(),
        ),
        Column::new(
            col::MA_KHOA.into(),
            rows.iter().map(|r| r.ma_khoa).collect::<Vec<_>>(),
        ),
        Column::new(
            col::MA_BENH.into(),
            rows.iter().map(|r| r.ma_benh).collect::<Vec<_>>(),
        ),
    ];
    for field in ValueField::ALL {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|r| {
                if field == ValueField::TongChi {
                    r.t_tongchi
                } else {
                    None
                }
            })
            .collect();
        columns.push(Column::new(field.column().into(), values));
    }
    DataFrame::new(columns).expect("build fact frame")
}

fn inpatient(nam_qt: i64, thang_qt: i64, t_tongchi: Option<f64>) -> Row {
    Row {
        nam_qt,
        thang_qt,
        ma_loaikcb: Some(3),
        ma_khoa: "K02",
        ma_benh: Some("J18.9"),
        t_tongchi,
    }
}

fn period(spec: &str) -> Period {
    spec.parse().expect("period literal")
}

#[test]
fn range_endpoints_are_inclusive() {
    let df = fact_frame(&[
        inpatient(2025, 12, Some(10.0)),
        inpatient(2026, 1, Some(20.0)),
        inpatient(2026, 3, Some(30.0)),
        inpatient(2026, 4, Some(40.0)),
    ]);
    let request = AggregateRequest::new(period("2026-01..2026-03"), Grouping::Department);
    let rows = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].totals.count(), 2);
    assert_eq!(rows[0].totals.get(ValueField::TongChi), 50.0);
}

#[test]
fn null_only_groups_sum_to_zero() {
    let df = fact_frame(&[inpatient(2026, 1, None), inpatient(2026, 1, None)]);
    let request = AggregateRequest::new(period("2026-01"), Grouping::Department);
    let rows = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(rows[0].totals.count(), 2);
    assert_eq!(rows[0].totals.get(ValueField::TongChi), 0.0);
}

#[test]
fn department_grouping_drops_unlabeled_rows() {
    let mut rows = vec![inpatient(2026, 1, Some(5.0))];
    rows.push(Row {
        ma_khoa: "K99", // no registry entry -> no label
        ..inpatient(2026, 1, Some(7.0))
    });
    let df = fact_frame(&rows);
    let request = AggregateRequest::new(period("2026-01"), Grouping::Department);
    let out = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].key.khoa.as_deref(), Some("Nội tổng hợp"));
    assert_eq!(out[0].totals.count(), 1);
}

#[test]
fn diagnosis_grouping_keys_by_prefix_and_honors_ml2_filter() {
    let df = fact_frame(&[
        inpatient(2026, 1, Some(5.0)),
        Row {
            ma_benh: Some("J18.1"),
            ..inpatient(2026, 1, Some(7.0))
        },
        Row {
            ma_loaikcb: Some(1), // outpatient
            ..inpatient(2026, 1, Some(11.0))
        },
        Row {
            ma_benh: None,
            ..inpatient(2026, 1, Some(13.0))
        },
    ]);
    let request = AggregateRequest::new(period("2026-01"), Grouping::DiagnosisPrefix)
        .with_ml2(Some("Nội trú".to_string()));
    let out = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].key.icd.as_deref(), Some("J18"));
    assert_eq!(out[0].totals.count(), 2);
    assert_eq!(out[0].totals.get(ValueField::TongChi), 12.0);
}

#[test]
fn repeated_queries_are_identical() {
    let df = fact_frame(&[
        inpatient(2026, 1, Some(5.0)),
        Row {
            ma_loaikcb: Some(1),
            ..inpatient(2026, 1, Some(7.0))
        },
        inpatient(2026, 1, None),
    ]);
    let request = AggregateRequest::new(period("2026-01"), Grouping::Department);
    let first = aggregate_frame(&df, &lookups(), &request).unwrap();
    let second = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn reversed_period_is_rejected_before_scanning() {
    let df = fact_frame(&[inpatient(2026, 1, Some(5.0))]);
    let request = AggregateRequest::new(period("2026-03..2026-01"), Grouping::Department);
    assert!(aggregate_frame(&df, &lookups(), &request).is_err());
}

#[test]
fn facility_month_grouping_splits_by_month() {
    let df = fact_frame(&[
        inpatient(2026, 1, Some(5.0)),
        inpatient(2026, 2, Some(7.0)),
        inpatient(2026, 2, Some(9.0)),
    ]);
    let request = AggregateRequest::new(period("2026-01..2026-12"), Grouping::FacilityMonth);
    let out = aggregate_frame(&df, &lookups(), &request).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].key.month, Some(1));
    assert_eq!(out[1].key.month, Some(2));
    assert_eq!(out[1].totals.count(), 2);
    assert_eq!(out[1].key.ten_cskcb.as_deref(), Some("TTYT"));
}

#[test]
fn discovery_lists_sorted_unique_months() {
    let df = fact_frame(&[
        inpatient(2026, 2, None),
        inpatient(2025, 12, None),
        inpatient(2026, 2, None),
    ]);
    let months = distinct_year_months(&df).unwrap();
    assert_eq!(
        months,
        vec![YearMonth::new(2025, 12), YearMonth::new(2026, 2)]
    );
}

#[test]
fn department_discovery_respects_ranges_and_category() {
    let df = fact_frame(&[
        inpatient(2026, 1, None),
        Row {
            ma_loaikcb: Some(1),
            ..inpatient(2026, 1, None)
        },
        inpatient(2026, 6, None),
    ]);
    let periods = [period("2026-01")];
    let all = distinct_departments(&df, &lookups(), &periods, None).unwrap();
    assert_eq!(all, vec!["Khám bệnh (TTYT)", "Nội tổng hợp"]);
    let inpatient_only =
        distinct_departments(&df, &lookups(), &periods, Some("Nội trú")).unwrap();
    assert_eq!(inpatient_only, vec!["Nội tổng hợp"]);
}
