//! Directory warehouse round-trips and cache invalidation.

use std::path::PathBuf;

use bhyt_model::lookup::{DepartmentRow, FacilityRow, LookupSet, Validity, VisitTypeRow};
use bhyt_model::metric::ValueField;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::profile::ProfileRow;
use bhyt_model::query::{AggregateRequest, Grouping};
use bhyt_model::record::{CellValue, VisitRecord};
use bhyt_model::visit::col;
use bhyt_store::{DirWarehouse, Warehouse};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "bhyt-store-test-{tag}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const OPEN: Validity = Validity {
    valid_from: Some(20_250_101),
    valid_to: None,
};

fn lookups() -> LookupSet {
    LookupSet {
        visit_types: vec![VisitTypeRow {
            ma_loaikcb: Some(3),
            ml2: Some("Nội trú".to_string()),
            ml4: None,
            validity: OPEN,
        }],
        facilities: vec![FacilityRow {
            ma_cskcb: Some("96023".to_string()),
            ten_cskcb: Some("TTYT".to_string()),
            validity: OPEN,
        }],
        departments: vec![DepartmentRow {
            ma_cskcb: Some("96023".to_string()),
            makhoa_xml: Some("K02".to_string()),
            short_name: Some("Nội tổng hợp".to_string()),
            thu_tu: Some(1),
            validity: OPEN,
        ..DepartmentRow::default()
        }],
    }
}

fn record(ma_bn: &str, month: u32, tongchi: f64) -> VisitRecord {
    let mut row = VisitRecord::new();
    row.set(col::MA_BN, CellValue::Text(ma_bn.to_string()));
    row.set(col::MA_CSKCB, CellValue::Text("96023".to_string()));
    row.set(col::MA_KHOA, CellValue::Text("K02".to_string()));
    row.set(col::MA_LOAIKCB, CellValue::Int(3));
    row.set(col::MA_BENH, CellValue::Text("J18.9".to_string()));
    row.set(col::NAM_QT, CellValue::Int(2026));
    row.set(col::THANG_QT, CellValue::Int(i64::from(month)));
    row.set(col::NGAY_VAO, CellValue::Text("2026-01-02 07:35:00".to_string()));
    row.set(col::NGAY_RA, CellValue::Text("2026-01-05 10:00:00".to_string()));
    row.set(col::T_TONGCHI, CellValue::Float(tongchi));
    row
}

fn dept_request(spec: &str) -> AggregateRequest {
    AggregateRequest::new(spec.parse::<Period>().unwrap(), Grouping::Department)
}

#[test]
fn appended_rows_survive_reopen() {
    let dir = temp_dir("reopen");
    {
        let store = DirWarehouse::open(&dir).unwrap();
        store.replace_lookups(&lookups()).unwrap();
        store
            .append(&[record("BN01", 1, 100.0), record("BN02", 2, 200.0)])
            .unwrap();
    }
    let store = DirWarehouse::open(&dir).unwrap();
    assert_eq!(store.row_count().unwrap(), 2);
    assert_eq!(
        store.distinct_year_months().unwrap(),
        vec![YearMonth::new(2026, 1), YearMonth::new(2026, 2)]
    );
    let rows = store.aggregate(&dept_request("2026-01..2026-12")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].totals.count(), 2);
    assert_eq!(rows[0].totals.get(ValueField::TongChi), 300.0);
}

#[test]
fn empty_result_is_no_data_not_an_error() {
    let dir = temp_dir("empty");
    let store = DirWarehouse::open(&dir).unwrap();
    let rows = store.aggregate(&dept_request("2026-01")).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn writes_invalidate_cached_aggregates() {
    let dir = temp_dir("cache");
    let store = DirWarehouse::open(&dir).unwrap();
    store.replace_lookups(&lookups()).unwrap();
    store.append(&[record("BN01", 1, 100.0)]).unwrap();

    let request = dept_request("2026-01");
    let before = store.aggregate(&request).unwrap();
    assert_eq!(before[0].totals.count(), 1);

    // Second read comes from cache; the next write must drop it.
    assert_eq!(store.aggregate(&request).unwrap(), before);
    store.append(&[record("BN02", 1, 50.0)]).unwrap();
    let after = store.aggregate(&request).unwrap();
    assert_eq!(after[0].totals.count(), 2);
    assert_eq!(after[0].totals.get(ValueField::TongChi), 150.0);
}

#[test]
fn lookup_save_invalidates_cached_aggregates() {
    let dir = temp_dir("lookup-invalidate");
    let store = DirWarehouse::open(&dir).unwrap();
    store.replace_lookups(&lookups()).unwrap();
    store.append(&[record("BN01", 1, 100.0)]).unwrap();
    let request = dept_request("2026-01");
    assert_eq!(store.aggregate(&request).unwrap().len(), 1);

    // Renaming the department must show up immediately after the save.
    let mut changed = lookups();
    changed.departments[0].short_name = Some("Khoa Nội".to_string());
    store.replace_lookups(&changed).unwrap();
    let rows = store.aggregate(&request).unwrap();
    assert_eq!(rows[0].key.khoa.as_deref(), Some("Khoa Nội"));
}

#[test]
fn existing_keys_and_delete_by_key() {
    let dir = temp_dir("keys");
    let store = DirWarehouse::open(&dir).unwrap();
    store.replace_lookups(&lookups()).unwrap();
    let first = record("BN01", 1, 100.0);
    let second = record("BN02", 1, 200.0);
    store.append(std::slice::from_ref(&first)).unwrap();
    store.append(std::slice::from_ref(&second)).unwrap();

    let missing = record("BN09", 1, 1.0);
    let found = store
        .existing_keys(&[first.key(), missing.key()])
        .unwrap();
    assert_eq!(found, vec![first.key()]);

    assert_eq!(store.delete_keys(&[first.key()]).unwrap(), 1);
    assert_eq!(store.row_count().unwrap(), 1);
    assert!(store.existing_keys(&[first.key()]).unwrap().is_empty());
}

#[test]
fn purge_by_month_and_facility() {
    let dir = temp_dir("purge");
    let store = DirWarehouse::open(&dir).unwrap();
    store
        .append(&[
            record("BN01", 1, 100.0),
            record("BN02", 1, 200.0),
            record("BN03", 2, 300.0),
        ])
        .unwrap();
    assert_eq!(
        store.purge(YearMonth::new(2026, 1), Some("99999")).unwrap(),
        0
    );
    assert_eq!(store.purge(YearMonth::new(2026, 1), None).unwrap(), 2);
    assert_eq!(store.row_count().unwrap(), 1);
}

#[test]
fn profiles_replace_wholesale() {
    let dir = temp_dir("profiles");
    let store = DirWarehouse::open(&dir).unwrap();
    assert!(store.profiles().unwrap().is_empty());
    let first = vec![
        ProfileRow {
            profile_name: "gọn".to_string(),
            metric_key: "so_luot".to_string(),
            thu_tu: 1,
            visible: true,
        },
        ProfileRow {
            profile_name: "gọn".to_string(),
            metric_key: "t_tongchi".to_string(),
            thu_tu: 2,
            visible: true,
        },
    ];
    store.replace_profiles(&first).unwrap();
    assert_eq!(store.profiles().unwrap(), first);

    let second = vec![ProfileRow {
        profile_name: "khác".to_string(),
        metric_key: "t_thuoc".to_string(),
        thu_tu: 1,
        visible: false,
    }];
    store.replace_profiles(&second).unwrap();
    // Full replacement: nothing of the first save remains.
    assert_eq!(store.profiles().unwrap(), second);
}

#[test]
fn lookups_round_trip_through_csv() {
    let dir = temp_dir("lookups");
    let store = DirWarehouse::open(&dir).unwrap();
    store.replace_lookups(&lookups()).unwrap();
    let loaded = store.lookups().unwrap();
    assert_eq!(loaded, lookups());
}
