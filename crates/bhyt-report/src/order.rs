//! Department display ordering.
//!
//! The department registry carries a `thu_tu` rank. Ranked labels sort by
//! rank, everything else sorts after them alphabetically. The map covers
//! both plain registry short names and the derived consultation labels
//! `Khám bệnh (<facility>)`, whose rank comes from the facility's `K01`
//! registry rows; the literal `Điều trị ngoại trú` label has no rank and
//! lands in the alphabetical tail.

use std::collections::BTreeMap;

use bhyt_model::KHAM_BENH_PREFIX;
use bhyt_model::lookup::LookupSet;

const CONSULTATION_CODE: &str = "K01";

/// Builds the label -> rank map (lowest rank wins on duplicates).
pub fn department_order(lookups: &LookupSet) -> BTreeMap<String, i64> {
    let mut order: BTreeMap<String, i64> = BTreeMap::new();
    let mut insert_min = |name: String, rank: i64| {
        order
            .entry(name)
            .and_modify(|existing| *existing = (*existing).min(rank))
            .or_insert(rank);
    };
    for row in &lookups.departments {
        let Some(rank) = row.thu_tu else {
            continue;
        };
        if let Some(short_name) = &row.short_name {
            insert_min(short_name.clone(), rank);
        }
        if row.makhoa_xml.as_deref() == Some(CONSULTATION_CODE) {
            let facility_name = row
                .ma_cskcb
                .as_deref()
                .and_then(|code| {
                    lookups
                        .facilities
                        .iter()
                        .find(|f| f.ma_cskcb.as_deref() == Some(code))
                })
                .and_then(|f| f.ten_cskcb.clone())
                .unwrap_or_default();
            insert_min(format!("{KHAM_BENH_PREFIX} ({facility_name})"), rank);
        }
    }
    order
}

/// Sort key: ranked labels first by rank, then unranked alphabetically.
pub fn department_sort_key<'a>(
    order: &BTreeMap<String, i64>,
    label: &'a str,
) -> (u8, i64, &'a str) {
    match order.get(label) {
        Some(rank) => (0, *rank, label),
        None => (1, 0, label),
    }
}
