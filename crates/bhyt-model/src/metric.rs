//! Report metrics and display columns.
//!
//! The department comparison renders three families of columns: raw metrics
//! (the visit count plus twelve summed fields), per-visit averages, and two
//! ratio metrics. Profiles select and reorder these by `metric_key`.

use serde::{Deserialize, Serialize};

use crate::visit::col;

/// A summed fact-table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueField {
    SoNgayDtri,
    TongChi,
    XetNghiem,
    Cdha,
    Thuoc,
    Mau,
    Pttt,
    Vtyt,
    TienKham,
    TienGiuong,
    Bhtt,
    Bntt,
}

impl ValueField {
    pub const ALL: [ValueField; 12] = [
        Self::SoNgayDtri,
        Self::TongChi,
        Self::XetNghiem,
        Self::Cdha,
        Self::Thuoc,
        Self::Mau,
        Self::Pttt,
        Self::Vtyt,
        Self::TienKham,
        Self::TienGiuong,
        Self::Bhtt,
        Self::Bntt,
    ];

    /// Position in [`Self::ALL`], used for dense per-field accumulators.
    pub fn index(self) -> usize {
        match self {
            Self::SoNgayDtri => 0,
            Self::TongChi => 1,
            Self::XetNghiem => 2,
            Self::Cdha => 3,
            Self::Thuoc => 4,
            Self::Mau => 5,
            Self::Pttt => 6,
            Self::Vtyt => 7,
            Self::TienKham => 8,
            Self::TienGiuong => 9,
            Self::Bhtt => 10,
            Self::Bntt => 11,
        }
    }

    /// Warehouse column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::SoNgayDtri => col::SO_NGAY_DTRI,
            Self::TongChi => col::T_TONGCHI,
            Self::XetNghiem => col::T_XN,
            Self::Cdha => col::T_CDHA,
            Self::Thuoc => col::T_THUOC,
            Self::Mau => col::T_MAU,
            Self::Pttt => col::T_PTTT,
            Self::Vtyt => col::T_VTYT,
            Self::TienKham => col::T_KHAM,
            Self::TienGiuong => col::T_GIUONG,
            Self::Bhtt => col::T_BHTT,
            Self::Bntt => col::T_BNTT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SoNgayDtri => "Số ngày điều trị",
            Self::TongChi => "Tổng chi",
            Self::XetNghiem => "Xét nghiệm",
            Self::Cdha => "CĐHA",
            Self::Thuoc => "Thuốc",
            Self::Mau => "Máu",
            Self::Pttt => "PTTT",
            Self::Vtyt => "VTYT",
            Self::TienKham => "Tiền khám",
            Self::TienGiuong => "Tiền giường",
            Self::Bhtt => "Tiền BHTT",
            Self::Bntt => "Tiền BNTT",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.column() == name)
    }

    /// Treatment days only exist for inpatient stays.
    pub fn inpatient_only(self) -> bool {
        matches!(self, Self::SoNgayDtri)
    }
}

/// Divisor of a ratio metric: the visit count or another summed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denominator {
    Visits,
    Field(ValueField),
}

/// Display shape of a ratio metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioFormat {
    /// Multiply by 100, one decimal, `%` suffix.
    Percent,
    /// Plain one-decimal number.
    Decimal,
}

/// What a display column computes from a group's aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// The matching-record count (`so_luot`).
    Count,
    /// A summed field.
    Sum(ValueField),
    /// `sum / count`, blank when either is zero.
    PerVisit(ValueField),
    /// `numerator / denominator`, blank when either is zero.
    Ratio {
        numerator: ValueField,
        denominator: Denominator,
        format: RatioFormat,
    },
}

/// One display column of the department comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Stable key used by profiles (`so_luot`, `t_thuoc`, `bq_t_thuoc`,
    /// `ngay_dttb`, ...).
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    /// Only meaningful for inpatient rows; flagged `(NT)` in headers.
    pub inpatient_only: bool,
}

impl ColumnSpec {
    fn count() -> Self {
        Self {
            key: "so_luot".to_string(),
            label: "Số lượt KCB".to_string(),
            kind: ColumnKind::Count,
            inpatient_only: false,
        }
    }

    fn sum(field: ValueField) -> Self {
        Self {
            key: field.column().to_string(),
            label: field.label().to_string(),
            kind: ColumnKind::Sum(field),
            inpatient_only: field.inpatient_only(),
        }
    }

    fn per_visit(field: ValueField) -> Self {
        Self {
            key: format!("bq_{}", field.column()),
            label: format!("BQ {}", field.label()),
            kind: ColumnKind::PerVisit(field),
            inpatient_only: field.inpatient_only(),
        }
    }
}

/// The built-in column set in default order: raw metrics, then per-visit
/// averages (every cost field except treatment days), then the two ratios.
pub fn default_columns() -> Vec<ColumnSpec> {
    let mut columns = Vec::new();
    columns.push(ColumnSpec::count());
    columns.extend(ValueField::ALL.iter().copied().map(ColumnSpec::sum));
    columns.extend(
        ValueField::ALL
            .iter()
            .copied()
            .filter(|field| *field != ValueField::SoNgayDtri)
            .map(ColumnSpec::per_visit),
    );
    columns.push(ColumnSpec {
        key: "ngay_dttb".to_string(),
        label: "Ngày ĐTTB".to_string(),
        kind: ColumnKind::Ratio {
            numerator: ValueField::SoNgayDtri,
            denominator: Denominator::Visits,
            format: RatioFormat::Decimal,
        },
        inpatient_only: true,
    });
    columns.push(ColumnSpec {
        key: "tl_thuoc_tongchi".to_string(),
        label: "Tỷ lệ thuốc/tổng chi".to_string(),
        kind: ColumnKind::Ratio {
            numerator: ValueField::Thuoc,
            denominator: Denominator::Field(ValueField::TongChi),
            format: RatioFormat::Percent,
        },
        inpatient_only: false,
    });
    columns
}

/// Resolves a profile `metric_key` to its column definition.
pub fn column_for_key(key: &str) -> Option<ColumnSpec> {
    default_columns().into_iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_cover_all_families() {
        let columns = default_columns();
        // count + 12 sums + 11 averages + 2 ratios
        assert_eq!(columns.len(), 26);
        assert_eq!(columns[0].kind, ColumnKind::Count);
        assert!(columns.iter().any(|c| c.key == "bq_t_tongchi"));
        assert!(columns.iter().any(|c| c.key == "ngay_dttb"));
        assert!(!columns.iter().any(|c| c.key == "bq_so_ngay_dtri"));
    }

    #[test]
    fn keys_resolve_back_to_specs() {
        let spec = column_for_key("tl_thuoc_tongchi").unwrap();
        assert_eq!(
            spec.kind,
            ColumnKind::Ratio {
                numerator: ValueField::Thuoc,
                denominator: Denominator::Field(ValueField::TongChi),
                format: RatioFormat::Percent,
            }
        );
        assert!(column_for_key("nope").is_none());
    }

    #[test]
    fn treatment_days_is_inpatient_only() {
        let spec = column_for_key("so_ngay_dtri").unwrap();
        assert!(spec.inpatient_only);
        assert!(!column_for_key("t_tongchi").unwrap().inpatient_only);
    }
}
