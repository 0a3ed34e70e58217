//! Fact-table schema.
//!
//! One row per visit/admission, imported from monthly settlement extracts.
//! The warehouse frame stores date-like values canonically as text
//! (`YYYY-MM-DD` dates, `YYYY-MM-DD HH:MM:SS` timestamps); numeric columns
//! are Int/Float. Rows are never updated in place — corrections are
//! delete-old/insert-new.

use serde::{Deserialize, Serialize};

/// Storage type of a fact-table column. `Date`/`DateTime` columns are held
/// as canonical text in the frame; the distinction drives extract parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Str,
    Date,
    DateTime,
}

impl ColumnType {
    /// Whether the column is held as a text column in the warehouse frame.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Str | Self::Date | Self::DateTime)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn column(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty }
}

/// Fact-table columns in warehouse order, including the import metadata
/// columns appended by the loader.
pub const VISIT_COLUMNS: &[ColumnDef] = &[
    column(col::STT, ColumnType::Int),
    column(col::MA_BN, ColumnType::Str),
    column(col::HO_TEN, ColumnType::Str),
    column(col::NGAY_SINH, ColumnType::Date),
    column(col::GIOI_TINH, ColumnType::Int),
    column(col::DIA_CHI, ColumnType::Str),
    column(col::MA_THE, ColumnType::Str),
    column(col::MA_DKBD, ColumnType::Str),
    column(col::GT_THE_TU, ColumnType::Date),
    column(col::GT_THE_DEN, ColumnType::Date),
    column(col::MA_BENH, ColumnType::Str),
    column(col::MA_BENHKHAC, ColumnType::Str),
    column(col::MA_LYDO_VVIEN, ColumnType::Int),
    column(col::MA_NOI_CHUYEN, ColumnType::Str),
    column(col::NGAY_VAO, ColumnType::DateTime),
    column(col::NGAY_RA, ColumnType::DateTime),
    column(col::SO_NGAY_DTRI, ColumnType::Int),
    column(col::KET_QUA_DTRI, ColumnType::Int),
    column(col::TINH_TRANG_RV, ColumnType::Int),
    column(col::T_TONGCHI, ColumnType::Float),
    column(col::T_XN, ColumnType::Float),
    column(col::T_CDHA, ColumnType::Float),
    column(col::T_THUOC, ColumnType::Float),
    column(col::T_MAU, ColumnType::Float),
    column(col::T_PTTT, ColumnType::Float),
    column(col::T_VTYT, ColumnType::Float),
    column(col::T_DVKT_TYLE, ColumnType::Float),
    column(col::T_THUOC_TYLE, ColumnType::Float),
    column(col::T_VTYT_TYLE, ColumnType::Float),
    column(col::T_KHAM, ColumnType::Float),
    column(col::T_GIUONG, ColumnType::Float),
    column(col::T_VCHUYEN, ColumnType::Float),
    column(col::T_BNTT, ColumnType::Float),
    column(col::T_BHTT, ColumnType::Float),
    column(col::T_NGOAIDS, ColumnType::Float),
    column(col::MA_KHOA, ColumnType::Str),
    column(col::NAM_QT, ColumnType::Int),
    column(col::THANG_QT, ColumnType::Int),
    column(col::MA_KHUVUC, ColumnType::Str),
    column(col::MA_LOAIKCB, ColumnType::Int),
    column(col::MA_CSKCB, ColumnType::Str),
    column(col::NOI_TTOAN, ColumnType::Int),
    column(col::GIAM_DINH, ColumnType::Str),
    column(col::T_XUATTOAN, ColumnType::Float),
    column(col::T_NGUONKHAC, ColumnType::Float),
    column(col::T_DATUYEN, ColumnType::Float),
    column(col::T_VUOTTRAN, ColumnType::Float),
    column(col::UPLOAD_TIMESTAMP, ColumnType::Str),
    column(col::SOURCE_FILE, ColumnType::Str),
];

pub fn column_def(name: &str) -> Option<ColumnDef> {
    VISIT_COLUMNS.iter().copied().find(|def| def.name == name)
}

/// Column name constants.
pub mod col {
    pub const STT: &str = "stt";
    pub const MA_BN: &str = "ma_bn";
    pub const HO_TEN: &str = "ho_ten";
    pub const NGAY_SINH: &str = "ngay_sinh";
    pub const GIOI_TINH: &str = "gioi_tinh";
    pub const DIA_CHI: &str = "dia_chi";
    pub const MA_THE: &str = "ma_the";
    pub const MA_DKBD: &str = "ma_dkbd";
    pub const GT_THE_TU: &str = "gt_the_tu";
    pub const GT_THE_DEN: &str = "gt_the_den";
    pub const MA_BENH: &str = "ma_benh";
    pub const MA_BENHKHAC: &str = "ma_benhkhac";
    pub const MA_LYDO_VVIEN: &str = "ma_lydo_vvien";
    pub const MA_NOI_CHUYEN: &str = "ma_noi_chuyen";
    pub const NGAY_VAO: &str = "ngay_vao";
    pub const NGAY_RA: &str = "ngay_ra";
    pub const SO_NGAY_DTRI: &str = "so_ngay_dtri";
    pub const KET_QUA_DTRI: &str = "ket_qua_dtri";
    pub const TINH_TRANG_RV: &str = "tinh_trang_rv";
    pub const T_TONGCHI: &str = "t_tongchi";
    pub const T_XN: &str = "t_xn";
    pub const T_CDHA: &str = "t_cdha";
    pub const T_THUOC: &str = "t_thuoc";
    pub const T_MAU: &str = "t_mau";
    pub const T_PTTT: &str = "t_pttt";
    pub const T_VTYT: &str = "t_vtyt";
    pub const T_DVKT_TYLE: &str = "t_dvkt_tyle";
    pub const T_THUOC_TYLE: &str = "t_thuoc_tyle";
    pub const T_VTYT_TYLE: &str = "t_vtyt_tyle";
    pub const T_KHAM: &str = "t_kham";
    pub const T_GIUONG: &str = "t_giuong";
    pub const T_VCHUYEN: &str = "t_vchuyen";
    pub const T_BNTT: &str = "t_bntt";
    pub const T_BHTT: &str = "t_bhtt";
    pub const T_NGOAIDS: &str = "t_ngoaids";
    pub const MA_KHOA: &str = "ma_khoa";
    pub const NAM_QT: &str = "nam_qt";
    pub const THANG_QT: &str = "thang_qt";
    pub const MA_KHUVUC: &str = "ma_khuvuc";
    pub const MA_LOAIKCB: &str = "ma_loaikcb";
    pub const MA_CSKCB: &str = "ma_cskcb";
    pub const NOI_TTOAN: &str = "noi_ttoan";
    pub const GIAM_DINH: &str = "giam_dinh";
    pub const T_XUATTOAN: &str = "t_xuattoan";
    pub const T_NGUONKHAC: &str = "t_nguonkhac";
    pub const T_DATUYEN: &str = "t_datuyen";
    pub const T_VUOTTRAN: &str = "t_vuottran";
    pub const UPLOAD_TIMESTAMP: &str = "upload_timestamp";
    pub const SOURCE_FILE: &str = "source_file";
}

/// Composite uniqueness key of one treatment episode. Any insert that would
/// duplicate an existing key must be flagged before commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitKey {
    pub ma_cskcb: Option<String>,
    pub ma_bn: Option<String>,
    pub ma_loaikcb: Option<i64>,
    /// Canonical `YYYY-MM-DD HH:MM:SS` admission timestamp.
    pub ngay_vao: Option<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS` discharge timestamp.
    pub ngay_ra: Option<String>,
}

/// Key columns in warehouse order.
pub const KEY_COLUMNS: [&str; 5] = [
    col::MA_CSKCB,
    col::MA_BN,
    col::MA_LOAIKCB,
    col::NGAY_VAO,
    col::NGAY_RA,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_key_columns() {
        for name in KEY_COLUMNS {
            assert!(column_def(name).is_some(), "missing key column {name}");
        }
    }

    #[test]
    fn registry_has_no_duplicate_names() {
        let mut names: Vec<&str> = VISIT_COLUMNS.iter().map(|def| def.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
