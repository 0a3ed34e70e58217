//! Column-display profiles.
//!
//! A profile is a named, ordered subset of the department-report columns,
//! persisted as (profile name, metric key, rank, visibility) rows with
//! full-replace-on-save semantics — there is never partial profile state.

use serde::{Deserialize, Serialize};

use crate::metric::{ColumnSpec, column_for_key, default_columns};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub profile_name: String,
    pub metric_key: String,
    /// Display order within the profile.
    pub thu_tu: i64,
    pub visible: bool,
}

/// Distinct profile names, sorted.
pub fn profile_names(rows: &[ProfileRow]) -> Vec<String> {
    let mut names: Vec<String> = rows.iter().map(|row| row.profile_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Resolves the active column list for a profile.
///
/// `None` (or a profile with no rows) means the full built-in set in default
/// order. Hidden rows and unknown metric keys are dropped silently.
pub fn resolve_columns(rows: &[ProfileRow], profile: Option<&str>) -> Vec<ColumnSpec> {
    let Some(name) = profile else {
        return default_columns();
    };
    let mut selected: Vec<&ProfileRow> = rows
        .iter()
        .filter(|row| row.profile_name == name)
        .collect();
    if selected.is_empty() {
        return default_columns();
    }
    selected.sort_by_key(|row| row.thu_tu);
    selected
        .into_iter()
        .filter(|row| row.visible)
        .filter_map(|row| column_for_key(&row.metric_key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(profile: &str, key: &str, thu_tu: i64, visible: bool) -> ProfileRow {
        ProfileRow {
            profile_name: profile.to_string(),
            metric_key: key.to_string(),
            thu_tu,
            visible,
        }
    }

    #[test]
    fn no_profile_means_full_default_set() {
        assert_eq!(resolve_columns(&[], None), default_columns());
    }

    #[test]
    fn unknown_profile_falls_back_to_default() {
        let rows = vec![row("giám đốc", "so_luot", 1, true)];
        assert_eq!(resolve_columns(&rows, Some("khác")), default_columns());
    }

    #[test]
    fn profile_orders_by_rank_and_drops_hidden() {
        let rows = vec![
            row("gọn", "t_tongchi", 2, true),
            row("gọn", "so_luot", 1, true),
            row("gọn", "t_thuoc", 3, false),
            row("gọn", "bq_t_tongchi", 4, true),
        ];
        let columns = resolve_columns(&rows, Some("gọn"));
        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["so_luot", "t_tongchi", "bq_t_tongchi"]);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let rows = vec![
            row("p", "so_luot", 1, true),
            row("p", "does_not_exist", 2, true),
        ];
        let columns = resolve_columns(&rows, Some("p"));
        assert_eq!(columns.len(), 1);
    }
}
