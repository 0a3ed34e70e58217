//! Command orchestration: open the warehouse, run the queries, render.
//!
//! Each subcommand is one synchronous pass. A report that finds no rows
//! prints an explicit empty-state message and exits cleanly; invalid
//! periods are skipped with a warning so the remaining periods still
//! render; store failures surface as errors for that command alone.

use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{debug, info, info_span, warn};

use bhyt_ingest::{DuplicatePolicy, ImportOptions, ImportOutcome, import_records, read_extract};
use bhyt_model::lookup::LookupSet;
use bhyt_model::metric::column_for_key;
use bhyt_model::period::{Period, YearMonth};
use bhyt_model::profile::{ProfileRow, profile_names, resolve_columns};
use bhyt_model::query::{AggregateRequest, Grouping};
use bhyt_model::{ML2_INPATIENT, ML2_OUTPATIENT};
use bhyt_report::department::{DepartmentOptions, department_table};
use bhyt_report::export::export_csv;
use bhyt_report::format::group_rounded;
use bhyt_report::hospital::{HospitalOptions, hospital_table};
use bhyt_report::icd::{
    DiffDirection, IcdDiffMetric, IcdOptions, ShareMetric, cumulative_head, icd_table,
};
use bhyt_report::order::department_order;
use bhyt_report::overview::{OverviewMetric, overview_table};
use bhyt_report::table::{PeriodSeries, ReportTable};
use bhyt_store::{
    DirWarehouse, Warehouse, load_department_table, load_facility_table, load_visit_type_table,
};

use crate::cli::{
    DepartmentsArgs, DeptArgs, DuplicateArg, HospitalArgs, IcdArgs, IcdDiffArg, ImportArgs,
    LookupCommand, LookupTableArg, OverviewArgs, OverviewMetricArg, ProfileCommand, PurgeArgs,
    ReportCommand, ScopeArg, ShareMetricArg,
};
use crate::logging::redact_value;
use crate::render::{apply_table_style, print_periods, print_report};

const NO_DATA: &str = "Không có dữ liệu trong các kỳ đã chọn.";

fn open_store(data_dir: &Path) -> Result<DirWarehouse> {
    DirWarehouse::open(data_dir)
        .with_context(|| format!("open warehouse {}", data_dir.display()))
}

pub fn run_periods(data_dir: &Path) -> Result<()> {
    let store = open_store(data_dir)?;
    let months = store.distinct_year_months().context("list settlement months")?;
    print_periods(&months);
    Ok(())
}

pub fn run_departments(data_dir: &Path, args: &DepartmentsArgs) -> Result<()> {
    let store = open_store(data_dir)?;
    let periods = collect_periods(&args.periods.periods)?;
    let labels = store
        .distinct_departments(&periods, scope_ml2(args.scope))
        .context("list departments")?;
    if labels.is_empty() {
        println!("{NO_DATA}");
        return Ok(());
    }
    for label in labels {
        println!("{label}");
    }
    Ok(())
}

pub fn run_report(data_dir: &Path, report: &ReportCommand) -> Result<()> {
    let store = open_store(data_dir)?;
    match report {
        ReportCommand::Dept(args) => run_dept(&store, args),
        ReportCommand::Hospital(args) => run_hospital(&store, args),
        ReportCommand::Icd(args) => run_icd(&store, args),
        ReportCommand::Overview(args) => run_overview(&store, args),
    }
}

fn run_dept(store: &dyn Warehouse, args: &DeptArgs) -> Result<()> {
    let span = info_span!("report", kind = "dept");
    let _guard = span.enter();
    let periods = collect_periods(&args.periods.periods)?;
    let profiles = store.profiles()?;
    if let Some(name) = args.profile.as_deref() {
        if !profile_names(&profiles).iter().any(|known| known.as_str() == name) {
            warn!(profile = %name, "unknown profile, using the default column set");
        }
    }
    let columns = resolve_columns(&profiles, args.profile.as_deref());
    let order = department_order(&store.lookups()?);
    let series = fetch_series(store, &periods, Grouping::Department, None, None)?;
    if series.iter().all(PeriodSeries::is_empty) {
        println!("{NO_DATA}");
        return Ok(());
    }
    let table = department_table(
        &series,
        &columns,
        &order,
        DepartmentOptions {
            show_diff: args.diff,
            show_pct_change: args.pct_change,
        },
    );
    print_report(&table);
    maybe_export(&table, args.export.as_deref())
}

fn run_hospital(store: &dyn Warehouse, args: &HospitalArgs) -> Result<()> {
    let span = info_span!("report", kind = "hospital");
    let _guard = span.enter();
    let periods = collect_periods(&args.periods.periods)?;
    let series = fetch_series(store, &periods, Grouping::VisitType, None, None)?;
    if series.iter().all(PeriodSeries::is_empty) {
        println!("{NO_DATA}");
        return Ok(());
    }
    let table = hospital_table(
        &series,
        HospitalOptions {
            show_diff: args.diff,
            show_pct_change: args.pct_change,
        },
    );
    print_report(&table);
    maybe_export(&table, args.export.as_deref())
}

fn run_icd(store: &dyn Warehouse, args: &IcdArgs) -> Result<()> {
    let span = info_span!("report", kind = "icd");
    let _guard = span.enter();
    let periods = collect_periods(&args.periods.periods)?;
    if args.anchor == 0 || args.anchor > periods.len() {
        bail!(
            "anchor {} is out of range (1..={} selected periods)",
            args.anchor,
            periods.len()
        );
    }
    let ml2 = scope_ml2(args.scope);
    let metric = share_metric(args.share_metric);
    let threshold = args
        .threshold
        .unwrap_or_else(|| ShareMetric::default_threshold_for_scope(ml2));
    let series = fetch_series(
        store,
        &periods,
        Grouping::DiagnosisPrefix,
        ml2,
        args.department.as_deref(),
    )?;
    let anchor = &series[args.anchor - 1];
    if anchor.is_empty() {
        println!("Kỳ gốc {} không có dữ liệu.", anchor.label());
        return Ok(());
    }
    let selection = cumulative_head(&anchor.rows, metric, threshold);
    info!(
        codes = selection.codes.len(),
        total = selection.total_codes,
        cumulative = selection.cumulative,
        "cumulative head selected"
    );
    let table = icd_table(
        &series,
        &selection,
        metric,
        IcdOptions {
            diff: args.diff_by.map(icd_diff_metric),
            direction: if args.reverse {
                DiffDirection::Reverse
            } else {
                DiffDirection::Forward
            },
        },
    );
    println!(
        "Ngưỡng {threshold:.0}%: {}/{} mã bệnh, cộng dồn {:.1}% (kỳ gốc {})",
        selection.codes.len(),
        selection.total_codes,
        selection.cumulative,
        anchor.label()
    );
    print_report(&table);
    maybe_export(&table, args.export.as_deref())
}

fn run_overview(store: &dyn Warehouse, args: &OverviewArgs) -> Result<()> {
    let span = info_span!("report", kind = "overview");
    let _guard = span.enter();
    let period = Period::new(YearMonth::new(args.year, 1), YearMonth::new(args.year, 12));
    let rows = store
        .aggregate(&AggregateRequest::new(period, Grouping::FacilityMonth))
        .with_context(|| format!("aggregate year {}", args.year))?;
    if rows.is_empty() {
        println!("Không có dữ liệu cho năm {}.", args.year);
        return Ok(());
    }
    let metric = match args.metric {
        OverviewMetricArg::Visits => OverviewMetric::Visits,
        OverviewMetricArg::Cost => OverviewMetric::TotalCost,
    };
    let table = overview_table(args.year, &rows, metric);
    print_report(&table);
    maybe_export(&table, args.export.as_deref())
}

pub fn run_import(data_dir: &Path, args: &ImportArgs) -> Result<()> {
    let span = info_span!("import", file = %args.file.display());
    let _guard = span.enter();
    let store = open_store(data_dir)?;
    let records = read_extract(&args.file)?;
    if records.is_empty() {
        println!("extract has no rows");
        return Ok(());
    }
    let outcome = import_records(
        &store,
        records,
        ImportOptions {
            policy: match args.on_duplicate {
                DuplicateArg::Skip => DuplicatePolicy::Skip,
                DuplicateArg::Allow => DuplicatePolicy::Allow,
                DuplicateArg::Replace => DuplicatePolicy::Replace,
            },
            dry_run: args.dry_run,
        },
    )?;
    for key in &outcome.duplicate_keys {
        debug!(
            ma_bn = redact_value(key.ma_bn.as_deref().unwrap_or("")),
            ngay_vao = redact_value(key.ngay_vao.as_deref().unwrap_or("")),
            ngay_ra = redact_value(key.ngay_ra.as_deref().unwrap_or("")),
            "duplicate episode key"
        );
    }
    print_import_summary(&outcome);
    Ok(())
}

pub fn run_purge(data_dir: &Path, args: &PurgeArgs) -> Result<()> {
    let store = open_store(data_dir)?;
    let month: YearMonth = args.month.parse()?;
    let removed = store.purge(month, args.facility.as_deref())?;
    println!("removed {removed} rows for {month}");
    Ok(())
}

pub fn run_lookup(data_dir: &Path, lookup: &LookupCommand) -> Result<()> {
    let store = open_store(data_dir)?;
    match lookup {
        LookupCommand::Show { table } => {
            let lookups = store.lookups()?;
            print_lookup_table(&lookups, *table);
            Ok(())
        }
        LookupCommand::Load { table, file } => {
            let mut lookups = store.lookups()?;
            let (name, rows) = match table {
                LookupTableArg::Loaikcb => {
                    lookups.visit_types = load_visit_type_table(file)?;
                    ("lookup_loaikcb", lookups.visit_types.len())
                }
                LookupTableArg::Cskcb => {
                    lookups.facilities = load_facility_table(file)?;
                    ("lookup_cskcb", lookups.facilities.len())
                }
                LookupTableArg::Khoa => {
                    lookups.departments = load_department_table(file)?;
                    ("lookup_khoa", lookups.departments.len())
                }
            };
            store.replace_lookups(&lookups)?;
            println!("replaced {name} with {rows} rows");
            Ok(())
        }
    }
}

pub fn run_profile(data_dir: &Path, profile: &ProfileCommand) -> Result<()> {
    let store = open_store(data_dir)?;
    match profile {
        ProfileCommand::List => {
            let names = profile_names(&store.profiles()?);
            if names.is_empty() {
                println!("no profiles configured");
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        ProfileCommand::Show { name } => {
            let mut rows: Vec<ProfileRow> = store
                .profiles()?
                .into_iter()
                .filter(|row| &row.profile_name == name)
                .collect();
            if rows.is_empty() {
                bail!("no such profile '{name}'");
            }
            rows.sort_by_key(|row| row.thu_tu);
            let mut table = Table::new();
            table.set_header(vec!["Thứ tự", "Metric", "Hiện"]);
            apply_table_style(&mut table);
            for row in rows {
                table.add_row(vec![
                    row.thu_tu.to_string(),
                    row.metric_key,
                    if row.visible { "x" } else { "" }.to_string(),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        ProfileCommand::Save { name, columns } => {
            if columns.is_empty() {
                bail!("a profile needs at least one metric key");
            }
            let mut rows: Vec<ProfileRow> = store
                .profiles()?
                .into_iter()
                .filter(|row| &row.profile_name != name)
                .collect();
            for (idx, key) in columns.iter().enumerate() {
                if column_for_key(key).is_none() {
                    bail!("unknown metric key '{key}'");
                }
                rows.push(ProfileRow {
                    profile_name: name.clone(),
                    metric_key: key.clone(),
                    thu_tu: idx as i64 + 1,
                    visible: true,
                });
            }
            store.replace_profiles(&rows)?;
            println!("saved profile '{name}' with {} columns", columns.len());
            Ok(())
        }
        ProfileCommand::Delete { name } => {
            let rows = store.profiles()?;
            let kept: Vec<ProfileRow> = rows
                .iter()
                .filter(|row| &row.profile_name != name)
                .cloned()
                .collect();
            if kept.len() == rows.len() {
                bail!("no such profile '{name}'");
            }
            store.replace_profiles(&kept)?;
            println!("deleted profile '{name}'");
            Ok(())
        }
    }
}

/// Parses the repeated `--period` values, skipping the unusable ones with a
/// warning so the rest of the comparison still runs.
fn collect_periods(specs: &[String]) -> Result<Vec<Period>> {
    let mut periods = Vec::new();
    for spec in specs {
        match spec.parse::<Period>().and_then(|p| p.validate().map(|()| p)) {
            Ok(period) => periods.push(period),
            Err(error) => warn!(period = %spec, %error, "period skipped"),
        }
    }
    if periods.is_empty() {
        bail!("no usable period was given");
    }
    Ok(periods)
}

/// Runs one aggregation per period, in selection order.
fn fetch_series(
    store: &dyn Warehouse,
    periods: &[Period],
    grouping: Grouping,
    ml2: Option<&str>,
    khoa: Option<&str>,
) -> Result<Vec<PeriodSeries>> {
    periods
        .iter()
        .map(|period| {
            let request = AggregateRequest::new(*period, grouping)
                .with_ml2(ml2.map(str::to_string))
                .with_khoa(khoa.map(str::to_string));
            let rows = store
                .aggregate(&request)
                .with_context(|| format!("aggregate period {period}"))?;
            Ok(PeriodSeries::new(*period, rows))
        })
        .collect()
}

fn maybe_export(table: &ReportTable, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        export_csv(table, path)?;
        println!("exported {}", path.display());
    }
    Ok(())
}

fn scope_ml2(scope: ScopeArg) -> Option<&'static str> {
    match scope {
        ScopeArg::Inpatient => Some(ML2_INPATIENT),
        ScopeArg::Outpatient => Some(ML2_OUTPATIENT),
        ScopeArg::All => None,
    }
}

fn share_metric(arg: ShareMetricArg) -> ShareMetric {
    match arg {
        ShareMetricArg::Visits => ShareMetric::Visits,
        ShareMetricArg::Cost => ShareMetric::TotalCost,
        ShareMetricArg::Insurer => ShareMetric::InsurerCost,
    }
}

fn icd_diff_metric(arg: IcdDiffArg) -> IcdDiffMetric {
    match arg {
        IcdDiffArg::Visits => IcdDiffMetric::Visits,
        IcdDiffArg::Stay => IcdDiffMetric::AverageStay,
        IcdDiffArg::Cost => IcdDiffMetric::CostPerVisit,
        IcdDiffArg::Share => IcdDiffMetric::Share,
    }
}

fn opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_str(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn print_lookup_table(lookups: &LookupSet, which: LookupTableArg) {
    let mut table = Table::new();
    match which {
        LookupTableArg::Loaikcb => {
            table.set_header(vec!["ma_loaikcb", "ml2", "ml4", "valid_from", "valid_to"]);
            apply_table_style(&mut table);
            for row in &lookups.visit_types {
                table.add_row(vec![
                    opt_int(row.ma_loaikcb),
                    opt_str(row.ml2.as_deref()),
                    opt_str(row.ml4.as_deref()),
                    opt_int(row.validity.valid_from),
                    opt_int(row.validity.valid_to),
                ]);
            }
        }
        LookupTableArg::Cskcb => {
            table.set_header(vec!["ma_cskcb", "ten_cskcb", "valid_from", "valid_to"]);
            apply_table_style(&mut table);
            for row in &lookups.facilities {
                table.add_row(vec![
                    opt_str(row.ma_cskcb.as_deref()),
                    opt_str(row.ten_cskcb.as_deref()),
                    opt_int(row.validity.valid_from),
                    opt_int(row.validity.valid_to),
                ]);
            }
        }
        LookupTableArg::Khoa => {
            table.set_header(vec![
                "ma_cskcb",
                "makhoa_xml",
                "ma_gop",
                "full_name",
                "short_name",
                "thu_tu",
                "valid_from",
                "valid_to",
            ]);
            apply_table_style(&mut table);
            for row in &lookups.departments {
                table.add_row(vec![
                    opt_str(row.ma_cskcb.as_deref()),
                    opt_str(row.makhoa_xml.as_deref()),
                    opt_str(row.ma_gop.as_deref()),
                    opt_str(row.full_name.as_deref()),
                    opt_str(row.short_name.as_deref()),
                    opt_int(row.thu_tu),
                    opt_int(row.validity.valid_from),
                    opt_int(row.validity.valid_to),
                ]);
            }
        }
    }
    println!("{table}");
}

fn print_import_summary(outcome: &ImportOutcome) {
    let mut table = Table::new();
    table.set_header(vec!["Năm", "Tháng", "CSKCB", "Số dòng", "Tổng chi"]);
    apply_table_style(&mut table);
    for group in &outcome.summary {
        table.add_row(vec![
            group.nam_qt.map(|v| v.to_string()).unwrap_or_default(),
            group.thang_qt.map(|v| v.to_string()).unwrap_or_default(),
            group.ma_cskcb.clone().unwrap_or_default(),
            group.rows.to_string(),
            group_rounded(group.tongchi),
        ]);
    }
    println!("{table}");
    if outcome.dry_run {
        println!(
            "dry run: {} rows parsed, {} duplicate rows, nothing written",
            outcome.parsed, outcome.duplicates
        );
    } else {
        println!(
            "{} rows parsed, {} duplicate rows, {} deleted, {} inserted",
            outcome.parsed, outcome.duplicates, outcome.deleted, outcome.inserted
        );
    }
}
