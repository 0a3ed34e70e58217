//! CLI argument definitions for the settlement reporting tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bhyt",
    version,
    about = "BHYT settlement reporting - period comparison over visit-level billing data",
    long_about = "Ingests monthly health-insurance settlement extracts into a local\n\
                  warehouse directory, manages the lookup tables that drive record\n\
                  enrichment, and renders the comparison reports (by department,\n\
                  hospital-wide, by diagnosis code, yearly overview)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Warehouse data directory.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-level values in logs (they are redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the settlement months present in the warehouse.
    Periods,

    /// List the derived department labels present in the given periods.
    Departments(DepartmentsArgs),

    /// Render a comparison report.
    #[command(subcommand)]
    Report(ReportCommand),

    /// Import a settlement extract (CSV) into the warehouse.
    Import(ImportArgs),

    /// Delete one settlement month, optionally for a single facility.
    Purge(PurgeArgs),

    /// Inspect or replace the lookup tables.
    #[command(subcommand)]
    Lookup(LookupCommand),

    /// Manage column-display profiles for the department report.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Cost by department across periods.
    Dept(DeptArgs),
    /// Whole-hospital matrix across periods.
    Hospital(HospitalArgs),
    /// Diagnosis-code analysis with the cumulative share filter.
    Icd(IcdArgs),
    /// Monthly pivot for one settlement year.
    Overview(OverviewArgs),
}

#[derive(Args)]
pub struct PeriodsOpt {
    /// Settlement period, `YYYY-MM` or `YYYY-MM..YYYY-MM` (repeatable; the
    /// comparison columns run first vs last).
    #[arg(long = "period", value_name = "RANGE", required = true)]
    pub periods: Vec<String>,
}

#[derive(Args)]
pub struct DepartmentsArgs {
    #[command(flatten)]
    pub periods: PeriodsOpt,

    /// Restrict to one visit-type category.
    #[arg(long, value_enum, default_value = "all")]
    pub scope: ScopeArg,
}

#[derive(Args)]
pub struct DeptArgs {
    #[command(flatten)]
    pub periods: PeriodsOpt,

    /// Column profile to apply (default: every column).
    #[arg(long)]
    pub profile: Option<String>,

    /// Add the difference column (last minus first period).
    #[arg(long)]
    pub diff: bool,

    /// Add the percent-change column.
    #[arg(long = "pct")]
    pub pct_change: bool,

    /// Also write the table to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct HospitalArgs {
    #[command(flatten)]
    pub periods: PeriodsOpt,

    /// Add the difference column (last minus first period).
    #[arg(long)]
    pub diff: bool,

    /// Add the percent-change column.
    #[arg(long = "pct")]
    pub pct_change: bool,

    /// Also write the table to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct IcdArgs {
    #[command(flatten)]
    pub periods: PeriodsOpt,

    /// Restrict to one visit-type category.
    #[arg(long, value_enum, default_value = "all")]
    pub scope: ScopeArg,

    /// Restrict to one derived department label.
    #[arg(long, value_name = "KHOA")]
    pub department: Option<String>,

    /// Metric whose shares drive sorting and the cumulative cutoff.
    #[arg(long = "by", value_enum, default_value = "cost")]
    pub share_metric: ShareMetricArg,

    /// Cumulative share threshold in percent (default by scope: inpatient
    /// and whole-hospital 70, outpatient 80).
    #[arg(long, value_name = "PCT")]
    pub threshold: Option<f64>,

    /// 1-based index of the anchor period used for the cumulative filter.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub anchor: usize,

    /// Add difference columns for this derived metric.
    #[arg(long = "diff-by", value_enum)]
    pub diff_by: Option<IcdDiffArg>,

    /// Reverse the difference direction to first minus last.
    #[arg(long)]
    pub reverse: bool,

    /// Also write the table to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct OverviewArgs {
    /// Settlement year.
    #[arg(long, value_name = "YYYY")]
    pub year: i32,

    /// Figure shown in every cell.
    #[arg(long, value_enum, default_value = "visits")]
    pub metric: OverviewMetricArg,

    /// Also write the table to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Extract file (CSV).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// What to do with rows whose episode key already exists.
    #[arg(long = "on-duplicate", value_enum, default_value = "skip")]
    pub on_duplicate: DuplicateArg,

    /// Detect and report without writing anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PurgeArgs {
    /// Settlement month to delete, `YYYY-MM`.
    #[arg(long, value_name = "YYYY-MM")]
    pub month: String,

    /// Restrict the purge to one facility code.
    #[arg(long, value_name = "CODE")]
    pub facility: Option<String>,
}

#[derive(Subcommand)]
pub enum LookupCommand {
    /// Print one lookup table.
    Show {
        #[arg(value_enum)]
        table: LookupTableArg,
    },
    /// Replace one lookup table from a CSV file.
    Load {
        #[arg(value_enum)]
        table: LookupTableArg,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// List profile names.
    List,
    /// Print one profile's column rows.
    Show {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Create or replace a profile from an ordered metric-key list.
    Save {
        #[arg(value_name = "NAME")]
        name: String,
        /// Comma-separated metric keys, in display order.
        #[arg(long, value_name = "KEYS", value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Delete a profile.
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable output with colors.
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON output for machine parsing.
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// Nội trú.
    Inpatient,
    /// Ngoại trú.
    Outpatient,
    /// Toàn bệnh viện.
    All,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ShareMetricArg {
    /// Visit count.
    Visits,
    /// Total cost.
    Cost,
    /// Insurer-paid cost.
    Insurer,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum IcdDiffArg {
    /// Visit count.
    Visits,
    /// Average treatment days per visit.
    Stay,
    /// Cost per visit.
    Cost,
    /// Share of the period total.
    Share,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OverviewMetricArg {
    Visits,
    Cost,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicateArg {
    Skip,
    Allow,
    Replace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LookupTableArg {
    /// Visit-type classification (`lookup_loaikcb`).
    Loaikcb,
    /// Facility registry (`lookup_cskcb`).
    Cskcb,
    /// Department registry (`lookup_khoa`).
    Khoa,
}
