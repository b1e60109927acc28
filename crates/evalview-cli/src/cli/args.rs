use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use evalview_core::diff::model::DiffStatus;
use evalview_core::drift::{DEFAULT_DRIFT_WINDOW, DEFAULT_SLOPE_THRESHOLD};

#[derive(Parser)]
#[command(
    name = "evalview",
    version,
    about = "Golden-trace regression testing and drift detection for multi-step AI agents"
)]
pub struct Cli {
    /// Config file (YAML). Defaults apply when the file is missing.
    #[arg(long, global = true, default_value = "evalview.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare a captured run against its golden baselines
    Check(CheckArgs),
    /// Manage blessed golden baselines
    Golden(GoldenArgs),
    /// Inspect recorded check history and drift trends
    Drift(DriftArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Severity gate for CI: `check` exits non-zero when the classification is
/// at least this bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Never fail the process on a comparison result
    Never,
    /// Fail on output_changed or worse
    OutputChanged,
    /// Fail on tools_changed or worse
    ToolsChanged,
    /// Fail only on regression or worse
    Regression,
}

impl FailOn {
    pub fn gates(&self, status: DiffStatus) -> bool {
        let floor = match self {
            FailOn::Never => return false,
            FailOn::OutputChanged => DiffStatus::OutputChanged.rank(),
            FailOn::ToolsChanged => DiffStatus::ToolsChanged.rank(),
            FailOn::Regression => DiffStatus::Regression.rank(),
        };
        status.rank() >= floor
    }
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Captured run record (JSON: test_name, trace, score)
    #[arg(long)]
    pub run: PathBuf,

    /// Compare against a single named variant instead of every variant
    #[arg(long)]
    pub variant: Option<String>,

    /// Severity at which the exit code turns non-zero
    #[arg(long, value_enum, default_value_t = FailOn::ToolsChanged)]
    pub fail_on: FailOn,

    /// Skip recording this check into the drift history
    #[arg(long, default_value_t = false)]
    pub no_history: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct GoldenArgs {
    #[command(subcommand)]
    pub cmd: GoldenSub,
}

#[derive(Subcommand)]
pub enum GoldenSub {
    /// Bless a captured run as a golden baseline
    Bless(BlessArgs),
    /// List all default goldens
    List,
    /// Show one golden's metadata and tool sequence
    Show(ShowArgs),
    /// Delete a golden (and only it; other variants stay)
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct BlessArgs {
    /// Captured run record (JSON: test_name, trace, score)
    #[arg(long)]
    pub run: PathBuf,

    /// Store under a named variant instead of the default slot
    #[arg(long)]
    pub variant: Option<String>,

    /// Free-form note stored in the golden's metadata
    #[arg(long)]
    pub notes: Option<String>,

    /// Actor recorded as blessed_by (default: $USER)
    #[arg(long)]
    pub by: Option<String>,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Test name
    #[arg(long)]
    pub test: String,

    /// Variant name (default golden when omitted)
    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Test name
    #[arg(long)]
    pub test: String,

    /// Variant name (default golden when omitted)
    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(Parser)]
pub struct DriftArgs {
    #[command(subcommand)]
    pub cmd: DriftSub,
}

#[derive(Subcommand)]
pub enum DriftSub {
    /// Print recent check outcomes for a test, newest first
    History(HistoryArgs),
    /// Run trend analysis over the recent similarity window
    Report(ReportArgs),
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Test name
    #[arg(long)]
    pub test: String,

    /// Number of entries to print
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Test name
    #[arg(long)]
    pub test: String,

    /// Number of recent checks to fit the trend over
    #[arg(long, default_value_t = DEFAULT_DRIFT_WINDOW)]
    pub window: usize,

    /// Slope (similarity per check) below which drift is flagged
    #[arg(long, default_value_t = DEFAULT_SLOPE_THRESHOLD, allow_hyphen_values = true)]
    pub threshold: f64,
}
