use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "shift-quota";
pub const DB_FILE_NAME: &str = "shift-quota.sqlite";
pub const DEFAULT_LOG_FILTER: &str = "shift_quota=info";
pub const VERBOSE_LOG_FILTER: &str = "shift_quota=debug";

/// Shift quota tracker: progress toward daily targets and purchase goals.
#[derive(Parser, Debug, Clone)]
#[command(name = "shift-quota", version)]
pub struct CliArgs {
    /// Directory holding the tracker database
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Evaluate at this clock time (HH:MM) instead of now
    #[arg(long = "at", global = true)]
    pub at: Option<String>,

    /// Print JSON instead of text
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show every progress bar against the expectation curve
    Status,
    /// Record current counters
    Update(UpdateArgs),
    /// Show or change shift window, targets and revenue rates
    Settings(SettingsArgs),
    /// Zero today's counters
    Reset,
    /// Manage purchase goals
    #[command(subcommand)]
    Goals(GoalsCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    pub points: Option<String>,
    #[arg(long)]
    pub calls: Option<String>,
    #[arg(long)]
    pub backlog: Option<String>,
    #[arg(long = "daily-revenue")]
    pub daily_revenue: Option<String>,
    #[arg(long = "monthly-revenue")]
    pub monthly_revenue: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(long = "shift-start")]
    pub shift_start: Option<String>,
    #[arg(long = "shift-end")]
    pub shift_end: Option<String>,
    #[arg(long)]
    pub target: Option<String>,
    #[arg(long = "calls-target")]
    pub calls_target: Option<String>,
    #[arg(long = "backlog-target")]
    pub backlog_target: Option<String>,
    #[arg(long = "daily-revenue-target")]
    pub daily_revenue_target: Option<String>,
    #[arg(long = "monthly-revenue-target")]
    pub monthly_revenue_target: Option<String>,
    /// Commission as a fraction, e.g. 0.0025
    #[arg(long = "commission-rate")]
    pub commission_rate: Option<f64>,
    /// Tax as a fraction, e.g. 0.325
    #[arg(long = "tax-rate")]
    pub tax_rate: Option<f64>,
}

impl SettingsArgs {
    pub fn touches_targets(&self) -> bool {
        self.shift_start.is_some()
            || self.shift_end.is_some()
            || self.target.is_some()
            || self.calls_target.is_some()
            || self.backlog_target.is_some()
            || self.daily_revenue_target.is_some()
            || self.monthly_revenue_target.is_some()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalsCommand {
    /// List goals, purchased first
    List,
    /// Add a goal at the end of the waterfall
    Add { name: String, cost: String },
    /// Change name, cost or purchased flag
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cost: Option<String>,
        #[arg(long)]
        purchased: Option<bool>,
    },
    /// Delete a goal
    Remove { id: String },
    /// Move the goal at one waterfall position to another (zero-based)
    Move { from: usize, to: usize },
    /// Flip the purchased flag
    Toggle { id: String },
    /// Allocate revenue across goals
    Plan {
        /// Revenue to allocate; defaults to this month's recorded revenue
        #[arg(long)]
        revenue: Option<f64>,
    },
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}
