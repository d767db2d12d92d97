use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATA_VERSION: &str = "2.0";

/// Shift period as minutes since midnight. Overnight shifts are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    pub start_minute_of_day: u32,
    pub end_minute_of_day: u32,
}

impl ShiftWindow {
    pub fn new(start_minute_of_day: u32, end_minute_of_day: u32) -> Self {
        ShiftWindow {
            start_minute_of_day,
            end_minute_of_day,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end_minute_of_day) - i64::from(self.start_minute_of_day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricMode {
    /// Bigger is better: progress is `current` toward `target`.
    Normal,
    /// Smaller is better: progress is the reduction from `target` toward zero.
    Countdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetric {
    pub current: f64,
    pub target: f64,
    pub mode: MetricMode,
}

impl ProgressMetric {
    pub fn normal(current: f64, target: f64) -> Self {
        ProgressMetric {
            current,
            target,
            mode: MetricMode::Normal,
        }
    }

    pub fn countdown(current: f64, target: f64) -> Self {
        ProgressMetric {
            current,
            target,
            mode: MetricMode::Countdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    Behind,
    Close,
    Ahead,
    Complete,
}

impl PerformanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::Behind => "behind",
            PerformanceStatus::Close => "close",
            PerformanceStatus::Ahead => "ahead",
            PerformanceStatus::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseGoal {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub cost: f64,
    /// Cached gross revenue needed to net `cost`; rewritten whenever rates change.
    #[serde(default)]
    pub required_revenue: f64,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: PurchaseGoal,
    pub start_revenue: f64,
    pub end_revenue: f64,
    pub progress: f64,
    pub achieved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueConversion {
    pub commission_rate: f64,
    pub tax_rate: f64,
}

impl RevenueConversion {
    pub const DEFAULT_COMMISSION_RATE: f64 = 0.0025;
    pub const DEFAULT_TAX_RATE: f64 = 0.325;

    pub fn new(commission_rate: f64, tax_rate: f64) -> Self {
        RevenueConversion {
            commission_rate,
            tax_rate,
        }
    }

    /// Fraction of gross revenue kept after commission and tax.
    pub fn net_rate(&self) -> f64 {
        self.commission_rate * (1.0 - self.tax_rate)
    }

    pub fn net_income(&self, revenue: f64) -> f64 {
        revenue * self.net_rate()
    }
}

impl Default for RevenueConversion {
    fn default() -> Self {
        RevenueConversion::new(Self::DEFAULT_COMMISSION_RATE, Self::DEFAULT_TAX_RATE)
    }
}

/// The persisted daily record: shift settings, targets and today's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerData {
    pub date: NaiveDate,
    pub month: String,
    pub shift_start: String,
    pub shift_end: String,
    pub target: u32,
    pub calls_target: u32,
    pub backlog_target: u32,
    pub daily_revenue_target: u32,
    pub monthly_revenue_target: u32,
    pub current_points: u32,
    pub current_calls: u32,
    pub current_backlog: u32,
    pub current_daily_revenue: u32,
    pub current_monthly_revenue: u32,
    pub last_updated: String,
    pub version: String,
}

impl TrackerData {
    pub fn defaults_for(today: NaiveDate, now_rfc3339: String) -> Self {
        TrackerData {
            date: today,
            month: today.format("%Y-%m").to_string(),
            shift_start: "09:00".to_string(),
            shift_end: "17:00".to_string(),
            target: 50,
            calls_target: 20,
            backlog_target: 0,
            daily_revenue_target: 5000,
            monthly_revenue_target: 50000,
            current_points: 0,
            current_calls: 0,
            current_backlog: 0,
            current_daily_revenue: 0,
            current_monthly_revenue: 0,
            last_updated: now_rfc3339,
            version: DATA_VERSION.to_string(),
        }
    }

    pub fn current_of(&self, kind: MetricKind) -> u32 {
        match kind {
            MetricKind::Points => self.current_points,
            MetricKind::Calls => self.current_calls,
            MetricKind::Backlog => self.current_backlog,
            MetricKind::DailyRevenue => self.current_daily_revenue,
            MetricKind::MonthlyRevenue => self.current_monthly_revenue,
        }
    }

    pub fn target_of(&self, kind: MetricKind) -> u32 {
        match kind {
            MetricKind::Points => self.target,
            MetricKind::Calls => self.calls_target,
            MetricKind::Backlog => self.backlog_target,
            MetricKind::DailyRevenue => self.daily_revenue_target,
            MetricKind::MonthlyRevenue => self.monthly_revenue_target,
        }
    }

    pub fn metric(&self, kind: MetricKind) -> ProgressMetric {
        ProgressMetric {
            current: f64::from(self.current_of(kind)),
            target: f64::from(self.target_of(kind)),
            mode: kind.mode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub shift_start: String,
    pub shift_end: String,
    pub target: u32,
    pub calls_target: u32,
    pub backlog_target: u32,
    pub daily_revenue_target: u32,
    pub monthly_revenue_target: u32,
    pub conversion: RevenueConversion,
}

impl Settings {
    pub fn from_parts(data: &TrackerData, conversion: RevenueConversion) -> Self {
        Settings {
            shift_start: data.shift_start.clone(),
            shift_end: data.shift_end.clone(),
            target: data.target,
            calls_target: data.calls_target,
            backlog_target: data.backlog_target,
            daily_revenue_target: data.daily_revenue_target,
            monthly_revenue_target: data.monthly_revenue_target,
            conversion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Points,
    Calls,
    Backlog,
    DailyRevenue,
    MonthlyRevenue,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Points,
        MetricKind::Calls,
        MetricKind::Backlog,
        MetricKind::DailyRevenue,
        MetricKind::MonthlyRevenue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Points => "Activity",
            MetricKind::Calls => "Outbound Calls",
            MetricKind::Backlog => "Backlog",
            MetricKind::DailyRevenue => "Daily Revenue",
            MetricKind::MonthlyRevenue => "Monthly Revenue",
        }
    }

    pub fn mode(&self) -> MetricMode {
        match self {
            MetricKind::Backlog => MetricMode::Countdown,
            _ => MetricMode::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricView {
    pub kind: MetricKind,
    pub label: String,
    pub mode: MetricMode,
    pub current: f64,
    pub target: f64,
    /// Amount done by now for normal metrics, amount remaining by now for countdowns.
    pub expected: f64,
    pub fill_percent: f64,
    pub status: PerformanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub date: NaiveDate,
    pub shift_start: String,
    pub shift_end: String,
    pub time_percent: f64,
    pub month_percent: f64,
    pub metrics: Vec<MetricView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlannerView {
    pub conversion: RevenueConversion,
    pub net_rate: f64,
    pub current_revenue: f64,
    pub net_income: f64,
    pub total_required_revenue: f64,
    /// Waterfall order.
    pub goals: Vec<GoalProgress>,
    /// Goal ids in display order: purchased first, then by `order`.
    pub display_order: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsUpdate {
    pub current_points: Option<String>,
    pub current_calls: Option<String>,
    pub current_backlog: Option<String>,
    pub current_daily_revenue: Option<String>,
    pub current_monthly_revenue: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub target: Option<String>,
    pub calls_target: Option<String>,
    pub backlog_target: Option<String>,
    pub daily_revenue_target: Option<String>,
    pub monthly_revenue_target: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub purchased: Option<bool>,
}
