use std::num::IntErrorKind;

use crate::error::{Result, TrackerError};
use crate::models::{MetricsUpdate, SettingsUpdate, TrackerData};
use crate::utils::{parse_hhmm, parse_window};

/// Inclusive bounds for one numeric field of the daily record.
#[derive(Debug, Clone, Copy)]
pub struct FieldLimits {
    pub min: u32,
    pub max: u32,
}

pub const TARGET_LIMITS: FieldLimits = FieldLimits { min: 1, max: 200 };
pub const CALLS_TARGET_LIMITS: FieldLimits = FieldLimits { min: 1, max: 100 };
pub const BACKLOG_TARGET_LIMITS: FieldLimits = FieldLimits { min: 0, max: 1000 };
pub const DAILY_REVENUE_TARGET_LIMITS: FieldLimits = FieldLimits { min: 0, max: 100_000 };
pub const MONTHLY_REVENUE_TARGET_LIMITS: FieldLimits = FieldLimits { min: 0, max: 1_000_000 };
pub const POINTS_LIMITS: FieldLimits = FieldLimits { min: 0, max: 500 };
pub const CALLS_LIMITS: FieldLimits = FieldLimits { min: 0, max: 200 };
pub const BACKLOG_LIMITS: FieldLimits = FieldLimits { min: 0, max: 2000 };
pub const DAILY_REVENUE_LIMITS: FieldLimits = FieldLimits { min: 0, max: 200_000 };
pub const MONTHLY_REVENUE_LIMITS: FieldLimits = FieldLimits { min: 0, max: 2_000_000 };

/// Parses the leading integer of `raw` and clamps it into `limits`.
/// Unparseable input yields `default`; digit runs too long for `i64` saturate.
pub fn sanitize_number(raw: &str, limits: FieldLimits, default: u32) -> u32 {
    let trimmed = raw.trim();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_end = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| i + sign_len)
        .unwrap_or(trimmed.len());

    let value = match trimmed[..digits_end].parse::<i64>() {
        Ok(value) => value,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => return default,
        },
    };
    value.clamp(i64::from(limits.min), i64::from(limits.max)) as u32
}

pub fn sanitize_time(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    if parse_hhmm(trimmed).is_ok() {
        trimmed.to_string()
    } else {
        default.to_string()
    }
}

/// Collects every problem with `data` instead of stopping at the first.
pub fn validate(data: &TrackerData) -> Result<()> {
    let mut errors = Vec::new();

    let numeric_fields = [
        ("target", data.target, TARGET_LIMITS),
        ("callsTarget", data.calls_target, CALLS_TARGET_LIMITS),
        ("backlogTarget", data.backlog_target, BACKLOG_TARGET_LIMITS),
        ("dailyRevenueTarget", data.daily_revenue_target, DAILY_REVENUE_TARGET_LIMITS),
        ("monthlyRevenueTarget", data.monthly_revenue_target, MONTHLY_REVENUE_TARGET_LIMITS),
        ("currentPoints", data.current_points, POINTS_LIMITS),
        ("currentCalls", data.current_calls, CALLS_LIMITS),
        ("currentBacklog", data.current_backlog, BACKLOG_LIMITS),
        ("currentDailyRevenue", data.current_daily_revenue, DAILY_REVENUE_LIMITS),
        ("currentMonthlyRevenue", data.current_monthly_revenue, MONTHLY_REVENUE_LIMITS),
    ];
    for (field, value, limits) in numeric_fields {
        if value < limits.min || value > limits.max {
            errors.push(format!("{} must be between {} and {}", field, limits.min, limits.max));
        }
    }

    let start_ok = parse_hhmm(&data.shift_start).is_ok();
    let end_ok = parse_hhmm(&data.shift_end).is_ok();
    if !start_ok {
        errors.push("Invalid shift start time format".to_string());
    }
    if !end_ok {
        errors.push("Invalid shift end time format".to_string());
    }
    if start_ok && end_ok {
        if let Ok(window) = parse_window(&data.shift_start, &data.shift_end) {
            if window.duration_minutes() <= 0 {
                errors.push("Shift end must be after shift start".to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TrackerError::Validation(errors))
    }
}

/// Applies sanitized counter values; fields left as `None` keep their value.
pub fn apply_metrics(data: &mut TrackerData, update: &MetricsUpdate) {
    let fields = [
        (&update.current_points, &mut data.current_points, POINTS_LIMITS),
        (&update.current_calls, &mut data.current_calls, CALLS_LIMITS),
        (&update.current_backlog, &mut data.current_backlog, BACKLOG_LIMITS),
        (&update.current_daily_revenue, &mut data.current_daily_revenue, DAILY_REVENUE_LIMITS),
        (&update.current_monthly_revenue, &mut data.current_monthly_revenue, MONTHLY_REVENUE_LIMITS),
    ];
    for (raw, slot, limits) in fields {
        if let Some(raw) = raw {
            *slot = sanitize_number(raw, limits, 0);
        }
    }
}

pub fn apply_settings(data: &mut TrackerData, update: &SettingsUpdate) {
    if let Some(start) = &update.shift_start {
        data.shift_start = sanitize_time(start, "09:00");
    }
    if let Some(end) = &update.shift_end {
        data.shift_end = sanitize_time(end, "17:00");
    }

    let fields = [
        (&update.target, &mut data.target, TARGET_LIMITS),
        (&update.calls_target, &mut data.calls_target, CALLS_TARGET_LIMITS),
        (&update.backlog_target, &mut data.backlog_target, BACKLOG_TARGET_LIMITS),
        (&update.daily_revenue_target, &mut data.daily_revenue_target, DAILY_REVENUE_TARGET_LIMITS),
        (&update.monthly_revenue_target, &mut data.monthly_revenue_target, MONTHLY_REVENUE_TARGET_LIMITS),
    ];
    for (raw, slot, limits) in fields {
        if let Some(raw) = raw {
            *slot = sanitize_number(raw, limits, limits.min);
        }
    }
}
