//! Expected-progress curve over the shift and actual-vs-expected classification.
//!
//! Every function takes the clock explicitly so callers decide what "now" is.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{Result, TrackerError};
use crate::models::{MetricMode, PerformanceStatus, ProgressMetric, ShiftWindow};

/// Ratio at or above which a metric counts as close to schedule.
pub const CLOSE_THRESHOLD: f64 = 0.9;

/// Fraction of the shift elapsed at `now_minute_of_day`, in `[0, 1]`.
pub fn time_fraction(window: &ShiftWindow, now_minute_of_day: u32) -> Result<f64> {
    let duration = window.duration_minutes();
    if duration <= 0 {
        return Err(TrackerError::DegenerateWindow {
            start: window.start_minute_of_day,
            end: window.end_minute_of_day,
        });
    }

    let elapsed = i64::from(now_minute_of_day) - i64::from(window.start_minute_of_day);
    if elapsed <= 0 {
        Ok(0.0)
    } else if elapsed >= duration {
        Ok(1.0)
    } else {
        Ok(elapsed as f64 / duration as f64)
    }
}

/// Amount of `target` that should be done by `now_minute_of_day`, rounded half away from zero.
pub fn expected_progress(window: &ShiftWindow, now_minute_of_day: u32, target: f64) -> Result<f64> {
    let fraction = time_fraction(window, now_minute_of_day)?;
    Ok(expected_from_fraction(target, fraction))
}

pub fn expected_from_fraction(target: f64, fraction: f64) -> f64 {
    (target * fraction).round()
}

/// Share of the metric's goal already reached, regardless of time.
pub fn completion_ratio(metric: &ProgressMetric) -> f64 {
    match metric.mode {
        MetricMode::Normal => {
            if metric.target > 0.0 {
                metric.current / metric.target
            } else if metric.current > 0.0 {
                1.0
            } else {
                0.0
            }
        }
        MetricMode::Countdown => {
            if metric.target > 0.0 {
                (metric.target - metric.current) / metric.target
            } else {
                0.0
            }
        }
    }
}

/// Actual progress relative to the expected amount done by now.
pub fn progress_ratio(metric: &ProgressMetric, expected_at_now: f64) -> f64 {
    match metric.mode {
        MetricMode::Normal => {
            if expected_at_now > 0.0 {
                metric.current / expected_at_now
            } else if metric.current > 0.0 {
                1.0
            } else {
                0.0
            }
        }
        MetricMode::Countdown => {
            let expected_remaining = metric.target - expected_at_now;
            let expected_reduction = metric.target - expected_remaining;
            if expected_reduction > 0.0 {
                (metric.target - metric.current) / expected_reduction
            } else if metric.current == 0.0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// `expected_at_now` is always the amount done by now, for countdowns too.
pub fn classify(metric: &ProgressMetric, expected_at_now: f64) -> PerformanceStatus {
    if metric.mode == MetricMode::Countdown && metric.current == 0.0 && metric.target > 0.0 {
        return PerformanceStatus::Complete;
    }

    let progress = progress_ratio(metric, expected_at_now);
    if completion_ratio(metric) >= 1.0 {
        PerformanceStatus::Complete
    } else if progress >= 1.0 {
        PerformanceStatus::Ahead
    } else if progress >= CLOSE_THRESHOLD {
        PerformanceStatus::Close
    } else {
        PerformanceStatus::Behind
    }
}

/// Bar fill in percent, capped at 100.
pub fn fill_percent(metric: &ProgressMetric) -> f64 {
    if metric.target <= 0.0 {
        return 0.0;
    }
    let percent = match metric.mode {
        MetricMode::Normal => metric.current / metric.target * 100.0,
        MetricMode::Countdown => ((metric.target - metric.current) / metric.target).max(0.0) * 100.0,
    };
    percent.min(100.0)
}

/// Whole days of the month elapsed before `date`, as a fraction of the month.
pub fn month_fraction(date: NaiveDate) -> f64 {
    let Some(first) = date.with_day(1) else {
        return 0.0;
    };
    let Some(next) = first.checked_add_months(Months::new(1)) else {
        return 0.0;
    };
    let days_in_month = (next - first).num_days();
    if days_in_month <= 0 {
        return 0.0;
    }
    f64::from(date.day0()) / days_in_month as f64
}
