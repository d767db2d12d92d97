use chrono::NaiveDate;
use tracing::info;

use crate::models::TrackerData;

/// Starts a fresh record when `today` differs from the stored date.
///
/// Shift window and targets carry over. Monthly revenue carries over only within the same month.
pub fn check_and_reset_for_new_day(data: TrackerData, today: NaiveDate, now_rfc3339: String) -> TrackerData {
    if data.date == today {
        return data;
    }

    let mut fresh = TrackerData::defaults_for(today, now_rfc3339);
    fresh.shift_start = data.shift_start;
    fresh.shift_end = data.shift_end;
    fresh.target = data.target;
    fresh.calls_target = data.calls_target;
    fresh.backlog_target = data.backlog_target;
    fresh.daily_revenue_target = data.daily_revenue_target;
    fresh.monthly_revenue_target = data.monthly_revenue_target;

    if data.month == fresh.month {
        fresh.current_monthly_revenue = data.current_monthly_revenue;
    }

    info!("New day {} (previous record {}), counters reset", today, data.date);
    fresh
}
