use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::info;

use crate::db::Database;
use crate::models::{MetricsUpdate, TrackerData};
use crate::services::validation::apply_metrics;
use crate::utils::now_rfc3339;

/// Stores new counter values. Raw input is sanitized and clamped, never rejected.
pub fn update_metrics(db: &Database, update: MetricsUpdate, now: NaiveDateTime) -> Result<TrackerData> {
    let mut data = db.load_tracker_data(now.date(), &now_rfc3339())?;
    apply_metrics(&mut data, &update);
    data.last_updated = now_rfc3339();
    db.save_tracker_data(&data)?;

    info!(
        "Metrics updated: points {} calls {} backlog {} daily revenue {} monthly revenue {}",
        data.current_points,
        data.current_calls,
        data.current_backlog,
        data.current_daily_revenue,
        data.current_monthly_revenue
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_update_metrics_clamps_and_persists() {
        let db = Database::open_in_memory().unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let update = MetricsUpdate {
            current_points: Some("12".to_string()),
            current_calls: Some("999".to_string()),
            current_daily_revenue: Some("oops".to_string()),
            ..MetricsUpdate::default()
        };
        let data = update_metrics(&db, update, now).unwrap();
        assert_eq!(data.current_points, 12);
        assert_eq!(data.current_calls, 200);
        assert_eq!(data.current_daily_revenue, 0);

        let reloaded = db.load_tracker_data(now.date(), "t").unwrap();
        assert_eq!(reloaded.current_points, 12);
    }
}
