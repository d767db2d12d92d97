use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::warn;

use crate::db::Database;
use crate::error::TrackerError;
use crate::models::{DashboardView, MetricKind, MetricMode, MetricView, TrackerData};
use crate::services::shift_progress::{
    classify, expected_from_fraction, fill_percent, month_fraction, time_fraction,
};
use crate::utils::{minute_of_day, now_rfc3339, parse_window};

pub fn get_dashboard(db: &Database, now: NaiveDateTime) -> Result<DashboardView> {
    let data = db.load_tracker_data(now.date(), &now_rfc3339())?;
    Ok(build_dashboard(&data, now)?)
}

/// Derives every bar of the widget from the stored record at `now`.
pub fn build_dashboard(data: &TrackerData, now: NaiveDateTime) -> Result<DashboardView, TrackerError> {
    let window = parse_window(&data.shift_start, &data.shift_end)?;
    let shift_fraction = match time_fraction(&window, minute_of_day(now.time())) {
        Ok(fraction) => fraction,
        Err(TrackerError::DegenerateWindow { start, end }) => {
            warn!("Degenerate shift window {}-{}, expecting no progress", start, end);
            0.0
        }
        Err(err) => return Err(err),
    };
    let month = month_fraction(now.date());

    let metrics = MetricKind::ALL
        .iter()
        .map(|&kind| {
            let fraction = match kind {
                MetricKind::MonthlyRevenue => month,
                _ => shift_fraction,
            };
            metric_view(data, kind, fraction)
        })
        .collect();

    Ok(DashboardView {
        date: now.date(),
        shift_start: data.shift_start.clone(),
        shift_end: data.shift_end.clone(),
        time_percent: shift_fraction * 100.0,
        month_percent: month * 100.0,
        metrics,
    })
}

fn metric_view(data: &TrackerData, kind: MetricKind, fraction: f64) -> MetricView {
    let metric = data.metric(kind);
    let expected_done = expected_from_fraction(metric.target, fraction);
    let expected = match metric.mode {
        MetricMode::Normal => expected_done,
        MetricMode::Countdown if metric.target > 0.0 => metric.target - expected_done,
        MetricMode::Countdown => 0.0,
    };

    MetricView {
        kind,
        label: kind.label().to_string(),
        mode: metric.mode,
        current: metric.current,
        target: metric.target,
        expected,
        fill_percent: fill_percent(&metric),
        status: classify(&metric, expected_done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PerformanceStatus;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn record() -> TrackerData {
        let mut data = TrackerData::defaults_for(at(15, 0, 0).date(), "t0".to_string());
        data.target = 80;
        data.current_points = 30;
        data.calls_target = 20;
        data.current_calls = 5;
        data.backlog_target = 100;
        data.current_backlog = 40;
        data
    }

    fn view_of(view: &DashboardView, kind: MetricKind) -> MetricView {
        view.metrics.iter().find(|m| m.kind == kind).cloned().unwrap()
    }

    #[test]
    fn test_dashboard_midday() {
        let view = build_dashboard(&record(), at(15, 12, 0)).unwrap();
        assert_eq!(view.time_percent, 37.5);
        assert_eq!(view.metrics.len(), 5);

        let points = view_of(&view, MetricKind::Points);
        assert_eq!(points.expected, 30.0);
        assert_eq!(points.status, PerformanceStatus::Ahead);

        let calls = view_of(&view, MetricKind::Calls);
        // 20 * 0.375 = 7.5 rounds to 8
        assert_eq!(calls.expected, 8.0);
        assert_eq!(calls.status, PerformanceStatus::Behind);
    }

    #[test]
    fn test_dashboard_backlog_is_countdown() {
        let view = build_dashboard(&record(), at(15, 13, 0)).unwrap();
        let backlog = view_of(&view, MetricKind::Backlog);
        assert_eq!(backlog.mode, MetricMode::Countdown);
        assert_eq!(backlog.expected, 50.0);
        assert_eq!(backlog.fill_percent, 60.0);
        assert_eq!(backlog.status, PerformanceStatus::Ahead);
    }

    #[test]
    fn test_dashboard_monthly_revenue_follows_month() {
        let mut data = record();
        data.monthly_revenue_target = 31_000;
        data.current_monthly_revenue = 14_000;
        let view = build_dashboard(&data, at(16, 8, 0)).unwrap();
        let monthly = view_of(&view, MetricKind::MonthlyRevenue);
        assert_eq!(monthly.expected, 15_000.0);
        assert_eq!(monthly.status, PerformanceStatus::Close);
        assert_eq!(view.time_percent, 0.0);
    }

    #[test]
    fn test_dashboard_degenerate_window_expects_nothing() {
        let mut data = record();
        data.shift_start = "17:00".to_string();
        data.shift_end = "09:00".to_string();
        let view = build_dashboard(&data, at(15, 12, 0)).unwrap();
        assert_eq!(view.time_percent, 0.0);
        assert_eq!(view_of(&view, MetricKind::Points).expected, 0.0);
    }

    #[test]
    fn test_dashboard_rejects_bad_time() {
        let mut data = record();
        data.shift_start = "9".to_string();
        assert!(matches!(
            build_dashboard(&data, at(15, 12, 0)),
            Err(TrackerError::InvalidTime(_))
        ));
    }
}
