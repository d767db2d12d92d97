use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use tracing::info;

use crate::db::Database;
use crate::models::{RevenueConversion, Settings, SettingsUpdate, TrackerData};
use crate::services::goals::GoalService;
use crate::services::revenue::validate_conversion;
use crate::services::validation::{apply_settings, validate};
use crate::utils::now_rfc3339;

pub fn get_settings(db: &Database, now: NaiveDateTime) -> Result<Settings> {
    let data = db.load_tracker_data(now.date(), &now_rfc3339())?;
    let conversion = GoalService::new(db).conversion()?;
    Ok(Settings::from_parts(&data, conversion))
}

/// Applies sanitized settings. A shift that does not end after it starts is rejected.
pub fn save_settings(db: &Database, payload: SettingsUpdate, now: NaiveDateTime) -> Result<Settings> {
    save_settings_and_rates(db, Some(payload), None, None, now)
}

pub fn save_conversion(db: &Database, conversion: RevenueConversion) -> Result<RevenueConversion> {
    GoalService::new(db).set_conversion(conversion)?;
    Ok(conversion)
}

/// Applies a settings change and new commission or tax rates as one edit.
/// Nothing is written unless both are valid.
pub fn save_settings_and_rates(
    db: &Database,
    payload: Option<SettingsUpdate>,
    commission_rate: Option<f64>,
    tax_rate: Option<f64>,
    now: NaiveDateTime,
) -> Result<Settings> {
    let service = GoalService::new(db);

    let data = match payload {
        Some(payload) => {
            let mut data = db.load_tracker_data(now.date(), &now_rfc3339())?;
            apply_settings(&mut data, &payload);
            data.last_updated = now_rfc3339();
            validate(&data).map_err(|e| anyhow!("Settings not saved: {}", e))?;
            Some(data)
        }
        None => None,
    };

    let conversion = if commission_rate.is_some() || tax_rate.is_some() {
        let mut conversion = service.conversion()?;
        if let Some(rate) = commission_rate {
            conversion.commission_rate = rate;
        }
        if let Some(rate) = tax_rate {
            conversion.tax_rate = rate;
        }
        validate_conversion(&conversion).map_err(|e| anyhow!("Settings not saved: {}", e))?;
        Some(conversion)
    } else {
        None
    };

    if let Some(data) = data {
        db.save_tracker_data(&data)?;
        info!(
            "Settings saved: shift {}-{} targets {}/{}/{}/{}/{}",
            data.shift_start,
            data.shift_end,
            data.target,
            data.calls_target,
            data.backlog_target,
            data.daily_revenue_target,
            data.monthly_revenue_target
        );
    }
    if let Some(conversion) = conversion {
        save_conversion(db, conversion)?;
    }
    get_settings(db, now)
}

/// Zeroes today's counters; settings and the month's revenue stay.
pub fn reset_today(db: &Database, now: NaiveDateTime) -> Result<TrackerData> {
    let mut data = db.load_tracker_data(now.date(), &now_rfc3339())?;
    data.current_points = 0;
    data.current_calls = 0;
    data.current_backlog = 0;
    data.current_daily_revenue = 0;
    data.last_updated = now_rfc3339();
    db.save_tracker_data(&data)?;
    info!("Counters reset for {}", data.date);
    Ok(data)
}
