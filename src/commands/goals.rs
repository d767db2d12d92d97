use anyhow::Result;
use chrono::NaiveDateTime;

use crate::db::Database;
use crate::models::{GoalPlannerView, GoalUpdate, PurchaseGoal};
use crate::services::goals::GoalService;
use crate::utils::now_rfc3339;

/// Goals in display order: purchased first, then by waterfall position.
pub fn get_goals(db: &Database) -> Result<Vec<PurchaseGoal>> {
    Ok(GoalService::new(db).get_goals_sorted()?)
}

pub fn add_goal(db: &Database, name: &str, cost: f64) -> Result<PurchaseGoal> {
    Ok(GoalService::new(db).add_goal(name, cost)?)
}

pub fn update_goal(db: &Database, goal_id: &str, update: GoalUpdate) -> Result<PurchaseGoal> {
    Ok(GoalService::new(db).update_goal(goal_id, update)?)
}

pub fn toggle_goal(db: &Database, goal_id: &str) -> Result<PurchaseGoal> {
    Ok(GoalService::new(db).toggle_purchased(goal_id)?)
}

pub fn remove_goal(db: &Database, goal_id: &str) -> Result<()> {
    Ok(GoalService::new(db).remove_goal(goal_id)?)
}

pub fn move_goal(db: &Database, from: usize, to: usize) -> Result<Vec<PurchaseGoal>> {
    Ok(GoalService::new(db).move_goal(from, to)?)
}

/// Planner view against `revenue`, or this month's recorded revenue when not given.
pub fn plan_goals(db: &Database, revenue: Option<f64>, now: NaiveDateTime) -> Result<GoalPlannerView> {
    let current_revenue = match revenue {
        Some(revenue) => revenue,
        None => {
            let data = db.load_tracker_data(now.date(), &now_rfc3339())?;
            f64::from(data.current_monthly_revenue)
        }
    };
    Ok(GoalService::new(db).plan(current_revenue)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricsUpdate, RevenueConversion};
    use crate::commands::metrics::update_metrics;
    use crate::commands::settings::save_conversion;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_plan_defaults_to_monthly_revenue() {
        let db = Database::open_in_memory().unwrap();
        save_conversion(&db, RevenueConversion::new(0.1, 0.0)).unwrap();
        add_goal(&db, "Desk", 100.0).unwrap();
        add_goal(&db, "Chair", 200.0).unwrap();
        update_metrics(
            &db,
            MetricsUpdate {
                current_monthly_revenue: Some("1500".to_string()),
                ..MetricsUpdate::default()
            },
            now(),
        )
        .unwrap();

        let plan = plan_goals(&db, None, now()).unwrap();
        assert_eq!(plan.current_revenue, 1500.0);
        assert!(plan.goals[0].achieved);
        assert!((plan.goals[1].progress - 0.25).abs() < 1e-9);

        let plan = plan_goals(&db, Some(0.0), now()).unwrap();
        assert_eq!(plan.goals[0].progress, 0.0);
    }

    #[test]
    fn test_get_goals_shows_purchased_first() {
        let db = Database::open_in_memory().unwrap();
        add_goal(&db, "First", 10.0).unwrap();
        let second = add_goal(&db, "Second", 20.0).unwrap();
        toggle_goal(&db, &second.id).unwrap();

        let names: Vec<String> = get_goals(&db).unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
