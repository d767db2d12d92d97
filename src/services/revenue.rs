use crate::error::{Result, TrackerError};
use crate::models::{GoalProgress, PurchaseGoal, RevenueConversion};

pub const MAX_COMMISSION_RATE: f64 = 0.1;
pub const MAX_TAX_RATE: f64 = 0.5;

/// Rejects rates outside their configured ranges or with no net income left.
pub fn validate_conversion(conversion: &RevenueConversion) -> Result<()> {
    let in_range = (0.0..=MAX_COMMISSION_RATE).contains(&conversion.commission_rate)
        && (0.0..=MAX_TAX_RATE).contains(&conversion.tax_rate);
    let net_rate = conversion.net_rate();
    if !in_range || !net_rate.is_finite() || net_rate <= 0.0 {
        return Err(TrackerError::InvalidConversion {
            commission_rate: conversion.commission_rate,
            tax_rate: conversion.tax_rate,
        });
    }
    Ok(())
}

/// Gross revenue needed so that the net share equals `cost`.
pub fn required_revenue(cost: f64, conversion: &RevenueConversion) -> Result<f64> {
    let net_rate = conversion.net_rate();
    if !net_rate.is_finite() || net_rate <= 0.0 {
        return Err(TrackerError::InvalidConversion {
            commission_rate: conversion.commission_rate,
            tax_rate: conversion.tax_rate,
        });
    }
    Ok(cost / net_rate)
}

/// Spreads `current_revenue` over goals in the given order, filling each before the next.
///
/// Purchased goals are not moved; display ordering is [`goals_sorted`]'s job.
pub fn allocate(
    goals_in_order: &[PurchaseGoal],
    current_revenue: f64,
    conversion: &RevenueConversion,
) -> Result<Vec<GoalProgress>> {
    let mut cumulative = 0.0;
    let mut allocated = Vec::with_capacity(goals_in_order.len());

    for goal in goals_in_order {
        let required = required_revenue(goal.cost, conversion)?;
        let start_revenue = cumulative;
        let end_revenue = start_revenue + required;
        cumulative = end_revenue;

        let progress = if required > 0.0 {
            ((current_revenue - start_revenue) / required).clamp(0.0, 1.0)
        } else {
            1.0
        };

        allocated.push(GoalProgress {
            goal: goal.clone(),
            start_revenue,
            end_revenue,
            progress,
            achieved: current_revenue >= end_revenue,
        });
    }

    Ok(allocated)
}

/// Purchased goals first, each group ordered by `order`. Stable.
pub fn goals_sorted(goals: &[PurchaseGoal]) -> Vec<PurchaseGoal> {
    let mut sorted = goals.to_vec();
    sorted.sort_by(|a, b| b.purchased.cmp(&a.purchased).then(a.order.cmp(&b.order)));
    sorted
}
