use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::models::{GoalPlannerView, GoalUpdate, PurchaseGoal, RevenueConversion};
use crate::services::revenue::{allocate, goals_sorted, required_revenue, validate_conversion};
use crate::utils::now_rfc3339;

/// Storage for the goal list and the conversion rates it is priced with.
pub trait GoalRepository {
    fn load_goals(&self) -> Result<Vec<PurchaseGoal>>;
    fn save_goals(&self, goals: &[PurchaseGoal]) -> Result<()>;
    fn load_conversion(&self) -> Result<RevenueConversion>;
    fn save_conversion(&self, conversion: &RevenueConversion) -> Result<()>;
}

pub struct GoalService<'a, R: GoalRepository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: GoalRepository + ?Sized> GoalService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        GoalService { repo }
    }

    /// Goals in waterfall order. Repairs entries missing an id or a cached required
    /// revenue, and restores dense zero-based `order` values.
    pub fn get_goals(&self) -> Result<Vec<PurchaseGoal>> {
        let conversion = self.repo.load_conversion()?;
        let mut goals = self.repo.load_goals()?;
        goals.sort_by_key(|g| g.order);

        let mut repaired = false;
        for (index, goal) in goals.iter_mut().enumerate() {
            if goal.order != index as u32 {
                goal.order = index as u32;
                repaired = true;
            }
            if goal.id.is_empty() {
                goal.id = new_goal_id();
                repaired = true;
            }
            if goal.required_revenue <= 0.0 {
                goal.required_revenue = cached_required_revenue(goal.cost, &conversion)?;
                repaired = true;
            }
        }
        if repaired {
            debug!("Repaired stored purchase goals");
            self.repo.save_goals(&goals)?;
        }
        Ok(goals)
    }

    pub fn get_goals_sorted(&self) -> Result<Vec<PurchaseGoal>> {
        Ok(goals_sorted(&self.get_goals()?))
    }

    pub fn add_goal(&self, name: &str, cost: f64) -> Result<PurchaseGoal> {
        let name = validate_goal_input(name, cost)?;
        let conversion = self.repo.load_conversion()?;
        let mut goals = self.get_goals()?;

        let goal = PurchaseGoal {
            id: new_goal_id(),
            name,
            cost,
            required_revenue: cached_required_revenue(cost, &conversion)?,
            purchased: false,
            order: goals.len() as u32,
            created_at: Some(now_rfc3339()),
        };
        goals.push(goal.clone());
        self.repo.save_goals(&goals)?;

        info!("Added purchase goal {} ({})", goal.name, goal.id);
        Ok(goal)
    }

    pub fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<PurchaseGoal> {
        let conversion = self.repo.load_conversion()?;
        let mut goals = self.get_goals()?;
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| TrackerError::GoalNotFound(goal_id.to_string()))?;

        if let Some(name) = update.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(TrackerError::InvalidGoal("name must not be empty".to_string()));
            }
            goal.name = trimmed.to_string();
        }
        if let Some(cost) = update.cost {
            validate_goal_input(&goal.name, cost)?;
            goal.cost = cost;
            goal.required_revenue = cached_required_revenue(cost, &conversion)?;
        }
        if let Some(purchased) = update.purchased {
            goal.purchased = purchased;
        }

        let updated = goal.clone();
        self.repo.save_goals(&goals)?;
        debug!("Updated purchase goal {}", updated.id);
        Ok(updated)
    }

    pub fn toggle_purchased(&self, goal_id: &str) -> Result<PurchaseGoal> {
        let goals = self.get_goals()?;
        let purchased = goals
            .iter()
            .find(|g| g.id == goal_id)
            .map(|g| !g.purchased)
            .ok_or_else(|| TrackerError::GoalNotFound(goal_id.to_string()))?;
        self.update_goal(
            goal_id,
            GoalUpdate {
                purchased: Some(purchased),
                ..GoalUpdate::default()
            },
        )
    }

    pub fn remove_goal(&self, goal_id: &str) -> Result<()> {
        let mut goals = self.get_goals()?;
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        if goals.len() == before {
            return Err(TrackerError::GoalNotFound(goal_id.to_string()));
        }

        renumber(&mut goals);
        self.repo.save_goals(&goals)?;
        info!("Removed purchase goal {}", goal_id);
        Ok(())
    }

    /// Moves the goal at waterfall position `from` to position `to`.
    pub fn move_goal(&self, from: usize, to: usize) -> Result<Vec<PurchaseGoal>> {
        let mut goals = self.get_goals()?;
        if from >= goals.len() || to >= goals.len() {
            return Err(TrackerError::InvalidGoal(format!(
                "cannot move position {} to {} in a list of {}",
                from,
                to,
                goals.len()
            )));
        }
        if from == to {
            return Ok(goals);
        }

        let moved = goals.remove(from);
        goals.insert(to, moved);
        renumber(&mut goals);
        self.repo.save_goals(&goals)?;
        Ok(goals)
    }

    pub fn conversion(&self) -> Result<RevenueConversion> {
        self.repo.load_conversion()
    }

    /// Stores new rates and reprices every goal against them.
    pub fn set_conversion(&self, conversion: RevenueConversion) -> Result<Vec<PurchaseGoal>> {
        validate_conversion(&conversion)?;
        self.repo.save_conversion(&conversion)?;

        let mut goals = self.get_goals()?;
        for goal in goals.iter_mut() {
            goal.required_revenue = cached_required_revenue(goal.cost, &conversion)?;
        }
        self.repo.save_goals(&goals)?;

        info!(
            "Revenue conversion set to commission {} tax {} (net rate {})",
            conversion.commission_rate,
            conversion.tax_rate,
            conversion.net_rate()
        );
        Ok(goals)
    }

    pub fn plan(&self, current_revenue: f64) -> Result<GoalPlannerView> {
        if !current_revenue.is_finite() {
            return Err(TrackerError::Validation(vec![format!(
                "revenue must be a finite number, got {}",
                current_revenue
            )]));
        }
        let conversion = self.repo.load_conversion()?;
        validate_conversion(&conversion)?;
        let goals = self.get_goals()?;

        let allocated = allocate(&goals, current_revenue, &conversion)?;
        let total_required_revenue = allocated.last().map(|g| g.end_revenue).unwrap_or(0.0);
        let display_order = goals_sorted(&goals).into_iter().map(|g| g.id).collect();

        Ok(GoalPlannerView {
            conversion,
            net_rate: conversion.net_rate(),
            current_revenue,
            net_income: conversion.net_income(current_revenue),
            total_required_revenue,
            goals: allocated,
            display_order,
        })
    }
}

fn new_goal_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn cached_required_revenue(cost: f64, conversion: &RevenueConversion) -> Result<f64> {
    Ok(required_revenue(cost, conversion)?.round())
}

fn renumber(goals: &mut [PurchaseGoal]) {
    for (index, goal) in goals.iter_mut().enumerate() {
        goal.order = index as u32;
    }
}

fn validate_goal_input(name: &str, cost: f64) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::InvalidGoal("name must not be empty".to_string()));
    }
    if !cost.is_finite() || cost <= 0.0 {
        return Err(TrackerError::InvalidGoal(format!("cost must be positive, got {}", cost)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryRepo {
        goals: RefCell<Vec<PurchaseGoal>>,
        conversion: RefCell<RevenueConversion>,
    }

    impl GoalRepository for MemoryRepo {
        fn load_goals(&self) -> Result<Vec<PurchaseGoal>> {
            Ok(self.goals.borrow().clone())
        }

        fn save_goals(&self, goals: &[PurchaseGoal]) -> Result<()> {
            *self.goals.borrow_mut() = goals.to_vec();
            Ok(())
        }

        fn load_conversion(&self) -> Result<RevenueConversion> {
            Ok(*self.conversion.borrow())
        }

        fn save_conversion(&self, conversion: &RevenueConversion) -> Result<()> {
            *self.conversion.borrow_mut() = *conversion;
            Ok(())
        }
    }

    fn names(goals: &[PurchaseGoal]) -> Vec<&str> {
        goals.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_add_goal_caches_rounded_required_revenue() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);

        let goal = service.add_goal("  Laptop ", 1200.0).unwrap();
        assert_eq!(goal.name, "Laptop");
        assert_eq!(goal.order, 0);
        assert!(!goal.purchased);
        assert_eq!(goal.required_revenue, 711_111.0);
        assert!(goal.created_at.is_some());
        assert_eq!(repo.goals.borrow().len(), 1);
    }

    #[test]
    fn test_add_goal_rejects_bad_input() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        assert!(matches!(service.add_goal("   ", 10.0), Err(TrackerError::InvalidGoal(_))));
        assert!(matches!(service.add_goal("Bike", 0.0), Err(TrackerError::InvalidGoal(_))));
        assert!(matches!(service.add_goal("Bike", f64::NAN), Err(TrackerError::InvalidGoal(_))));
    }

    #[test]
    fn test_remove_goal_renumbers_densely() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        service.add_goal("A", 1.0).unwrap();
        let b = service.add_goal("B", 2.0).unwrap();
        service.add_goal("C", 3.0).unwrap();

        service.remove_goal(&b.id).unwrap();
        let goals = service.get_goals().unwrap();
        assert_eq!(names(&goals), vec!["A", "C"]);
        assert_eq!(goals.iter().map(|g| g.order).collect::<Vec<_>>(), vec![0, 1]);

        assert!(matches!(service.remove_goal(&b.id), Err(TrackerError::GoalNotFound(_))));
    }

    #[test]
    fn test_move_goal() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        for name in ["A", "B", "C"] {
            service.add_goal(name, 1.0).unwrap();
        }

        let goals = service.move_goal(2, 0).unwrap();
        assert_eq!(names(&goals), vec!["C", "A", "B"]);
        assert_eq!(goals.iter().map(|g| g.order).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(service.move_goal(0, 3).is_err());
    }

    #[test]
    fn test_update_and_toggle() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        let goal = service.add_goal("Phone", 100.0).unwrap();

        let updated = service
            .update_goal(
                &goal.id,
                GoalUpdate {
                    name: Some(" New phone ".to_string()),
                    cost: Some(200.0),
                    purchased: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name, "New phone");
        assert_eq!(updated.required_revenue, (200.0 / 0.0016875_f64).round());

        let toggled = service.toggle_purchased(&goal.id).unwrap();
        assert!(toggled.purchased);
        let toggled = service.toggle_purchased(&goal.id).unwrap();
        assert!(!toggled.purchased);

        assert!(matches!(
            service.toggle_purchased("missing"),
            Err(TrackerError::GoalNotFound(_))
        ));
    }

    #[test]
    fn test_set_conversion_reprices_goals() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        service.add_goal("Watch", 500.0).unwrap();

        let goals = service.set_conversion(RevenueConversion::new(0.01, 0.5)).unwrap();
        assert_eq!(goals[0].required_revenue, 100_000.0);
        assert_eq!(service.conversion().unwrap(), RevenueConversion::new(0.01, 0.5));

        assert!(matches!(
            service.set_conversion(RevenueConversion::new(0.0, 0.2)),
            Err(TrackerError::InvalidConversion { .. })
        ));
        assert_eq!(repo.goals.borrow()[0].required_revenue, 100_000.0);
    }

    #[test]
    fn test_get_goals_repairs_missing_fields() {
        let repo = MemoryRepo::default();
        repo.goals.borrow_mut().push(PurchaseGoal {
            id: String::new(),
            name: "Legacy".to_string(),
            cost: 10.0,
            required_revenue: 0.0,
            purchased: false,
            order: 0,
            created_at: None,
        });

        let goals = GoalService::new(&repo).get_goals().unwrap();
        assert!(!goals[0].id.is_empty());
        assert_eq!(goals[0].required_revenue, (10.0 / 0.0016875_f64).round());
        assert_eq!(repo.goals.borrow()[0].id, goals[0].id);
    }

    #[test]
    fn test_get_goals_restores_dense_order() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        let mut x = service.add_goal("X", 1.0).unwrap();
        let mut y = service.add_goal("Y", 1.0).unwrap();
        x.order = 1;
        y.order = 5;
        repo.save_goals(&[x, y]).unwrap();

        service.add_goal("Z", 1.0).unwrap();
        let goals = service.get_goals().unwrap();
        assert_eq!(names(&goals), vec!["X", "Y", "Z"]);
        assert_eq!(goals.iter().map(|g| g.order).collect::<Vec<_>>(), vec![0, 1, 2]);

        let stored: Vec<u32> = repo.goals.borrow().iter().map(|g| g.order).collect();
        assert_eq!(stored, vec![0, 1, 2]);
    }

    #[test]
    fn test_plan_rejects_non_finite_revenue() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        service.add_goal("A", 10.0).unwrap();
        for revenue in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(service.plan(revenue), Err(TrackerError::Validation(_))));
        }
    }

    #[test]
    fn test_plan_uses_waterfall_and_display_order() {
        let repo = MemoryRepo::default();
        let service = GoalService::new(&repo);
        service.set_conversion(RevenueConversion::new(0.1, 0.0)).unwrap();
        let a = service.add_goal("A", 100.0).unwrap();
        let b = service.add_goal("B", 200.0).unwrap();
        service.toggle_purchased(&b.id).unwrap();

        let plan = service.plan(1500.0).unwrap();
        assert_eq!(plan.goals[0].goal.id, a.id);
        assert!(plan.goals[0].achieved);
        assert!((plan.goals[1].progress - 0.25).abs() < 1e-9);
        assert!((plan.total_required_revenue - 3000.0).abs() < 1e-6);
        assert!((plan.net_income - 150.0).abs() < 1e-9);
        assert_eq!(plan.display_order, vec![b.id, a.id]);
    }
}
