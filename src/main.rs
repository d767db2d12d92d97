use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use shift_quota::commands;
use shift_quota::config::{
    default_data_dir, CliArgs, Command, GoalsCommand, DB_FILE_NAME, DEFAULT_LOG_FILTER,
    VERBOSE_LOG_FILTER,
};
use shift_quota::db::Database;
use shift_quota::models::{
    DashboardView, GoalPlannerView, GoalUpdate, MetricsUpdate, PurchaseGoal, Settings,
    SettingsUpdate,
};
use shift_quota::utils::{format_decimal, parse_decimal, parse_hhmm};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_filter = if args.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let data_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => default_data_dir().ok_or_else(|| anyhow!("No platform data directory"))?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Create data dir {}", data_dir.display()))?;
    let db_path = data_dir.join(DB_FILE_NAME);
    let db = Database::new(&db_path).with_context(|| format!("Open {}", db_path.display()))?;
    debug!("Using database {}", db_path.display());

    let now = resolve_now(args.at.as_deref())?;
    run(&db, args.command, now, args.json)
}

fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime> {
    let now = Local::now().naive_local();
    match at {
        Some(raw) => {
            let minutes = parse_hhmm(raw)?;
            let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
                .ok_or_else(|| anyhow!("Invalid time {}", raw))?;
            Ok(now.date().and_time(time))
        }
        None => Ok(now),
    }
}

fn run(db: &Database, command: Command, now: NaiveDateTime, json: bool) -> Result<()> {
    match command {
        Command::Status => {
            let view = commands::dashboard::get_dashboard(db, now)?;
            emit(&view, json, print_dashboard)
        }
        Command::Update(update) => {
            let payload = MetricsUpdate {
                current_points: update.points,
                current_calls: update.calls,
                current_backlog: update.backlog,
                current_daily_revenue: update.daily_revenue,
                current_monthly_revenue: update.monthly_revenue,
            };
            commands::metrics::update_metrics(db, payload, now)?;
            let view = commands::dashboard::get_dashboard(db, now)?;
            emit(&view, json, print_dashboard)
        }
        Command::Settings(settings) => {
            let current = if settings.touches_targets()
                || settings.commission_rate.is_some()
                || settings.tax_rate.is_some()
            {
                let payload = settings.touches_targets().then(|| SettingsUpdate {
                    shift_start: settings.shift_start.clone(),
                    shift_end: settings.shift_end.clone(),
                    target: settings.target.clone(),
                    calls_target: settings.calls_target.clone(),
                    backlog_target: settings.backlog_target.clone(),
                    daily_revenue_target: settings.daily_revenue_target.clone(),
                    monthly_revenue_target: settings.monthly_revenue_target.clone(),
                });
                commands::settings::save_settings_and_rates(
                    db,
                    payload,
                    settings.commission_rate,
                    settings.tax_rate,
                    now,
                )?
            } else {
                commands::settings::get_settings(db, now)?
            };
            emit(&current, json, print_settings)
        }
        Command::Reset => {
            commands::settings::reset_today(db, now)?;
            let view = commands::dashboard::get_dashboard(db, now)?;
            emit(&view, json, print_dashboard)
        }
        Command::Goals(goals) => run_goals(db, goals, now, json),
    }
}

fn run_goals(db: &Database, command: GoalsCommand, now: NaiveDateTime, json: bool) -> Result<()> {
    match command {
        GoalsCommand::List => {
            let goals = commands::goals::get_goals(db)?;
            emit(&goals, json, print_goals)
        }
        GoalsCommand::Add { name, cost } => {
            let goal = commands::goals::add_goal(db, &name, parse_decimal(&cost)?)?;
            info!("Goal {} needs {} revenue", goal.name, format_decimal(goal.required_revenue));
            emit(&vec![goal], json, print_goals)
        }
        GoalsCommand::Edit {
            id,
            name,
            cost,
            purchased,
        } => {
            let cost = cost.as_deref().map(parse_decimal).transpose()?;
            let goal = commands::goals::update_goal(
                db,
                &id,
                GoalUpdate {
                    name,
                    cost,
                    purchased,
                },
            )?;
            emit(&vec![goal], json, print_goals)
        }
        GoalsCommand::Remove { id } => {
            commands::goals::remove_goal(db, &id)?;
            let goals = commands::goals::get_goals(db)?;
            emit(&goals, json, print_goals)
        }
        GoalsCommand::Move { from, to } => {
            let goals = commands::goals::move_goal(db, from, to)?;
            emit(&goals, json, print_goals)
        }
        GoalsCommand::Toggle { id } => {
            let goal = commands::goals::toggle_goal(db, &id)?;
            emit(&vec![goal], json, print_goals)
        }
        GoalsCommand::Plan { revenue } => {
            let plan = commands::goals::plan_goals(db, revenue, now)?;
            emit(&plan, json, print_plan)
        }
    }
}

fn emit<T: Serialize>(value: &T, json: bool, print: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

fn print_dashboard(view: &DashboardView) {
    println!(
        "{}  shift {}-{}  {:.0}% of shift, {:.0}% of month",
        view.date, view.shift_start, view.shift_end, view.time_percent, view.month_percent
    );
    for metric in &view.metrics {
        println!(
            "{:<16} {:>9}/{:<9} expected {:>9}  {:>5.1}%  {}",
            metric.label,
            metric.current,
            metric.target,
            metric.expected,
            metric.fill_percent,
            metric.status.as_str()
        );
    }
}

fn print_settings(settings: &Settings) {
    println!("Shift:                  {}-{}", settings.shift_start, settings.shift_end);
    println!("Activity target:        {}", settings.target);
    println!("Calls target:           {}", settings.calls_target);
    println!("Backlog target:         {}", settings.backlog_target);
    println!("Daily revenue target:   {}", settings.daily_revenue_target);
    println!("Monthly revenue target: {}", settings.monthly_revenue_target);
    println!(
        "Commission {} / tax {} (net rate {})",
        settings.conversion.commission_rate,
        settings.conversion.tax_rate,
        settings.conversion.net_rate()
    );
}

fn print_goals(goals: &Vec<PurchaseGoal>) {
    if goals.is_empty() {
        println!("No purchase goals");
        return;
    }
    for goal in goals {
        println!(
            "{:>2} {} {:<24} cost {:>10}  needs {:>12}  {}",
            goal.order,
            if goal.purchased { "[x]" } else { "[ ]" },
            goal.name,
            format_decimal(goal.cost),
            format_decimal(goal.required_revenue),
            goal.id
        );
    }
}

fn print_plan(plan: &GoalPlannerView) {
    println!(
        "Revenue {} nets {} at rate {}",
        format_decimal(plan.current_revenue),
        format_decimal(plan.net_income),
        plan.net_rate
    );
    for progress in &plan.goals {
        println!(
            "{:<24} {:>12} .. {:<12} {:>5.1}% {}{}",
            progress.goal.name,
            format_decimal(progress.start_revenue),
            format_decimal(progress.end_revenue),
            progress.progress * 100.0,
            if progress.achieved { "achieved" } else { "" },
            if progress.goal.purchased { " (purchased)" } else { "" }
        );
    }
    println!("Total required: {}", format_decimal(plan.total_required_revenue));
}
