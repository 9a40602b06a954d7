//! CLI handlers for `geoplan plan` subcommands.
//!
//! Implements:
//! - `geoplan plan create <date>`  -- insert an empty plan for a delivery date
//! - `geoplan plan recent`         -- plans inside the configured window
//! - `geoplan plan on <date>`      -- plans delivered on one date
//! - `geoplan plan show <plan-id>` -- a plan and its orders in saved order

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use geoplan_db::models::{Order, Plan};
use geoplan_db::queries::plans as plan_queries;

use crate::PlanCommands;
use crate::services::Services;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    pool: &PgPool,
    services: &Services,
) -> Result<()> {
    match command {
        PlanCommands::Create { date } => cmd_create(pool, date).await,
        PlanCommands::Recent => cmd_recent(services).await,
        PlanCommands::On { date } => cmd_on(services, date).await,
        PlanCommands::Show { plan_id } => cmd_show(services, &plan_id).await,
    }
}

// -----------------------------------------------------------------------
// geoplan plan create <date>
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, date: NaiveDate) -> Result<()> {
    let plan = plan_queries::insert_plan(pool, date).await?;

    println!("Plan created.");
    println!();
    println!("  Plan ID:       {}", plan.id);
    println!("  Delivery date: {}", plan.delivery_date);
    println!();
    println!(
        "Next: run `geoplan orders fetch {}` to pull the ERP's orders.",
        plan.id
    );
    Ok(())
}

// -----------------------------------------------------------------------
// geoplan plan recent / geoplan plan on <date>
// -----------------------------------------------------------------------

async fn cmd_recent(services: &Services) -> Result<()> {
    let window = services.plans.window();
    let plans = services.plans.find_recent().await?;

    if plans.is_empty() {
        println!(
            "No plans between {} days back and {} days forward.",
            window.days_back, window.days_forward
        );
        return Ok(());
    }
    print_plans(&plans);
    Ok(())
}

async fn cmd_on(services: &Services, date: NaiveDate) -> Result<()> {
    let plans = services.plans.find_by_delivery_date(date).await?;

    if plans.is_empty() {
        println!("No plans for {date}.");
        return Ok(());
    }
    print_plans(&plans);
    Ok(())
}

fn print_plans(plans: &[Plan]) {
    println!("{:<36}  {:<10}  CREATED", "ID", "DELIVERY");
    for plan in plans {
        println!(
            "{:<36}  {:<10}  {}",
            plan.id,
            plan.delivery_date,
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

// -----------------------------------------------------------------------
// geoplan plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show(services: &Services, plan_id: &str) -> Result<()> {
    let board = services.boards.open(plan_id).await?;

    println!("Plan:          {}", board.plan_id);
    println!("Delivery date: {}", board.delivery_date);
    println!("Orders:        {}", board.orders.len());

    if !board.orders.is_empty() {
        println!();
        print_orders(&board.orders);
    }
    Ok(())
}

/// Print orders as a table in list order.
pub fn print_orders(orders: &[Order]) {
    let name_w = orders
        .iter()
        .map(|o| o.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:>3}  {:<name_w$}  {:<23}  ADDRESS", "#", "NAME", "POINT");
    for order in orders {
        let point = order
            .point
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:<name_w$}  {:<23}  {}",
            order.number,
            order.name,
            point,
            order.address.as_deref().unwrap_or("-"),
        );
    }
}
