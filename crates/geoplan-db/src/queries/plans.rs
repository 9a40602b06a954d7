//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Plan;

/// Insert a new plan row for the given delivery date. Returns the inserted
/// plan with server-generated defaults (id, created_at).
pub async fn insert_plan(pool: &PgPool, delivery_date: NaiveDate) -> Result<Plan> {
    let plan = sqlx::query_as::<_, Plan>(
        "INSERT INTO plans (delivery_date) \
         VALUES ($1) \
         RETURNING *",
    )
    .bind(delivery_date)
    .fetch_one(pool)
    .await
    .context("failed to insert plan")?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// List the plans delivered on exactly `delivery_date`, oldest first.
pub async fn list_plans_by_delivery_date(
    pool: &PgPool,
    delivery_date: NaiveDate,
) -> Result<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE delivery_date = $1 ORDER BY created_at",
    )
    .bind(delivery_date)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list plans for {delivery_date}"))?;

    Ok(plans)
}

/// List the plans whose delivery date lies in `[from, to]` (both ends
/// inclusive), ordered by delivery date. An inverted range yields nothing.
pub async fn list_plans_between(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans \
         WHERE delivery_date BETWEEN $1 AND $2 \
         ORDER BY delivery_date, created_at",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list plans between {from} and {to}"))?;

    Ok(plans)
}
