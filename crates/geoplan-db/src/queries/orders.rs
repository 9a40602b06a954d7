//! Database query functions for the `orders` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Order, OrderRow};

/// List the orders of a plan in canonical order (by `number`).
pub async fn list_orders_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE plan_id = $1 ORDER BY number, id",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list orders for plan")?;

    Ok(rows.into_iter().map(Order::from).collect())
}

/// Persist a plan's working list and return the canonical stored list.
///
/// Every order is upserted by id inside one transaction with `number` set
/// to its 1-based position in `orders` and `plan_id` set to `plan_id`.
/// Orders of the plan that are absent from `orders` are kept and numbered
/// after them, `n + 1..`, in their previous order. The returned list is
/// every order of the plan, sorted by `number`.
pub async fn save_orders(pool: &PgPool, plan_id: Uuid, orders: &[Order]) -> Result<Vec<Order>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    for (index, order) in orders.iter().enumerate() {
        let number = i32::try_from(index + 1).context("too many orders in one plan")?;
        sqlx::query(
            "INSERT INTO orders (id, plan_id, name, address, latitude, longitude, number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 plan_id = EXCLUDED.plan_id, \
                 name = EXCLUDED.name, \
                 address = EXCLUDED.address, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 number = EXCLUDED.number",
        )
        .bind(order.id)
        .bind(plan_id)
        .bind(&order.name)
        .bind(&order.address)
        .bind(order.point.map(|p| p.latitude))
        .bind(order.point.map(|p| p.longitude))
        .bind(number)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to save order {}", order.id))?;
    }

    let listed: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let listed_len = i32::try_from(orders.len()).context("too many orders in one plan")?;
    sqlx::query(
        "UPDATE orders SET number = renumbered.number \
         FROM ( \
             SELECT id, ($3 + ROW_NUMBER() OVER (ORDER BY number, id))::int AS number \
             FROM orders \
             WHERE plan_id = $1 AND NOT (id = ANY($2)) \
         ) AS renumbered \
         WHERE orders.id = renumbered.id",
    )
    .bind(plan_id)
    .bind(listed)
    .bind(listed_len)
    .execute(&mut *tx)
    .await
    .context("failed to renumber unlisted orders")?;

    tx.commit().await.context("failed to commit transaction")?;

    list_orders_for_plan(pool, plan_id).await
}
