//! PostgreSQL-backed stores.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use geoplan_db::models::{Order, Plan};
use geoplan_db::queries::{orders as order_queries, plans as plan_queries};

use super::{OrderStore, PlanStore};

/// Both stores over one connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgStore {
    async fn find_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Plan>> {
        plan_queries::list_plans_by_delivery_date(&self.pool, date).await
    }

    async fn find_by_delivery_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Plan>> {
        plan_queries::list_plans_between(&self.pool, from, to).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plan>> {
        plan_queries::get_plan(&self.pool, id).await
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_by_plan_id(&self, plan_id: Uuid) -> Result<Vec<Order>> {
        order_queries::list_orders_for_plan(&self.pool, plan_id).await
    }

    async fn save(&self, plan_id: Uuid, orders: &[Order]) -> Result<Vec<Order>> {
        order_queries::save_orders(&self.pool, plan_id, orders).await
    }
}
