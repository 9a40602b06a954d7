//! Persistence collaborators for plans and orders.
//!
//! The service and the board only see the [`PlanStore`] and [`OrderStore`]
//! traits. [`PgStore`] backs them with PostgreSQL through `geoplan-db`;
//! [`MemoryStore`] keeps everything in process.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use geoplan_db::models::{Order, Plan};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Read access to persisted plans.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Plans delivered on exactly `date`.
    async fn find_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Plan>>;

    /// Plans delivered between `from` and `to`, both inclusive.
    async fn find_by_delivery_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Plan>>;

    /// The plan with this id, if any.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plan>>;
}

/// Read and write access to the orders of a plan.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// The plan's orders sorted by `number`.
    async fn find_by_plan_id(&self, plan_id: Uuid) -> Result<Vec<Order>>;

    /// Persist `orders` as the plan's list, numbering them by position, and
    /// return the canonical stored list sorted by `number`.
    async fn save(&self, plan_id: Uuid, orders: &[Order]) -> Result<Vec<Order>>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore, _: &dyn OrderStore) {}
};
