//! In-process stores for tests and embedders that have no database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use geoplan_db::models::{Order, Plan};

use super::{OrderStore, PlanStore};

#[derive(Debug, Default)]
struct Tables {
    plans: Vec<Plan>,
    orders: HashMap<Uuid, Order>,
}

/// Plans and orders held in memory, with the same ordering and numbering
/// rules as the PostgreSQL store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a plan for `delivery_date` and return it.
    pub fn insert_plan(&self, delivery_date: NaiveDate) -> Result<Plan> {
        let plan = Plan {
            id: Uuid::new_v4(),
            delivery_date,
            created_at: Utc::now(),
        };
        self.write()?.plans.push(plan.clone());
        Ok(plan)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn plan_orders(tables: &Tables, plan_id: Uuid) -> Vec<Order> {
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.plan_id == plan_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.number, o.id));
        orders
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn find_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Plan>> {
        let tables = self.read()?;
        Ok(tables
            .plans
            .iter()
            .filter(|p| p.delivery_date == date)
            .cloned()
            .collect())
    }

    async fn find_by_delivery_date_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Plan>> {
        let tables = self.read()?;
        let mut plans: Vec<Plan> = tables
            .plans
            .iter()
            .filter(|p| from <= p.delivery_date && p.delivery_date <= to)
            .cloned()
            .collect();
        plans.sort_by_key(|p| (p.delivery_date, p.created_at));
        Ok(plans)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Plan>> {
        Ok(self.read()?.plans.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_plan_id(&self, plan_id: Uuid) -> Result<Vec<Order>> {
        let tables = self.read()?;
        Ok(Self::plan_orders(&tables, plan_id))
    }

    async fn save(&self, plan_id: Uuid, orders: &[Order]) -> Result<Vec<Order>> {
        let mut tables = self.write()?;
        let listed: HashSet<Uuid> = orders.iter().map(|o| o.id).collect();
        let unlisted: Vec<Uuid> = Self::plan_orders(&tables, plan_id)
            .into_iter()
            .filter(|o| !listed.contains(&o.id))
            .map(|o| o.id)
            .collect();

        for (index, order) in orders.iter().enumerate() {
            let mut stored = order.clone();
            stored.plan_id = plan_id;
            stored.number = i32::try_from(index + 1)?;
            tables.orders.insert(stored.id, stored);
        }
        for (index, id) in unlisted.iter().enumerate() {
            let number = i32::try_from(orders.len() + index + 1)?;
            if let Some(stored) = tables.orders.get_mut(id) {
                stored.number = number;
            }
        }
        Ok(Self::plan_orders(&tables, plan_id))
    }
}
