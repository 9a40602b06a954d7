//! Plan service layer.
//!
//! Answers plan queries over a [`PlanStore`]. "Today" comes from the
//! injected [`Clock`] and the recent window from [`PlanningWindow`], so the
//! service is deterministic under test. Nothing is cached; every call goes
//! to the store.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use geoplan_db::models::Plan;

use super::window::PlanningWindow;
use crate::clock::Clock;
use crate::error::PlanningError;
use crate::store::PlanStore;

#[derive(Clone)]
pub struct PlanService {
    clock: Arc<dyn Clock>,
    window: PlanningWindow,
    plans: Arc<dyn PlanStore>,
}

impl PlanService {
    pub fn new(clock: Arc<dyn Clock>, window: PlanningWindow, plans: Arc<dyn PlanStore>) -> Self {
        Self {
            clock,
            window,
            plans,
        }
    }

    pub fn window(&self) -> PlanningWindow {
        self.window
    }

    /// All plans delivered on `date`; empty when none match.
    pub async fn find_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Plan>, PlanningError> {
        Ok(self.plans.find_by_delivery_date(date).await?)
    }

    /// All plans whose delivery date falls inside the configured window
    /// around today, bounds included.
    pub async fn find_recent(&self) -> Result<Vec<Plan>, PlanningError> {
        let today = self.clock.today();
        let (from, to) = self.window.range(today)?;
        debug!(%today, %from, %to, "find_recent");
        Ok(self.plans.find_by_delivery_date_between(from, to).await?)
    }

    /// The plan with `plan_id`, or [`PlanningError::PlanNotFound`].
    pub async fn get_by_id(&self, plan_id: Uuid) -> Result<Plan, PlanningError> {
        self.plans
            .get_by_id(plan_id)
            .await?
            .ok_or(PlanningError::PlanNotFound(plan_id))
    }
}
