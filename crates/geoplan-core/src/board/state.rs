//! Board snapshot and lifecycle status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use geoplan_db::models::Order;

/// Where the working list stands relative to what is persisted.
///
/// A board that has not been opened has no [`BoardState`] at all.
///
/// ```text
/// open ──> loaded ──add/merge/move/geocode──> dirty ──save──> saved
///                                              ^                │
///                                              └────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loaded,
    Dirty,
    Saved,
}

/// Everything a renderer needs to draw a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub plan_id: Uuid,
    pub delivery_date: NaiveDate,
    pub orders: Vec<Order>,
    pub status: ListStatus,
    /// The order currently being dragged, between drag start and drag end.
    pub dragged: Option<Uuid>,
}

impl BoardState {
    pub fn loaded(plan_id: Uuid, delivery_date: NaiveDate, orders: Vec<Order>) -> Self {
        Self {
            plan_id,
            delivery_date,
            orders,
            status: ListStatus::Loaded,
            dragged: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.status == ListStatus::Dirty
    }

    pub fn contains(&self, order_id: Uuid) -> bool {
        self.orders.iter().any(|o| o.id == order_id)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.status = ListStatus::Dirty;
    }
}
