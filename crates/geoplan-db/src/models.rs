use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// A delivery plan: the container for all orders delivered on one date.
///
/// The delivery date never changes after the row is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub delivery_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A geocoded location in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A deliverable unit attached to a plan.
///
/// `number` is the canonical position assigned when the plan's orders are
/// saved; orders that were never saved carry `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub point: Option<Point>,
    pub plan_id: Uuid,
    #[serde(default)]
    pub number: i32,
}

impl Order {
    /// Create an unsaved order with a fresh identifier.
    pub fn new(name: impl Into<String>, address: Option<String>, plan_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address,
            point: None,
            plan_id,
            number: 0,
        }
    }

    /// The address, if present and not blank.
    pub fn geocodable_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Flat row shape of the `orders` table; the point is split into two
/// nullable columns.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub number: i32,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        let point = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(Point::new(lat, lon)),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            point,
            plan_id: row.plan_id,
            number: row.number,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
