//! ERP adapters: the external source of candidate orders for a delivery
//! date.

pub mod export_dir;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;

use geoplan_db::models::Order;

pub use export_dir::ErpExportDir;

/// Source of orders scheduled for delivery on a date.
///
/// The `plan_id` of returned orders is whatever the source attached; the
/// board overwrites it when merging.
#[async_trait]
pub trait ErpAdapter: Send + Sync {
    async fn fetch_orders_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Order>>;
}

/// Adapter used when no ERP source is configured. Every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoErp;

#[async_trait]
impl ErpAdapter for NoErp {
    async fn fetch_orders_by_delivery_date(&self, _date: NaiveDate) -> Result<Vec<Order>> {
        bail!("no ERP source configured; set GEOPLAN_ERP_DIR or [erp].export_dir")
    }
}
