//! ERP adapter over a directory of daily JSON exports.
//!
//! The ERP drops one file per delivery date, `<dir>/<YYYY-MM-DD>.json`,
//! holding an array of orders:
//!
//! ```json
//! [
//!   { "id": "6f1c1a52-6f0e-4a39-9d3f-2f5a0f1f9b11", "name": "ERP-1042",
//!     "address": "12 Bolshaya Sadovaya St, Rostov-on-Don" }
//! ]
//! ```
//!
//! A date with no file has no orders.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use geoplan_db::models::{Order, Point};

use super::ErpAdapter;

/// One order as exported by the ERP.
#[derive(Debug, Deserialize)]
struct ExportedOrder {
    id: Uuid,
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    point: Option<Point>,
}

impl From<ExportedOrder> for Order {
    fn from(e: ExportedOrder) -> Self {
        Self {
            id: e.id,
            name: e.name,
            address: e.address,
            point: e.point,
            plan_id: Uuid::nil(),
            number: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErpExportDir {
    dir: PathBuf,
}

impl ErpExportDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the export file for `date`.
    pub fn export_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl ErpAdapter for ErpExportDir {
    async fn fetch_orders_by_delivery_date(&self, date: NaiveDate) -> Result<Vec<Order>> {
        let path = self.export_path(date);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ERP export for date");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read ERP export {}", path.display()));
            }
        };

        let exported: Vec<ExportedOrder> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse ERP export {}", path.display()))?;
        debug!(path = %path.display(), count = exported.len(), "read ERP export");

        Ok(exported.into_iter().map(Order::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn reads_orders_for_date() {
        let tmp = tempfile::TempDir::new().unwrap();
        let erp = ErpExportDir::new(tmp.path());
        std::fs::write(
            erp.export_path(date()),
            r#"[
                {"id": "6f1c1a52-6f0e-4a39-9d3f-2f5a0f1f9b11", "name": "ERP-1", "address": "1 Main St"},
                {"id": "0b6c7a0e-4a53-4d4e-a8c5-7dc0d2b0c0a1", "name": "ERP-2",
                 "point": {"latitude": 47.2, "longitude": 39.7}}
            ]"#,
        )
        .unwrap();

        let orders = erp.fetch_orders_by_delivery_date(date()).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].name, "ERP-1");
        assert_eq!(orders[0].address.as_deref(), Some("1 Main St"));
        assert!(orders[0].plan_id.is_nil());
        assert_eq!(orders[1].point, Some(Point::new(47.2, 39.7)));
    }

    #[tokio::test]
    async fn missing_file_means_no_orders() {
        let tmp = tempfile::TempDir::new().unwrap();
        let erp = ErpExportDir::new(tmp.path());
        let orders = erp.fetch_orders_by_delivery_date(date()).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let erp = ErpExportDir::new(tmp.path());
        std::fs::write(erp.export_path(date()), "{not json").unwrap();

        let err = erp.fetch_orders_by_delivery_date(date()).await.unwrap_err();
        assert!(
            err.to_string().contains("failed to parse ERP export"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn export_path_uses_iso_date() {
        let erp = ErpExportDir::new("/var/erp");
        assert_eq!(
            erp.export_path(date()),
            PathBuf::from("/var/erp/2024-05-01.json")
        );
    }

    #[tokio::test]
    async fn no_erp_fails() {
        let err = super::super::NoErp
            .fetch_orders_by_delivery_date(date())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no ERP source configured"));
    }
}
