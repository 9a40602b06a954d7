//! Geocoding collaborators: free-text address to point.

pub mod gazetteer;

use anyhow::{Result, bail};
use async_trait::async_trait;

use geoplan_db::models::Point;

pub use gazetteer::Gazetteer;

/// Resolves an address to a point. `Ok(None)` is a miss, not a failure.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Point>>;
}

/// Geocoder used when none is configured. Every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

#[async_trait]
impl Geocoder for NoGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Point>> {
        bail!("no geocoder configured; set GEOPLAN_GAZETTEER or [geocoder].gazetteer")
    }
}
