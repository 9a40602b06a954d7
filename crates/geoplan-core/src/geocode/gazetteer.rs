//! A geocoder backed by a local gazetteer file.
//!
//! The file is TOML with one `[addresses]` table mapping an address to a
//! `[latitude, longitude]` pair:
//!
//! ```toml
//! [addresses]
//! "12 Bolshaya Sadovaya St, Rostov-on-Don" = [47.2221, 39.7188]
//! ```
//!
//! Lookups ignore case and collapse runs of whitespace.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use geoplan_db::models::Point;

use super::Geocoder;

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    addresses: HashMap<String, [f64; 2]>,
}

#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: HashMap<String, Point>,
}

impl Gazetteer {
    /// Parse a gazetteer from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: GazetteerFile = toml::from_str(contents).context("failed to parse gazetteer")?;
        let entries = file
            .addresses
            .into_iter()
            .map(|(address, [lat, lon])| (normalize(&address), Point::new(lat, lon)))
            .collect();
        Ok(Self { entries })
    }

    /// Load a gazetteer file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read gazetteer at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid gazetteer at {}", path.display()))
    }

    pub fn insert(&mut self, address: &str, point: Point) {
        self.entries.insert(normalize(address), point);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, address: &str) -> Option<Point> {
        self.entries.get(&normalize(address)).copied()
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[async_trait]
impl Geocoder for Gazetteer {
    async fn geocode(&self, address: &str) -> Result<Option<Point>> {
        Ok(self.lookup(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[addresses]
"12 Bolshaya Sadovaya St, Rostov-on-Don" = [47.2221, 39.7188]
"1 Teatralnaya Sq" = [47.2270, 39.7450]
"#;

    #[test]
    fn lookup_ignores_case_and_spacing() {
        let gz = Gazetteer::from_toml_str(SAMPLE).unwrap();
        assert_eq!(gz.len(), 2);
        assert_eq!(
            gz.lookup("  12 bolshaya   SADOVAYA st, rostov-on-don"),
            Some(Point::new(47.2221, 39.7188))
        );
        assert_eq!(gz.lookup("unknown street"), None);
    }

    #[test]
    fn empty_file_is_valid() {
        let gz = Gazetteer::from_toml_str("").unwrap();
        assert!(gz.is_empty());
    }

    #[test]
    fn bad_coordinates_are_rejected() {
        let err = Gazetteer::from_toml_str("[addresses]\n\"x\" = [1.0]\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse gazetteer"));
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("gazetteer.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let gz = Gazetteer::load(&path).unwrap();
        assert_eq!(gz.lookup("1 teatralnaya sq"), Some(Point::new(47.2270, 39.7450)));
    }

    #[tokio::test]
    async fn geocode_reports_miss_as_none() {
        let mut gz = Gazetteer::default();
        gz.insert("Home", Point::new(1.0, 2.0));
        assert_eq!(gz.geocode("home").await.unwrap(), Some(Point::new(1.0, 2.0)));
        assert_eq!(gz.geocode("away").await.unwrap(), None);
    }
}
