//! Configuration file management for geoplan.
//!
//! Provides a TOML config file at `~/.config/geoplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geoplan_core::plan::PlanningWindow;
use geoplan_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub planning: PlanningSection,
    #[serde(default)]
    pub erp: ErpSection,
    #[serde(default)]
    pub geocoder: GeocoderSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DbConfig::DEFAULT_URL.to_string(),
        }
    }
}

/// The window used by `plan recent` and `/api/plans/recent`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanningSection {
    #[serde(default = "default_days_back")]
    pub days_back: i32,
    #[serde(default = "default_days_forward")]
    pub days_forward: i32,
}

impl Default for PlanningSection {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            days_forward: default_days_forward(),
        }
    }
}

fn default_days_back() -> i32 {
    PlanningWindow::DEFAULT_DAYS_BACK
}

fn default_days_forward() -> i32 {
    PlanningWindow::DEFAULT_DAYS_FORWARD
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErpSection {
    /// Directory holding the ERP's daily `<YYYY-MM-DD>.json` exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeocoderSection {
    /// TOML gazetteer file of address -> [lat, lon].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gazetteer: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the geoplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/geoplan` or `~/.config/geoplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("geoplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("geoplan")
}

/// Return the path to the geoplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct GeoplanConfig {
    pub db_config: DbConfig,
    pub window: PlanningWindow,
    pub erp_dir: Option<PathBuf>,
    pub gazetteer: Option<PathBuf>,
}

impl GeoplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `GEOPLAN_DATABASE_URL` > `[database].url` > `DbConfig::DEFAULT_URL`
    /// - Window: `GEOPLAN_DAYS_BACK` / `GEOPLAN_DAYS_FORWARD` > `[planning]` > 7 / 7
    /// - ERP exports: `GEOPLAN_ERP_DIR` > `[erp].export_dir`
    /// - Gazetteer: `GEOPLAN_GAZETTEER` > `[geocoder].gazetteer`
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().unwrap_or_default();
        Self::resolve_with(cli_db_url, file_config)
    }

    fn resolve_with(cli_db_url: Option<&str>, file_config: ConfigFile) -> Result<Self> {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else {
            file_config.database.url
        };

        let days_back = env_days("GEOPLAN_DAYS_BACK")?.unwrap_or(file_config.planning.days_back);
        let days_forward =
            env_days("GEOPLAN_DAYS_FORWARD")?.unwrap_or(file_config.planning.days_forward);

        let erp_dir = std::env::var_os("GEOPLAN_ERP_DIR")
            .map(PathBuf::from)
            .or(file_config.erp.export_dir);
        let gazetteer = std::env::var_os("GEOPLAN_GAZETTEER")
            .map(PathBuf::from)
            .or(file_config.geocoder.gazetteer);

        Ok(Self {
            db_config: DbConfig::new(db_url),
            window: PlanningWindow::new(days_back, days_forward),
            erp_dir,
            gazetteer,
        })
    }
}

fn env_days(var: &str) -> Result<Option<i32>> {
    match std::env::var(var) {
        Ok(value) => {
            let days = value
                .trim()
                .parse()
                .with_context(|| format!("{var} must be a whole number of days, got {value:?}"))?;
            Ok(Some(days))
        }
        Err(_) => Ok(None),
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
