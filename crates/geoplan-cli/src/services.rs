//! Builds the plan service and board controller from resolved config.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use geoplan_core::board::BoardController;
use geoplan_core::clock::{Clock, SystemClock};
use geoplan_core::erp::{ErpAdapter, ErpExportDir, NoErp};
use geoplan_core::geocode::{Gazetteer, Geocoder, NoGeocoder};
use geoplan_core::plan::PlanService;
use geoplan_core::store::{OrderStore, PgStore};

use crate::config::GeoplanConfig;

/// The collaborators every command and the HTTP server work through.
#[derive(Clone)]
pub struct Services {
    pub plans: PlanService,
    pub orders: Arc<dyn OrderStore>,
    pub boards: BoardController,
}

impl Services {
    /// Wire PostgreSQL stores, the system clock, and whatever ERP source and
    /// gazetteer the config names.
    pub fn from_config(config: &GeoplanConfig, pool: PgPool) -> Result<Self> {
        let store = Arc::new(PgStore::new(pool));

        let erp: Arc<dyn ErpAdapter> = match &config.erp_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "ERP exports directory");
                Arc::new(ErpExportDir::new(dir))
            }
            None => Arc::new(NoErp),
        };

        let geocoder: Arc<dyn Geocoder> = match &config.gazetteer {
            Some(path) => {
                let gazetteer = Gazetteer::load(path)?;
                info!(path = %path.display(), entries = gazetteer.len(), "gazetteer loaded");
                Arc::new(gazetteer)
            }
            None => Arc::new(NoGeocoder),
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let plans = PlanService::new(clock, config.window, store.clone());
        let orders: Arc<dyn OrderStore> = store;
        let boards = BoardController::new(plans.clone(), orders.clone(), erp, geocoder);
        Ok(Self {
            plans,
            orders,
            boards,
        })
    }
}
