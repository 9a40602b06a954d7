//! Domain logic for geoplan.
//!
//! - [`plan`]: plan lookups, including the configurable "recent" window.
//! - [`board`]: the per-plan working list of orders and the commands that
//!   reconcile it (manual add, ERP merge, drag reorder, geocoding, save).
//! - [`store`], [`erp`], [`geocode`]: collaborator traits and their
//!   PostgreSQL, file-backed, and in-memory implementations.

pub mod board;
pub mod clock;
pub mod erp;
pub mod error;
pub mod geocode;
pub mod plan;
pub mod store;

pub use error::PlanningError;
