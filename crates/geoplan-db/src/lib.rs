//! Persistence layer for geoplan: PostgreSQL models, pool management,
//! embedded migrations, and query functions for plans and orders.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
