//! Query functions, one module per table.

pub mod orders;
pub mod plans;
