//! Plan lookups: by delivery date, by id, and the "recent" window.

pub mod service;
pub mod window;

pub use service::PlanService;
pub use window::PlanningWindow;
