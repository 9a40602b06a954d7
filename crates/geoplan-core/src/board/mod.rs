//! The order board: one plan's working list of orders.
//!
//! ```text
//! renderer ──BoardCommand──> BoardController::execute(&BoardState)
//!                                 |  stores / ERP / geocoder
//!                                 v
//! renderer <──BoardOutcome { state, notices, navigation }
//! ```
//!
//! Commands never mutate the state they are given; a failed command leaves
//! the caller's state as it was.

pub mod command;
pub mod controller;
pub mod list;
pub mod sessions;
pub mod state;

pub use command::{BoardCommand, BoardOutcome, DropLocation, Navigation, Notice, NoticeLevel};
pub use controller::BoardController;
pub use sessions::BoardSessions;
pub use state::{BoardState, ListStatus};
