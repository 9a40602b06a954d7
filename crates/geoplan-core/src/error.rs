//! Error type shared by the plan service and the order board.

use uuid::Uuid;

/// Failures surfaced to callers of [`crate::plan::PlanService`] and
/// [`crate::board::BoardController`].
///
/// Collaborator failures (database, ERP, geocoder) are carried unchanged in
/// [`PlanningError::Collaborator`]; nothing in this crate retries them.
#[derive(Debug, thiserror::Error)]
pub enum PlanningError {
    #[error("plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("invalid plan id {0:?}: expected a UUID")]
    InvalidPlanId(String),

    #[error("order {0} is not on this board")]
    OrderNotOnBoard(Uuid),

    #[error("planning window of {days_back} days back and {days_forward} days forward is out of the calendar range")]
    WindowOutOfRange { days_back: i32, days_forward: i32 },

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl PlanningError {
    /// Whether the caller asked for something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PlanNotFound(_))
    }

    /// Whether the caller supplied malformed input. A window that leaves the
    /// calendar is a configuration fault, not bad input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidPlanId(_) | Self::OrderNotOnBoard(_))
    }
}
