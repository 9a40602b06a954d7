//! The configurable date window used by "recent plans".

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// How many days before and after today count as "recent".
///
/// Values are used as given. A negative `days_back` moves the start of the
/// window into the future, a negative `days_forward` moves the end into the
/// past; when the start ends up after the end the window is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningWindow {
    pub days_back: i32,
    pub days_forward: i32,
}

impl PlanningWindow {
    pub const DEFAULT_DAYS_BACK: i32 = 7;
    pub const DEFAULT_DAYS_FORWARD: i32 = 7;

    pub fn new(days_back: i32, days_forward: i32) -> Self {
        Self {
            days_back,
            days_forward,
        }
    }

    /// The inclusive `[today - days_back, today + days_forward]` range.
    pub fn range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), PlanningError> {
        let out_of_range = || PlanningError::WindowOutOfRange {
            days_back: self.days_back,
            days_forward: self.days_forward,
        };
        let from = today
            .checked_sub_signed(TimeDelta::days(i64::from(self.days_back)))
            .ok_or_else(out_of_range)?;
        let to = today
            .checked_add_signed(TimeDelta::days(i64::from(self.days_forward)))
            .ok_or_else(out_of_range)?;
        Ok((from, to))
    }
}

impl Default for PlanningWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAYS_BACK, Self::DEFAULT_DAYS_FORWARD)
    }
}
