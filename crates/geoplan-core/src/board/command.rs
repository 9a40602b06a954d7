//! Board commands and what they hand back to the renderer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::BoardState;

/// Which half of the target row an order was dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropLocation {
    Above,
    Below,
}

/// An operator action on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BoardCommand {
    /// Append a new order entered by hand.
    AddOrder {
        name: String,
        #[serde(default)]
        address: Option<String>,
    },
    /// Merge the ERP's orders for the plan's delivery date.
    FetchFromErp,
    /// Remember the order the operator started dragging.
    DragStart { order_id: Uuid },
    /// Drop the remembered order next to `target_id`.
    Drop {
        target_id: Uuid,
        location: DropLocation,
    },
    /// Forget the remembered order, dropped or not.
    DragEnd,
    /// Drag start, drop and drag end in one step.
    MoveOrder {
        order_id: Uuid,
        target_id: Uuid,
        location: DropLocation,
    },
    /// Resolve every non-blank address to a point.
    GeocodeAll,
    /// Persist the list and replace it with the canonical stored order.
    Save,
    /// Go to the printable view of the plan.
    Print,
}

impl BoardCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddOrder { .. } => "add_order",
            Self::FetchFromErp => "fetch_from_erp",
            Self::DragStart { .. } => "drag_start",
            Self::Drop { .. } => "drop",
            Self::DragEnd => "drag_end",
            Self::MoveOrder { .. } => "move_order",
            Self::GeocodeAll => "geocode_all",
            Self::Save => "save",
            Self::Print => "print",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
}

/// A message for the operator. Failures are errors, never notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// A request to leave the board for another view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Navigation {
    Print { plan_id: Uuid },
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Self::Print { plan_id } => format!("/print/{plan_id}"),
        }
    }
}

/// Result of one command: the new state plus anything to show the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardOutcome {
    pub state: BoardState,
    pub notices: Vec<Notice>,
    pub navigation: Option<Navigation>,
}

impl BoardOutcome {
    pub fn state(state: BoardState) -> Self {
        Self {
            state,
            notices: Vec::new(),
            navigation: None,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn with_navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = Some(navigation);
        self
    }
}
