//! Open boards keyed by a per-session board id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::command::{BoardCommand, BoardOutcome};
use super::controller::BoardController;
use super::state::BoardState;
use crate::error::PlanningError;

type SharedBoard = Arc<Mutex<BoardState>>;

struct Entry {
    board: SharedBoard,
    last_used: Instant,
}

/// The boards currently open, one per editing session.
///
/// Commands on the same board run one at a time; different boards do not
/// block each other. Closing a board discards its unsaved changes, and so
/// does abandoning it: a board left idle for `idle_ttl` is dropped, and when
/// `max_boards` are open the least recently used one makes room for a new
/// board.
#[derive(Clone)]
pub struct BoardSessions {
    boards: Arc<Mutex<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
    max_boards: usize,
}

impl Default for BoardSessions {
    fn default() -> Self {
        Self::with_limits(Self::DEFAULT_IDLE_TTL, Self::DEFAULT_MAX_BOARDS)
    }
}

impl BoardSessions {
    pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
    pub const DEFAULT_MAX_BOARDS: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions that expire after `idle_ttl` without use and never hold more
    /// than `max_boards` boards (at least one).
    pub fn with_limits(idle_ttl: Duration, max_boards: usize) -> Self {
        Self {
            boards: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
            max_boards: max_boards.max(1),
        }
    }

    /// Register a freshly opened board and return its id.
    pub async fn insert(&self, state: BoardState) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut boards = self.boards.lock().await;

        let ttl = self.idle_ttl;
        boards.retain(|board_id, entry| {
            let keep = now.duration_since(entry.last_used) < ttl;
            if !keep {
                debug!(%board_id, "board session expired");
            }
            keep
        });
        while boards.len() >= self.max_boards {
            let Some(oldest) = boards
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(board_id, _)| *board_id)
            else {
                break;
            };
            boards.remove(&oldest);
            debug!(board_id = %oldest, "board session evicted");
        }

        boards.insert(
            id,
            Entry {
                board: Arc::new(Mutex::new(state)),
                last_used: now,
            },
        );
        id
    }

    /// The board with `id`, touched as used now. An expired board is dropped
    /// and reported as absent.
    async fn board(&self, id: Uuid) -> Option<SharedBoard> {
        let now = Instant::now();
        let mut boards = self.boards.lock().await;
        let entry = boards.get_mut(&id)?;
        if now.duration_since(entry.last_used) >= self.idle_ttl {
            boards.remove(&id);
            debug!(board_id = %id, "board session expired");
            return None;
        }
        entry.last_used = now;
        Some(entry.board.clone())
    }

    /// Current state of a board.
    pub async fn snapshot(&self, id: Uuid) -> Option<BoardState> {
        let board = self.board(id).await?;
        let state = board.lock().await.clone();
        Some(state)
    }

    /// Close a board, returning its last state.
    pub async fn remove(&self, id: Uuid) -> Option<BoardState> {
        let entry = self.boards.lock().await.remove(&id)?;
        let state = entry.board.lock().await.clone();
        Some(state)
    }

    /// Run `command` on board `id` and store the resulting state.
    ///
    /// Returns `Ok(None)` for an unknown or expired board. A failing command
    /// leaves the stored state unchanged.
    pub async fn execute(
        &self,
        id: Uuid,
        controller: &BoardController,
        command: BoardCommand,
    ) -> Result<Option<BoardOutcome>, PlanningError> {
        let Some(board) = self.board(id).await else {
            return Ok(None);
        };
        let mut state = board.lock().await;
        let outcome = controller.execute(&state, command).await?;
        *state = outcome.state.clone();
        Ok(Some(outcome))
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.boards.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn board() -> BoardState {
        BoardState::loaded(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn cap_evicts_least_recently_used() {
        let sessions = BoardSessions::with_limits(Duration::from_secs(3600), 2);
        let first = sessions.insert(board()).await;
        let second = sessions.insert(board()).await;

        // Touch the first so the second becomes the oldest.
        assert!(sessions.snapshot(first).await.is_some());
        let third = sessions.insert(board()).await;

        assert_eq!(sessions.len().await, 2);
        assert!(sessions.snapshot(first).await.is_some());
        assert!(sessions.snapshot(second).await.is_none());
        assert!(sessions.snapshot(third).await.is_some());
    }

    #[tokio::test]
    async fn many_abandoned_boards_stay_bounded() {
        let sessions = BoardSessions::with_limits(Duration::from_secs(3600), 16);
        for _ in 0..1000 {
            sessions.insert(board()).await;
        }
        assert_eq!(sessions.len().await, 16);
    }

    #[tokio::test]
    async fn idle_board_expires() {
        let sessions = BoardSessions::with_limits(Duration::from_millis(20), 16);
        let idle = sessions.insert(board()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sessions.snapshot(idle).await.is_none());
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn insert_sweeps_expired_boards() {
        let sessions = BoardSessions::with_limits(Duration::from_millis(20), 16);
        sessions.insert(board()).await;
        sessions.insert(board()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = sessions.insert(board()).await;
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.snapshot(fresh).await.is_some());
    }

    #[test]
    fn zero_cap_still_holds_one_board() {
        let sessions = BoardSessions::with_limits(Duration::from_secs(1), 0);
        assert_eq!(sessions.max_boards, 1);
    }
}
