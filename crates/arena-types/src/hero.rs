//! Hero state reported by a game instance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::GameId;

/// The current state of the hero a player controls in one game instance.
///
/// `state` is opaque to the platform and passed through to dashboards.
/// `players_group` is set only by shared-board games and lists the
/// instances (including the reporting one) that play on the same board,
/// in the order the game keeps them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeroData {
    /// Game-defined hero state (coordinates, level, and so on).
    pub state: Value,
    /// Sibling instances sharing this board, or `None` when ungrouped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players_group: Option<Vec<GameId>>,
}

impl HeroData {
    /// Hero state for an ungrouped instance.
    pub const fn single(state: Value) -> Self {
        Self {
            state,
            players_group: None,
        }
    }

    /// Hero state for an instance on a shared board.
    pub const fn grouped(state: Value, players_group: Vec<GameId>) -> Self {
        Self {
            state,
            players_group: Some(players_group),
        }
    }

    /// The sibling group, or `None` when the instance is ungrouped.
    pub fn players_group(&self) -> Option<&[GameId]> {
        self.players_group.as_deref()
    }
}
