//! Aggregated per-game-type payloads for dashboards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Player name to current score.
pub type ScoreTable = BTreeMap<String, i64>;

/// Player name to the hero state of every peer that player can see,
/// keyed by peer name.
pub type HeroesMap = BTreeMap<String, BTreeMap<String, Value>>;

/// Point-in-time view of every player bound to one game type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    /// Board edge length declared by the game type.
    pub board_size: u32,
    /// Rendering/decoding configuration declared by the game type.
    pub decoder: Value,
    /// Scores of exactly the players bound to the type.
    pub scores: ScoreTable,
    /// Visible peers per player.
    pub heroes: HeroesMap,
}
