//! Enumeration types shared across the platform.

use serde::{Deserialize, Serialize};

/// How the instances of a game type relate to each other.
///
/// The tick scheduler uses this to decide how many underlying game
/// advances a pass performs for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplayerMode {
    /// Every player owns an independent instance; each one is advanced.
    Single,
    /// All players of the type share one board; it is advanced exactly
    /// once per pass through a single representative instance.
    Shared,
}

impl MultiplayerMode {
    /// Whether instances of this mode share one board.
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl core::fmt::Display for MultiplayerMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Shared => f.write_str("shared"),
        }
    }
}

/// A single joystick input sent by a player's client.
///
/// Commands are queued on the binding's control channel by the transport
/// layer and delivered to the game on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Command {
    /// Move or turn up.
    Up,
    /// Move or turn down.
    Down,
    /// Move or turn left.
    Left,
    /// Move or turn right.
    Right,
    /// Game-specific action with integer parameters.
    Act(Vec<i32>),
    /// Free-form text message to the game.
    Message(String),
}
