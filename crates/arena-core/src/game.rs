//! Collaborator contracts for games, game types, and players.
//!
//! The platform never looks inside a simulation. It only needs the narrow
//! capabilities below: ask whether a game is over, reset it, advance it,
//! read its hero state, and hand it player commands.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use arena_types::{Command, GameId, HeroData, MultiplayerMode};
use serde_json::Value;

use crate::error::GameError;

/// A live simulation instance bound to one player.
///
/// Shared-board games give each player their own `Game` handle onto the
/// same board; advancing any one handle advances the whole board.
pub trait Game: Send {
    /// Stable identity of this instance.
    fn id(&self) -> GameId;

    /// Whether the instance has reached a terminal state.
    fn is_game_over(&self) -> bool;

    /// Replace the finished round with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the game cannot be restarted.
    fn new_game(&mut self) -> Result<(), GameError>;

    /// Advance the simulation by one step.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the step fails.
    fn tick(&mut self) -> Result<(), GameError>;

    /// Current hero state, optionally with the shared-board group.
    fn hero(&self) -> HeroData;

    /// Deliver one player command.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Command`] if the game rejects the command.
    fn apply(&mut self, command: &Command) -> Result<(), GameError>;

    /// Release the instance when its binding is removed.
    fn close(&mut self) {}
}

/// Descriptor shared by every instance of one kind of game.
pub trait GameType: Send + Sync {
    /// Unique name of the game type.
    fn name(&self) -> &str;

    /// How instances of this type relate to each other.
    fn multiplayer(&self) -> MultiplayerMode;

    /// Board edge length.
    fn board_size(&self) -> u32;

    /// Rendering/decoding configuration, passed through to dashboards.
    fn decoder(&self) -> Value;

    /// Type-level step, independent of any single instance.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the type-level step fails.
    fn tick(&self) -> Result<(), GameError> {
        Ok(())
    }
}

/// A player's running score.
///
/// Cloning yields another handle to the same counter, so the game that
/// awards points and the registry that reports them see one value.
#[derive(Debug, Clone, Default)]
pub struct ScoreCard(Arc<AtomicI64>);

impl ScoreCard {
    /// A score card starting at `initial`.
    pub fn new(initial: i64) -> Self {
        Self(Arc::new(AtomicI64::new(initial)))
    }

    /// Current score.
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    /// Overwrite the score.
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Release);
    }

    /// Add `delta` (which may be negative), saturating at the bounds.
    pub fn add(&self, delta: i64) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(delta))
            });
    }
}

/// A participant accepted by the platform.
///
/// Two players are the same player when their names match.
#[derive(Clone)]
pub struct Player {
    name: String,
    score: ScoreCard,
    game_type: Arc<dyn GameType>,
}

impl Player {
    /// Create a player declared for `game_type`.
    pub fn new(name: impl Into<String>, score: ScoreCard, game_type: Arc<dyn GameType>) -> Self {
        Self {
            name: name.into(),
            score,
            game_type,
        }
    }

    /// Unique player name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current score.
    pub fn score(&self) -> i64 {
        self.score.get()
    }

    /// Handle to the player's score counter.
    pub const fn score_card(&self) -> &ScoreCard {
        &self.score
    }

    /// The game type the player signed up for.
    pub const fn game_type(&self) -> &Arc<dyn GameType> {
        &self.game_type
    }

    /// Name of the game type the player signed up for.
    pub fn game_name(&self) -> &str {
        self.game_type.name()
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Player {}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("score", &self.score.get())
            .field("game", &self.game_type.name())
            .finish()
    }
}
