//! Demo roster and board geometry shared by the bundled game types.
//!
//! The engine ships two game types so the platform has something to drive
//! out of the box:
//!
//! - [`Sprint`](crate::sprint::Sprint) -- one board per player (`Single`).
//! - [`Battlefield`](crate::battlefield::Battlefield) -- one board for
//!   everyone (`Shared`).
//!
//! Which players sit at which game comes from the `demo` section of
//! `arena-config.yaml`.

use std::sync::Arc;

use arena_core::game::{Game, GameType, Player, ScoreCard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battlefield::Battlefield;
use crate::error::EngineError;
use crate::sprint::Sprint;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// The `demo` section of `arena-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Edge length of every demo board.
    #[serde(default = "default_board_size")]
    pub board_size: u32,

    /// Players seeded at startup, in join order.
    #[serde(default = "default_players")]
    pub players: Vec<DemoPlayer>,
}

/// One seeded player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoPlayer {
    /// Unique player name.
    pub name: String,
    /// Name of the game type to join.
    pub game: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            players: default_players(),
        }
    }
}

const fn default_board_size() -> u32 {
    15
}

fn default_players() -> Vec<DemoPlayer> {
    [
        ("alice", Sprint::NAME),
        ("bob", Sprint::NAME),
        ("carol", Battlefield::NAME),
        ("dave", Battlefield::NAME),
        ("erin", Battlefield::NAME),
    ]
    .into_iter()
    .map(|(name, game)| DemoPlayer {
        name: name.to_owned(),
        game: game.to_owned(),
    })
    .collect()
}

// -----------------------------------------------------------------------
// Geometry
// -----------------------------------------------------------------------

/// A cell on a square board. `(0, 0)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Position {
    /// The middle cell of a board of edge `size`.
    pub const fn center(size: u32) -> Self {
        Self {
            x: size / 2,
            y: size / 2,
        }
    }

    /// A uniformly random cell of a board of edge `size`.
    pub fn random(rng: &mut impl Rng, size: u32) -> Self {
        let edge = size.max(1);
        Self {
            x: rng.random_range(0..edge),
            y: rng.random_range(0..edge),
        }
    }

    /// The neighbouring cell in `heading`, or `None` past the board edge.
    pub const fn step(self, heading: Heading, size: u32) -> Option<Self> {
        let (x, y) = match heading {
            Heading::Up => (Some(self.x), self.y.checked_add(1)),
            Heading::Down => (Some(self.x), self.y.checked_sub(1)),
            Heading::Left => (self.x.checked_sub(1), Some(self.y)),
            Heading::Right => (self.x.checked_add(1), Some(self.y)),
        };
        match (x, y) {
            (Some(x), Some(y)) if x < size && y < size => Some(Self { x, y }),
            _ => None,
        }
    }
}

/// Direction a hero is travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    /// Towards higher rows.
    Up,
    /// Towards lower rows.
    Down,
    /// Towards lower columns.
    Left,
    /// Towards higher columns.
    Right,
}

impl Heading {
    /// Heading for a joystick direction command, if it is one.
    pub const fn from_command(command: &arena_types::Command) -> Option<Self> {
        match command {
            arena_types::Command::Up => Some(Self::Up),
            arena_types::Command::Down => Some(Self::Down),
            arena_types::Command::Left => Some(Self::Left),
            arena_types::Command::Right => Some(Self::Right),
            arena_types::Command::Act(_) | arena_types::Command::Message(_) => None,
        }
    }
}

// -----------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------

/// The demo game types, one instance each for the process lifetime.
pub struct Catalog {
    sprint: Arc<Sprint>,
    battlefield: Arc<Battlefield>,
}

impl Catalog {
    /// Create both demo types with boards of edge `board_size`.
    pub fn new(board_size: u32) -> Self {
        Self {
            sprint: Arc::new(Sprint::new(board_size)),
            battlefield: Arc::new(Battlefield::new(board_size)),
        }
    }

    /// Build a player and its game instance for the named game type.
    pub fn join(&self, name: &str, game: &str) -> Result<(Player, Box<dyn Game>), EngineError> {
        let score = ScoreCard::default();
        match game {
            Sprint::NAME => {
                let instance = self.sprint.create(score.clone());
                let player = Player::new(
                    name,
                    score,
                    Arc::clone(&self.sprint) as Arc<dyn GameType>,
                );
                Ok((player, Box::new(instance)))
            }
            Battlefield::NAME => {
                let instance = self.battlefield.join(name, score.clone())?;
                let player = Player::new(
                    name,
                    score,
                    Arc::clone(&self.battlefield) as Arc<dyn GameType>,
                );
                Ok((player, Box::new(instance)))
            }
            other => Err(EngineError::Demo {
                message: format!("unknown game type '{other}' for player '{name}'"),
            }),
        }
    }
}

/// Bind every configured demo player.
///
/// Returns the number of players bound.
pub fn seed_players(
    catalog: &Catalog,
    config: &DemoConfig,
    platform: &mut arena_core::PlayerGames,
) -> Result<usize, EngineError> {
    for entry in &config.players {
        let (player, game) = catalog.join(&entry.name, &entry.game)?;
        platform.add(player, game);
    }
    info!(
        players = config.players.len(),
        board_size = config.board_size,
        "Demo players seeded"
    );
    Ok(config.players.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use arena_core::PlayerGames;
    use arena_core::statistics::ActivityStatistics;
    use arena_types::Command;

    use super::*;

    #[test]
    fn step_stops_at_edges() {
        let corner = Position { x: 0, y: 0 };
        assert_eq!(corner.step(Heading::Down, 5), None);
        assert_eq!(corner.step(Heading::Left, 5), None);
        assert_eq!(corner.step(Heading::Up, 5), Some(Position { x: 0, y: 1 }));

        let far = Position { x: 4, y: 4 };
        assert_eq!(far.step(Heading::Right, 5), None);
        assert_eq!(far.step(Heading::Left, 5), Some(Position { x: 3, y: 4 }));
    }

    #[test]
    fn only_direction_commands_have_headings() {
        assert_eq!(Heading::from_command(&Command::Left), Some(Heading::Left));
        assert_eq!(Heading::from_command(&Command::Act(vec![1])), None);
        assert_eq!(Heading::from_command(&Command::Message("hi".into())), None);
    }

    #[test]
    fn default_roster_covers_both_types() {
        let config = DemoConfig::default();
        assert!(config.players.iter().any(|p| p.game == Sprint::NAME));
        assert!(config.players.iter().any(|p| p.game == Battlefield::NAME));
    }

    #[test]
    fn demo_section_parses_from_yaml() {
        let yaml = "board_size: 9\nplayers:\n  - name: zed\n    game: sprint\n";
        let config: DemoConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.board_size, 9);
        assert_eq!(config.players.len(), 1);
        assert_eq!(config.players.first().unwrap().name, "zed");
    }

    #[test]
    fn unknown_game_is_rejected() {
        let catalog = Catalog::new(10);
        assert!(matches!(
            catalog.join("p1", "chess"),
            Err(EngineError::Demo { .. })
        ));
    }

    #[test]
    fn seeding_binds_every_player() {
        let catalog = Catalog::new(10);
        let mut platform = PlayerGames::new(Arc::new(ActivityStatistics::new()));

        let bound = seed_players(&catalog, &DemoConfig::default(), &mut platform).unwrap();

        assert_eq!(bound, 5);
        assert_eq!(platform.len(), 5);
        assert_eq!(platform.bindings_of_type(Battlefield::NAME).len(), 3);

        let report = platform.tick();
        assert_eq!(report.failure_count(), 0);
        // Two sprint boards plus one shared battlefield.
        assert_eq!(report.games_advanced(), 3);
    }
}
