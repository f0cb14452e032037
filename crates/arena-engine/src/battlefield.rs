//! `battlefield`: one board shared by every player.
//!
//! Each player holds its own [`BattlefieldGame`] handle, but all handles
//! point at the same field. Advancing any handle moves every fighter,
//! which is why the platform advances only one representative per pass.
//!
//! A fighter that lands on a cell held by another fighter knocks it out and
//! scores a point. A knocked-out fighter's round is over until the platform
//! respawns it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use arena_core::error::GameError;
use arena_core::game::{Game, GameType, ScoreCard};
use arena_types::{Command, GameId, HeroData, MultiplayerMode};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::{Value, json};
use tracing::debug;

use crate::demo::{Heading, Position};
use crate::error::EngineError;

/// Attempts at finding a free cell before spawning on an occupied one.
const SPAWN_ATTEMPTS: u32 = 32;

/// The `battlefield` game type. Owns the single shared field.
#[derive(Debug)]
pub struct Battlefield {
    board_size: u32,
    field: Arc<Mutex<Field>>,
}

impl Battlefield {
    /// Registry name of the type.
    pub const NAME: &'static str = "battlefield";

    /// A battlefield of edge `board_size`.
    pub fn new(board_size: u32) -> Self {
        Self {
            board_size,
            field: Arc::new(Mutex::new(Field::new(
                board_size,
                SmallRng::from_rng(&mut rand::rng()),
            ))),
        }
    }

    /// Put a new fighter on the field and return the player's handle.
    pub fn join(&self, name: &str, score: ScoreCard) -> Result<BattlefieldGame, EngineError> {
        let Ok(mut field) = self.field.lock() else {
            return Err(EngineError::Demo {
                message: String::from("battlefield lock poisoned"),
            });
        };
        let id = GameId::new();
        field.spawn(id, name, score);
        Ok(BattlefieldGame {
            id,
            field: Arc::clone(&self.field),
        })
    }
}

impl GameType for Battlefield {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn multiplayer(&self) -> MultiplayerMode {
        MultiplayerMode::Shared
    }

    fn board_size(&self) -> u32 {
        self.board_size
    }

    fn decoder(&self) -> Value {
        json!({ "fighter": "F", "down": "x", "empty": "." })
    }

    fn tick(&self) -> Result<(), GameError> {
        let mut field = lock(&self.field)?;
        field.round = field.round.saturating_add(1);
        Ok(())
    }
}

/// One fighter on the field.
#[derive(Debug)]
struct Fighter {
    name: String,
    position: Position,
    heading: Option<Heading>,
    alive: bool,
    score: ScoreCard,
}

/// The shared board state.
#[derive(Debug)]
struct Field {
    size: u32,
    round: u64,
    fighters: BTreeMap<GameId, Fighter>,
    /// Fighter ids in join order. A later arrival takes a contested cell.
    order: Vec<GameId>,
    rng: SmallRng,
}

impl Field {
    fn new(size: u32, rng: SmallRng) -> Self {
        Self {
            size,
            round: 0,
            fighters: BTreeMap::new(),
            order: Vec::new(),
            rng,
        }
    }

    fn free_position(&mut self) -> Position {
        let mut candidate = Position::random(&mut self.rng, self.size);
        for _ in 0..SPAWN_ATTEMPTS {
            if !self.fighters.values().any(|f| f.alive && f.position == candidate) {
                break;
            }
            candidate = Position::random(&mut self.rng, self.size);
        }
        candidate
    }

    fn spawn(&mut self, id: GameId, name: &str, score: ScoreCard) {
        let position = self.free_position();
        self.fighters.insert(
            id,
            Fighter {
                name: name.to_owned(),
                position,
                heading: None,
                alive: true,
                score,
            },
        );
        self.order.push(id);
    }

    fn respawn(&mut self, id: GameId) {
        let position = self.free_position();
        if let Some(fighter) = self.fighters.get_mut(&id) {
            fighter.position = position;
            fighter.heading = None;
            fighter.alive = true;
        }
    }

    fn leave(&mut self, id: GameId) {
        self.fighters.remove(&id);
        self.order.retain(|other| *other != id);
    }

    /// Move every standing fighter one cell, then resolve knockouts.
    fn advance(&mut self) {
        let size = self.size;
        for fighter in self.fighters.values_mut().filter(|f| f.alive) {
            let Some(heading) = fighter.heading else {
                continue;
            };
            match fighter.position.step(heading, size) {
                Some(next) => fighter.position = next,
                None => fighter.heading = None,
            }
        }

        let mut holders: HashMap<Position, GameId> = HashMap::new();
        for id in &self.order {
            let Some(fighter) = self.fighters.get(id) else {
                continue;
            };
            if !fighter.alive {
                continue;
            }
            let position = fighter.position;
            let Some(holder) = holders.insert(position, *id) else {
                continue;
            };
            if let Some(victim) = self.fighters.get_mut(&holder) {
                victim.alive = false;
                debug!(victim = %victim.name, "Fighter knocked out");
            }
            if let Some(winner) = self.fighters.get(id) {
                winner.score.add(1);
            }
        }
    }
}

fn lock(field: &Mutex<Field>) -> Result<MutexGuard<'_, Field>, GameError> {
    let Ok(guard) = field.lock() else {
        return Err(GameError::LockPoisoned {
            resource: "battlefield",
        });
    };
    Ok(guard)
}

/// One player's handle onto the shared field.
pub struct BattlefieldGame {
    id: GameId,
    field: Arc<Mutex<Field>>,
}

impl Game for BattlefieldGame {
    fn id(&self) -> GameId {
        self.id
    }

    fn is_game_over(&self) -> bool {
        lock(&self.field)
            .ok()
            .and_then(|field| field.fighters.get(&self.id).map(|f| !f.alive))
            .unwrap_or(false)
    }

    fn new_game(&mut self) -> Result<(), GameError> {
        lock(&self.field)?.respawn(self.id);
        Ok(())
    }

    fn tick(&mut self) -> Result<(), GameError> {
        lock(&self.field)?.advance();
        Ok(())
    }

    fn hero(&self) -> HeroData {
        let Ok(field) = lock(&self.field) else {
            return HeroData::single(Value::Null);
        };
        let state = field.fighters.get(&self.id).map_or(Value::Null, |f| {
            json!({
                "position": f.position,
                "heading": f.heading,
                "alive": f.alive,
                "round": field.round,
            })
        });
        HeroData::grouped(state, field.order.clone())
    }

    fn apply(&mut self, command: &Command) -> Result<(), GameError> {
        let mut field = lock(&self.field)?;
        let Some(fighter) = field.fighters.get_mut(&self.id) else {
            return Err(GameError::Command {
                message: format!("fighter {} is not on the field", self.id),
            });
        };
        if let Some(heading) = Heading::from_command(command) {
            fighter.heading = Some(heading);
        } else if matches!(command, Command::Act(_)) {
            fighter.heading = None;
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Ok(mut field) = lock(&self.field) {
            field.leave(self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use arena_core::PlayerGames;
    use arena_core::game::Player;
    use arena_core::statistics::ActivityStatistics;

    use super::*;

    fn place(game: &BattlefieldGame, position: Position) {
        let mut field = game.field.lock().unwrap();
        field.fighters.get_mut(&game.id).unwrap().position = position;
    }

    fn position(game: &BattlefieldGame) -> Position {
        game.field.lock().unwrap().fighters.get(&game.id).unwrap().position
    }

    #[test]
    fn every_handle_sees_the_whole_group() {
        let battlefield = Battlefield::new(10);
        let a = battlefield.join("a", ScoreCard::default()).unwrap();
        let b = battlefield.join("b", ScoreCard::default()).unwrap();

        let group = a.hero().players_group().unwrap().to_vec();
        assert_eq!(group, vec![a.id(), b.id()]);
        assert_eq!(b.hero().players_group().unwrap(), group.as_slice());
    }

    #[test]
    fn one_advance_moves_every_fighter() {
        let battlefield = Battlefield::new(10);
        let mut a = battlefield.join("a", ScoreCard::default()).unwrap();
        let mut b = battlefield.join("b", ScoreCard::default()).unwrap();
        place(&a, Position { x: 1, y: 1 });
        place(&b, Position { x: 8, y: 8 });
        a.apply(&Command::Right).unwrap();
        b.apply(&Command::Down).unwrap();

        a.tick().unwrap();

        assert_eq!(position(&a), Position { x: 2, y: 1 });
        assert_eq!(position(&b), Position { x: 8, y: 7 });
    }

    #[test]
    fn later_fighter_knocks_out_cell_holder() {
        let battlefield = Battlefield::new(10);
        let a_score = ScoreCard::default();
        let b_score = ScoreCard::default();
        let mut a = battlefield.join("a", a_score.clone()).unwrap();
        let mut b = battlefield.join("b", b_score.clone()).unwrap();
        place(&a, Position { x: 3, y: 3 });
        place(&b, Position { x: 4, y: 3 });
        b.apply(&Command::Left).unwrap();

        a.tick().unwrap();

        assert!(a.is_game_over());
        assert!(!b.is_game_over());
        assert_eq!(b_score.get(), 1);
        assert_eq!(a_score.get(), 0);

        a.new_game().unwrap();
        assert!(!a.is_game_over());
    }

    #[test]
    fn closing_leaves_the_field() {
        let battlefield = Battlefield::new(10);
        let mut a = battlefield.join("a", ScoreCard::default()).unwrap();
        let b = battlefield.join("b", ScoreCard::default()).unwrap();

        a.close();

        assert_eq!(b.hero().players_group().unwrap(), &[b.id()]);
        assert!(matches!(
            a.apply(&Command::Up),
            Err(GameError::Command { .. })
        ));
    }

    #[test]
    fn platform_advances_shared_field_once_per_pass() {
        let battlefield = Arc::new(Battlefield::new(10));
        let mut platform = PlayerGames::new(Arc::new(ActivityStatistics::new()));
        for name in ["a", "b", "c"] {
            let score = ScoreCard::default();
            let game = battlefield.join(name, score.clone()).unwrap();
            let player = Player::new(name, score, Arc::clone(&battlefield) as Arc<dyn GameType>);
            platform.add(player, Box::new(game));
        }
        {
            let mut field = battlefield.field.lock().unwrap();
            for (offset, fighter) in (0u32..).zip(field.fighters.values_mut()) {
                fighter.position = Position { x: 0, y: offset.saturating_mul(3) };
            }
        }
        platform.get("a").unwrap().channel().right();
        platform.get("b").unwrap().channel().right();

        let report = platform.tick();

        assert_eq!(report.failure_count(), 0);
        assert_eq!(report.games_advanced(), 1);
        let field = battlefield.field.lock().unwrap();
        let columns: Vec<u32> = field.fighters.values().map(|f| f.position.x).collect();
        assert_eq!(columns.iter().filter(|x| **x == 1).count(), 2);
        assert_eq!(field.round, 1);
    }
}
