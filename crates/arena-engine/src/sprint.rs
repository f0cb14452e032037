//! `sprint`: a single-player board.
//!
//! The hero runs in a straight line in the last direction commanded and
//! scores a point for every gold coin it reaches. Running into the wall
//! ends the round; the platform then starts a new one.

use arena_core::error::GameError;
use arena_core::game::{Game, GameType, ScoreCard};
use arena_types::{Command, GameId, HeroData, MultiplayerMode};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::{Value, json};
use tracing::debug;

use crate::demo::{Heading, Position};

/// The `sprint` game type.
#[derive(Debug)]
pub struct Sprint {
    board_size: u32,
}

impl Sprint {
    /// Registry name of the type.
    pub const NAME: &'static str = "sprint";

    /// A sprint type with boards of edge `board_size`.
    pub const fn new(board_size: u32) -> Self {
        Self { board_size }
    }

    /// A fresh board for one player, crediting points to `score`.
    pub fn create(&self, score: ScoreCard) -> SprintGame {
        SprintGame::new(self.board_size, score, SmallRng::from_rng(&mut rand::rng()))
    }
}

impl GameType for Sprint {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn multiplayer(&self) -> MultiplayerMode {
        MultiplayerMode::Single
    }

    fn board_size(&self) -> u32 {
        self.board_size
    }

    fn decoder(&self) -> Value {
        json!({ "hero": "H", "gold": "$", "empty": "." })
    }
}

/// One player's sprint board.
pub struct SprintGame {
    id: GameId,
    size: u32,
    hero: Position,
    heading: Option<Heading>,
    gold: Position,
    alive: bool,
    score: ScoreCard,
    rng: SmallRng,
}

impl SprintGame {
    fn new(size: u32, score: ScoreCard, mut rng: SmallRng) -> Self {
        let hero = Position::center(size);
        let gold = Position::random(&mut rng, size);
        Self {
            id: GameId::new(),
            size,
            hero,
            heading: None,
            gold,
            alive: true,
            score,
            rng,
        }
    }

    fn place_gold(&mut self) {
        // A one-cell board has nowhere else to put it.
        if self.size <= 1 {
            self.gold = self.hero;
            return;
        }
        loop {
            let candidate = Position::random(&mut self.rng, self.size);
            if candidate != self.hero {
                self.gold = candidate;
                return;
            }
        }
    }
}

impl Game for SprintGame {
    fn id(&self) -> GameId {
        self.id
    }

    fn is_game_over(&self) -> bool {
        !self.alive
    }

    fn new_game(&mut self) -> Result<(), GameError> {
        self.hero = Position::center(self.size);
        self.heading = None;
        self.alive = true;
        self.place_gold();
        Ok(())
    }

    fn tick(&mut self) -> Result<(), GameError> {
        if !self.alive {
            return Ok(());
        }
        let Some(heading) = self.heading else {
            return Ok(());
        };
        match self.hero.step(heading, self.size) {
            Some(next) => {
                self.hero = next;
                if next == self.gold {
                    self.score.add(1);
                    self.place_gold();
                }
            }
            None => {
                debug!(game = %self.id, "Sprint hero hit the wall");
                self.alive = false;
            }
        }
        Ok(())
    }

    fn hero(&self) -> HeroData {
        HeroData::single(json!({
            "position": self.hero,
            "heading": self.heading,
            "gold": self.gold,
            "alive": self.alive,
        }))
    }

    fn apply(&mut self, command: &Command) -> Result<(), GameError> {
        if let Some(heading) = Heading::from_command(command) {
            self.heading = Some(heading);
            return Ok(());
        }
        match command {
            Command::Act(_) => self.heading = None,
            Command::Message(text) => debug!(game = %self.id, text = %text, "Sprint message"),
            _ => {}
        }
        Ok(())
    }
}
