//! Test doubles for unit tests: games, game types, and spies that count
//! how often the tick pass touches them.

#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arena_types::{Command, GameId, HeroData, MultiplayerMode};
use serde_json::{Value, json};

use crate::error::GameError;
use crate::game::{Game, GameType, Player, ScoreCard};
use crate::statistics::PlayerSpy;

/// Counters and switches shared by every game handle on one board.
#[derive(Debug, Default)]
pub struct GameProbe {
    pub ticks: AtomicUsize,
    pub new_games: AtomicUsize,
    pub closes: AtomicUsize,
    pub game_over: AtomicBool,
    pub fail_tick: AtomicBool,
    pub panic_tick: AtomicBool,
    pub panic_close: AtomicBool,
    pub fail_new_game: AtomicBool,
    pub reject_commands: AtomicBool,
    pub commands: Mutex<Vec<Command>>,
    pub group: Mutex<Option<Vec<GameId>>>,
}

impl GameProbe {
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn new_games(&self) -> usize {
        self.new_games.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn set_group(&self, ids: Vec<GameId>) {
        if let Ok(mut group) = self.group.lock() {
            *group = Some(ids);
        }
    }
}

pub struct CountingGame {
    id: GameId,
    probe: Arc<GameProbe>,
}

impl CountingGame {
    pub fn new() -> Self {
        Self::on_board(Arc::new(GameProbe::default()))
    }

    pub fn on_board(probe: Arc<GameProbe>) -> Self {
        Self {
            id: GameId::new(),
            probe,
        }
    }

    pub fn probe(&self) -> &Arc<GameProbe> {
        &self.probe
    }
}

impl Game for CountingGame {
    fn id(&self) -> GameId {
        self.id
    }

    fn is_game_over(&self) -> bool {
        self.probe.game_over.load(Ordering::SeqCst)
    }

    fn new_game(&mut self) -> Result<(), GameError> {
        self.probe.new_games.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_new_game.load(Ordering::SeqCst) {
            return Err(GameError::simulation("reset refused"));
        }
        self.probe.game_over.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn tick(&mut self) -> Result<(), GameError> {
        if self.probe.panic_tick.load(Ordering::SeqCst) {
            panic!("board exploded");
        }
        self.probe.ticks.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_tick.load(Ordering::SeqCst) {
            return Err(GameError::simulation("tick refused"));
        }
        Ok(())
    }

    fn hero(&self) -> HeroData {
        let state = json!({ "game": self.id.to_string(), "ticks": self.probe.ticks() });
        match self.probe.group.lock().ok().and_then(|g| g.clone()) {
            Some(group) => HeroData::grouped(state, group),
            None => HeroData::single(state),
        }
    }

    fn apply(&mut self, command: &Command) -> Result<(), GameError> {
        if self.probe.reject_commands.load(Ordering::SeqCst) {
            return Err(GameError::Command {
                message: format!("{command:?} not allowed"),
            });
        }
        if let Ok(mut commands) = self.probe.commands.lock() {
            commands.push(command.clone());
        }
        Ok(())
    }

    fn close(&mut self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        if self.probe.panic_close.load(Ordering::SeqCst) {
            panic!("close exploded");
        }
    }
}

#[derive(Debug)]
pub struct CountingType {
    name: String,
    mode: MultiplayerMode,
    pub ticks: AtomicUsize,
    pub fail: AtomicBool,
}

impl CountingType {
    pub fn new(name: &str, mode: MultiplayerMode) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            mode,
            ticks: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn single(name: &str) -> Arc<Self> {
        Self::new(name, MultiplayerMode::Single)
    }

    pub fn shared(name: &str) -> Arc<Self> {
        Self::new(name, MultiplayerMode::Shared)
    }

    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl GameType for CountingType {
    fn name(&self) -> &str {
        &self.name
    }

    fn multiplayer(&self) -> MultiplayerMode {
        self.mode
    }

    fn board_size(&self) -> u32 {
        15
    }

    fn decoder(&self) -> Value {
        json!({ "plots": ["none", "hero"] })
    }

    fn tick(&self) -> Result<(), GameError> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GameError::simulation("type tick refused"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CountingSpy {
    pub acts: AtomicUsize,
}

impl PlayerSpy for CountingSpy {
    fn act(&self) {
        self.acts.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn player(name: &str, game_type: &Arc<CountingType>) -> Player {
    Player::new(name, ScoreCard::default(), Arc::clone(game_type) as Arc<dyn GameType>)
}

pub fn scored_player(name: &str, score: i64, game_type: &Arc<CountingType>) -> Player {
    Player::new(name, ScoreCard::new(score), Arc::clone(game_type) as Arc<dyn GameType>)
}
