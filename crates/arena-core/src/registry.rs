//! Ordered player-to-game bindings.
//!
//! The [`PlayerGameRegistry`] is the single owner of every live
//! [`Binding`]. Iteration order is insertion order; the tick pass relies on
//! it to pick shared-board representatives deterministically. The set of
//! game types in play is always derived from the current bindings and is
//! never stored on its own.

use std::fmt;
use std::sync::Arc;

use arena_types::BindingId;
use tracing::{debug, info};

use crate::control::ControlChannel;
use crate::error::GameError;
use crate::fault::{self, TickUnit, UnitOutcome};
use crate::game::{Game, GameType, Player};
use crate::statistics::Statistics;

/// Callback invoked with a player and its control channel when the player
/// is bound or unbound.
pub type PlayerHook = Arc<dyn Fn(&Player, &Arc<ControlChannel>) + Send + Sync>;

/// A player bound to its live game instance.
pub struct Binding {
    id: BindingId,
    player: Player,
    game: Box<dyn Game>,
    channel: Arc<ControlChannel>,
    /// Removal hook captured when the binding was created.
    on_remove: Option<PlayerHook>,
}

impl Binding {
    /// Registry identity of the binding.
    pub const fn id(&self) -> BindingId {
        self.id
    }

    /// The bound player.
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The player's game instance.
    pub fn game(&self) -> &dyn Game {
        self.game.as_ref()
    }

    /// Mutable access to the player's game instance.
    pub fn game_mut(&mut self) -> &mut dyn Game {
        self.game.as_mut()
    }

    /// The player's telemetry-wrapped control channel.
    pub const fn channel(&self) -> &Arc<ControlChannel> {
        &self.channel
    }

    /// Deliver queued commands to the game.
    pub(crate) fn tick(&mut self) -> Result<(), GameError> {
        let delivered = self.channel.deliver(self.game.as_mut())?;
        if delivered > 0 {
            debug!(player = self.player.name(), delivered, "Commands delivered");
        }
        Ok(())
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("player", &self.player)
            .field("game", &self.game.id())
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered collection of bindings.
pub struct PlayerGameRegistry {
    bindings: Vec<Binding>,
    statistics: Arc<dyn Statistics>,
    on_add: Option<PlayerHook>,
    on_remove: Option<PlayerHook>,
}

impl PlayerGameRegistry {
    /// Create an empty registry that reports telemetry to `statistics`.
    pub fn new(statistics: Arc<dyn Statistics>) -> Self {
        Self {
            bindings: Vec::new(),
            statistics,
            on_add: None,
            on_remove: None,
        }
    }

    /// The telemetry collector shared by every binding.
    pub const fn statistics(&self) -> &Arc<dyn Statistics> {
        &self.statistics
    }

    /// Register the hook called once for every newly bound player.
    pub fn on_add_player(&mut self, hook: PlayerHook) {
        self.on_add = Some(hook);
    }

    /// Register the hook called once for every unbound player.
    ///
    /// Bindings created before the call keep the hook that was registered
    /// when they were created.
    pub fn on_remove_player(&mut self, hook: PlayerHook) {
        self.on_remove = Some(hook);
    }

    /// Bind `player` to `game` and return the new binding.
    ///
    /// Duplicate player names are not checked here; callers must remove an
    /// existing binding first.
    #[allow(clippy::indexing_slicing)]
    pub fn add(&mut self, player: Player, game: Box<dyn Game>) -> &Binding {
        let spy = self.statistics.new_player(&player);
        let channel = Arc::new(ControlChannel::new(player.name(), spy));

        if let Some(hook) = &self.on_add {
            hook(&player, &channel);
        }

        info!(
            player = player.name(),
            game_type = player.game_name(),
            game = %game.id(),
            "Player bound"
        );

        // `index` is in bounds: the binding is pushed right below.
        let index = self.bindings.len();
        self.bindings.push(Binding {
            id: BindingId::new(),
            player,
            game,
            channel,
            on_remove: self.on_remove.clone(),
        });
        &self.bindings[index]
    }

    /// Unbind `player`. Does nothing if the player is not bound.
    pub fn remove(&mut self, player: &Player) -> bool {
        self.remove_by_name(player.name())
    }

    /// Unbind the named player. Returns whether a binding was removed.
    ///
    /// Teardown failures are logged at `warn`; the player stays unbound.
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        let Some(outcomes) = self.unbind(name) else {
            return false;
        };
        for outcome in &outcomes {
            outcome.log_failure();
        }
        true
    }

    /// Unbind the named player and return the outcome of each teardown
    /// step, or `None` if the player was not bound.
    ///
    /// The binding leaves the registry before any collaborator runs. The
    /// statistics collector forgets the player, the game is closed, and
    /// the removal hook fires, each as its own isolated unit.
    pub(crate) fn unbind(&mut self, name: &str) -> Option<Vec<UnitOutcome>> {
        let index = self.position(name)?;
        let mut binding = self.bindings.remove(index);
        let statistics = Arc::clone(&self.statistics);

        let forget = fault::isolate(TickUnit::Forget { player: name.to_owned() }, || {
            statistics.remove_player(name);
            Ok::<(), GameError>(())
        });
        let close = fault::isolate(TickUnit::Close { player: name.to_owned() }, || {
            binding.game.close();
            Ok::<(), GameError>(())
        });
        let mut outcomes = vec![forget, close];
        if let Some(hook) = binding.on_remove.clone() {
            outcomes.push(fault::isolate(
                TickUnit::RemoveHook { player: name.to_owned() },
                || {
                    hook(&binding.player, &binding.channel);
                    Ok::<(), GameError>(())
                },
            ));
        }

        info!(player = name, game_type = binding.player.game_name(), "Player unbound");
        Some(outcomes)
    }

    /// The binding for `name`, if bound.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.player.name() == name)
    }

    /// Mutable binding for `name`, if bound.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.iter_mut().find(|b| b.player.name() == name)
    }

    /// The binding with registry identity `id`, if still bound.
    pub fn by_id(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    /// Mutable binding with registry identity `id`, if still bound.
    pub fn by_id_mut(&mut self, id: BindingId) -> Option<&mut Binding> {
        self.bindings.iter_mut().find(|b| b.id == id)
    }

    /// Every bound player, in binding order.
    pub fn players(&self) -> Vec<Player> {
        self.bindings.iter().map(|b| b.player.clone()).collect()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no player is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Unbind every player, running each removal hook.
    pub fn clear(&mut self) {
        let names: Vec<String> = self
            .bindings
            .iter()
            .map(|b| b.player.name().to_owned())
            .collect();
        for name in &names {
            self.remove_by_name(name);
        }
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Identities of every binding, in order.
    pub fn ids(&self) -> Vec<BindingId> {
        self.bindings.iter().map(|b| b.id).collect()
    }

    /// Bindings of players declared for `game_type`, in insertion order.
    pub fn bindings_of_type(&self, game_type: &str) -> Vec<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.player.game_name() == game_type)
            .collect()
    }

    /// Distinct game types of the current bindings, in first-seen order.
    pub fn game_types(&self) -> Vec<Arc<dyn GameType>> {
        let mut types: Vec<Arc<dyn GameType>> = Vec::new();
        for binding in &self.bindings {
            let game_type = binding.player.game_type();
            if !types.iter().any(|seen| seen.name() == game_type.name()) {
                types.push(Arc::clone(game_type));
            }
        }
        types
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.player.name() == name)
    }
}

impl<'a> IntoIterator for &'a PlayerGameRegistry {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl fmt::Debug for PlayerGameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerGameRegistry")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::statistics::ActivityStatistics;
    use crate::testing::{CountingGame, CountingType, player};

    fn registry() -> PlayerGameRegistry {
        PlayerGameRegistry::new(Arc::new(ActivityStatistics::new()))
    }

    fn names(registry: &PlayerGameRegistry) -> Vec<String> {
        registry.iter().map(|b| b.player().name().to_owned()).collect()
    }

    #[test]
    fn add_keeps_insertion_order() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        reg.add(player("c", &snake), Box::new(CountingGame::new()));
        reg.add(player("a", &snake), Box::new(CountingGame::new()));
        reg.add(player("b", &snake), Box::new(CountingGame::new()));
        assert_eq!(names(&reg), vec!["c", "a", "b"]);
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_empty());
    }

    #[test]
    fn size_tracks_adds_minus_removes() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        let p1 = player("p1", &snake);
        let p2 = player("p2", &snake);
        reg.add(p1.clone(), Box::new(CountingGame::new()));
        reg.add(p2.clone(), Box::new(CountingGame::new()));
        assert!(reg.remove(&p1));
        assert!(!reg.remove(&p1));
        assert_eq!(reg.len(), 1);
        assert!(reg.remove(&p2));
        assert!(reg.is_empty());
    }

    #[test]
    fn get_unknown_is_none() {
        let reg = registry();
        assert!(reg.get("ghost").is_none());
    }

    #[test]
    fn get_returns_matching_binding() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        let id = reg.add(player("p1", &snake), Box::new(CountingGame::new())).id();
        let binding = reg.get("p1").unwrap();
        assert_eq!(binding.id(), id);
        assert_eq!(reg.by_id(id).unwrap().player().name(), "p1");
    }

    #[test]
    fn remove_closes_game_and_runs_hook_once() {
        let snake = CountingType::single("snake");
        let removed = Arc::new(Mutex::new(Vec::new()));
        let mut reg = registry();
        let sink = Arc::clone(&removed);
        reg.on_remove_player(Arc::new(move |p: &Player, _c: &Arc<ControlChannel>| {
            sink.lock().unwrap().push(p.name().to_owned());
        }));

        let game = CountingGame::new();
        let probe = Arc::clone(game.probe());
        let p1 = player("p1", &snake);
        reg.add(p1.clone(), Box::new(game));
        reg.remove(&p1);
        reg.remove(&p1);

        assert_eq!(*removed.lock().unwrap(), vec!["p1"]);
        assert_eq!(probe.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_teardown_still_unbinds_player() {
        let snake = CountingType::single("snake");
        let statistics = Arc::new(ActivityStatistics::new());
        let mut reg = PlayerGameRegistry::new(Arc::clone(&statistics) as Arc<dyn Statistics>);
        reg.on_remove_player(Arc::new(|_p: &Player, _c: &Arc<ControlChannel>| {
            panic!("hook exploded");
        }));
        let game = CountingGame::new();
        game.probe().panic_close.store(true, Ordering::SeqCst);
        reg.add(player("p1", &snake), Box::new(game));

        assert!(reg.remove_by_name("p1"));
        assert!(reg.is_empty());
        assert_eq!(statistics.tracked(), 0);
        assert!(!reg.remove_by_name("p1"));
    }

    #[test]
    fn unbind_reports_each_teardown_step() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        reg.on_remove_player(Arc::new(|_p: &Player, _c: &Arc<ControlChannel>| {}));
        let game = CountingGame::new();
        game.probe().panic_close.store(true, Ordering::SeqCst);
        reg.add(player("p1", &snake), Box::new(game));

        let outcomes = reg.unbind("p1").unwrap();
        let units: Vec<String> = outcomes.iter().map(|o| o.unit.to_string()).collect();
        assert_eq!(units, vec!["forget(p1)", "close(p1)", "remove_hook(p1)"]);
        let failed: Vec<bool> = outcomes.iter().map(|o| !o.is_ok()).collect();
        assert_eq!(failed, vec![false, true, false]);
        assert!(reg.unbind("p1").is_none());
    }

    #[test]
    fn add_hook_receives_channel() {
        let snake = CountingType::single("snake");
        let captured: Arc<Mutex<Option<Arc<ControlChannel>>>> = Arc::new(Mutex::new(None));
        let mut reg = registry();
        let sink = Arc::clone(&captured);
        reg.on_add_player(Arc::new(move |_p: &Player, c: &Arc<ControlChannel>| {
            *sink.lock().unwrap() = Some(Arc::clone(c));
        }));

        reg.add(player("p1", &snake), Box::new(CountingGame::new()));
        let channel = captured.lock().unwrap().clone().unwrap();
        channel.right();
        assert_eq!(reg.get("p1").unwrap().channel().pending(), 1);
    }

    #[test]
    fn binding_keeps_hook_from_creation_time() {
        let snake = CountingType::single("snake");
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut reg = registry();

        let first = Arc::clone(&calls);
        reg.on_remove_player(Arc::new(move |p: &Player, _c: &Arc<ControlChannel>| {
            first.lock().unwrap().push(format!("first:{}", p.name()));
        }));
        reg.add(player("early", &snake), Box::new(CountingGame::new()));

        let second = Arc::clone(&calls);
        reg.on_remove_player(Arc::new(move |p: &Player, _c: &Arc<ControlChannel>| {
            second.lock().unwrap().push(format!("second:{}", p.name()));
        }));
        reg.add(player("late", &snake), Box::new(CountingGame::new()));

        reg.clear();
        assert_eq!(*calls.lock().unwrap(), vec!["first:early", "second:late"]);
    }

    #[test]
    fn clear_removes_everyone() {
        let snake = CountingType::single("snake");
        let mut reg = registry();
        for name in ["a", "b", "c"] {
            reg.add(player(name, &snake), Box::new(CountingGame::new()));
        }
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.players().is_empty());
    }

    #[test]
    fn bindings_of_type_filters_in_order() {
        let snake = CountingType::single("snake");
        let board = CountingType::shared("board");
        let mut reg = registry();
        reg.add(player("s1", &snake), Box::new(CountingGame::new()));
        reg.add(player("b1", &board), Box::new(CountingGame::new()));
        reg.add(player("s2", &snake), Box::new(CountingGame::new()));

        let of_snake: Vec<&str> = reg
            .bindings_of_type("snake")
            .iter()
            .map(|b| b.player().name())
            .collect();
        assert_eq!(of_snake, vec!["s1", "s2"]);
        assert!(reg.bindings_of_type("chess").is_empty());
    }

    #[test]
    fn game_types_are_distinct_and_derived() {
        let snake = CountingType::single("snake");
        let board = CountingType::shared("board");
        let mut reg = registry();
        let b1 = player("b1", &board);
        reg.add(player("s1", &snake), Box::new(CountingGame::new()));
        reg.add(b1.clone(), Box::new(CountingGame::new()));
        reg.add(player("s2", &snake), Box::new(CountingGame::new()));

        let names: Vec<String> = reg.game_types().iter().map(|t| t.name().to_owned()).collect();
        assert_eq!(names, vec!["snake", "board"]);

        reg.remove(&b1);
        assert_eq!(reg.game_types().len(), 1);
    }

    #[test]
    fn removal_forgets_statistics() {
        let snake = CountingType::single("snake");
        let stats = Arc::new(ActivityStatistics::new());
        let mut reg = PlayerGameRegistry::new(stats.clone());
        let p1 = player("p1", &snake);
        reg.add(p1.clone(), Box::new(CountingGame::new()));
        assert_eq!(stats.tracked(), 1);
        reg.remove(&p1);
        assert_eq!(stats.tracked(), 0);
    }
}
