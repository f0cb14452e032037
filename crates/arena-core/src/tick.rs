//! Tick pass: the 5-phase loop that advances every bound game.
//!
//! Each pass runs these phases in order:
//!
//! 1. **Binding Input** -- deliver every binding's queued commands to its
//!    game and record them on the player's telemetry handle.
//!
//! 2. **Statistics** -- advance the shared statistics collector. When the
//!    inactivity policy is on, players idle for too long are unbound here;
//!    the idle query and each teardown step are isolated units.
//!
//! 3. **Reset** -- every game reporting game over starts a new round.
//!
//! 4. **Game Advance** -- per distinct game type, advance one representative
//!    instance (`Shared`) or every instance (`Single`); see
//!    [`crate::multiplayer`].
//!
//! 5. **Type Tick** -- advance each distinct game type's own step.
//!
//! Every unit of work is run through [`fault::isolate`], and each phase
//! iterates over a list of binding identities captured when the phase
//! starts. A unit that removes bindings (through a hook) cannot derail the
//! rest of the phase; a binding that disappears is skipped. A pass always
//! completes; failures are returned in the [`TickReport`] for the caller to
//! log.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arena_types::BindingId;
use tracing::{debug, info, warn};

use crate::config::InactivityConfig;
use crate::error::GameError;
use crate::fault::{self, TickUnit, UnitOutcome};
use crate::game::GameType;
use crate::multiplayer;
use crate::registry::PlayerGameRegistry;

/// Summary of a single tick pass.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// The pass number (1 for the first pass).
    pub tick: u64,
    /// Bindings present when the pass started.
    pub bindings: usize,
    /// Outcome of every unit of work, in execution order.
    pub outcomes: Vec<UnitOutcome>,
    /// Players unbound by the inactivity policy during this pass.
    pub removed_inactive: Vec<String>,
    /// Wall-clock duration of the pass.
    pub elapsed: Duration,
}

impl TickReport {
    /// Outcomes of units that failed.
    pub fn failures(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok())
    }

    /// Number of units that failed.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Number of game instances advanced in the Game Advance phase.
    pub fn games_advanced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.unit, TickUnit::Game { .. }))
            .count()
    }

    /// Log every failed unit at `warn`.
    pub fn log_failures(&self) {
        for failure in self.failures() {
            failure.log_failure();
        }
        if !self.removed_inactive.is_empty() {
            info!(
                tick = self.tick,
                removed = ?self.removed_inactive,
                "Inactive players removed"
            );
        }
    }
}

/// Drives tick passes over a [`PlayerGameRegistry`].
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    /// Completed passes.
    tick: u64,
    /// Inactivity disqualification policy.
    inactivity: InactivityConfig,
}

impl TickScheduler {
    /// Create a scheduler with the given inactivity policy.
    pub const fn new(inactivity: InactivityConfig) -> Self {
        Self {
            tick: 0,
            inactivity,
        }
    }

    /// Number of completed passes.
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The inactivity policy in force.
    pub const fn inactivity(&self) -> InactivityConfig {
        self.inactivity
    }

    /// Replace the inactivity policy.
    pub const fn set_inactivity(&mut self, inactivity: InactivityConfig) {
        self.inactivity = inactivity;
    }

    /// Run one complete pass over `registry`.
    ///
    /// Never fails and never panics out; see the module docs for phases.
    pub fn run_tick(&mut self, registry: &mut PlayerGameRegistry) -> TickReport {
        let started = Instant::now();
        self.tick = self.tick.saturating_add(1);
        let tick = self.tick;
        let bindings = registry.len();
        let mut outcomes = Vec::new();

        // --- Phase 1: Binding Input ---
        phase_binding_input(registry, &mut outcomes);

        // --- Phase 2: Statistics ---
        let statistics = Arc::clone(registry.statistics());
        outcomes.push(fault::isolate(TickUnit::Statistics, || statistics.tick()));
        let removed_inactive = self.remove_inactive(registry, &mut outcomes);

        // --- Phase 3: Reset ---
        phase_reset(registry, &mut outcomes);

        // --- Phase 4: Game Advance ---
        phase_game_advance(registry, &mut outcomes);

        // --- Phase 5: Type Tick ---
        phase_type_tick(registry, &mut outcomes);

        let elapsed = started.elapsed();
        debug!(
            tick,
            bindings,
            units = outcomes.len(),
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "Tick pass complete"
        );

        TickReport {
            tick,
            bindings,
            outcomes,
            removed_inactive,
            elapsed,
        }
    }

    /// Unbind players idle past the policy threshold. No-op when disabled.
    ///
    /// The idle query and every teardown step are isolated units whose
    /// outcomes land in `outcomes`.
    fn remove_inactive(
        &self,
        registry: &mut PlayerGameRegistry,
        outcomes: &mut Vec<UnitOutcome>,
    ) -> Vec<String> {
        if !self.inactivity.enabled {
            return Vec::new();
        }
        let statistics = Arc::clone(registry.statistics());
        let max_idle_ticks = self.inactivity.max_idle_ticks;
        let mut idle = Vec::new();
        outcomes.push(fault::isolate(TickUnit::Statistics, || {
            idle = statistics.players_idle_for(max_idle_ticks);
            Ok::<(), GameError>(())
        }));

        let mut removed = Vec::new();
        for name in idle {
            let Some(teardown) = registry.unbind(&name) else {
                continue;
            };
            warn!(player = %name, max_idle_ticks, "Player disqualified for inactivity");
            outcomes.extend(teardown);
            removed.push(name);
        }
        removed
    }
}

/// Phase 1: deliver queued commands for every binding.
fn phase_binding_input(registry: &mut PlayerGameRegistry, outcomes: &mut Vec<UnitOutcome>) {
    for id in registry.ids() {
        let Some(binding) = registry.by_id_mut(id) else {
            continue;
        };
        let unit = TickUnit::Binding {
            player: binding.player().name().to_owned(),
        };
        outcomes.push(fault::isolate(unit, || binding.tick()));
    }
}

/// Phase 3: start a new round for every game that is over.
fn phase_reset(registry: &mut PlayerGameRegistry, outcomes: &mut Vec<UnitOutcome>) {
    for id in registry.ids() {
        let Some(binding) = registry.by_id_mut(id) else {
            continue;
        };
        let player = binding.player().name().to_owned();
        let game = binding.game_mut();
        let mut reset = false;
        let outcome = fault::isolate(TickUnit::Reset { player: player.clone() }, || {
            if game.is_game_over() {
                reset = true;
                game.new_game()
            } else {
                Ok(())
            }
        });
        if reset {
            debug!(player = %player, "Game over, new round started");
        }
        outcomes.push(outcome);
    }
}

/// Phase 4: advance the selected instances of each game type.
fn phase_game_advance(registry: &mut PlayerGameRegistry, outcomes: &mut Vec<UnitOutcome>) {
    let selected: Vec<BindingId> = registry
        .game_types()
        .iter()
        .flat_map(|game_type| {
            let bound: Vec<BindingId> = registry
                .bindings_of_type(game_type.name())
                .iter()
                .map(|binding| binding.id())
                .collect();
            multiplayer::select(multiplayer::classify(game_type.as_ref()), &bound).into_vec()
        })
        .collect();

    for id in selected {
        let Some(binding) = registry.by_id_mut(id) else {
            continue;
        };
        let unit = TickUnit::Game {
            player: binding.player().name().to_owned(),
        };
        outcomes.push(fault::isolate(unit, || binding.game_mut().tick()));
    }
}

/// Phase 5: advance each distinct game type once.
fn phase_type_tick(registry: &PlayerGameRegistry, outcomes: &mut Vec<UnitOutcome>) {
    let game_types: Vec<Arc<dyn GameType>> = registry.game_types();
    for game_type in game_types {
        let unit = TickUnit::GameType {
            name: game_type.name().to_owned(),
        };
        outcomes.push(fault::isolate(unit, || game_type.tick()));
    }
}
