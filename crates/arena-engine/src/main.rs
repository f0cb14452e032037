//! Arena engine binary.
//!
//! Wires together configuration, the demo game types, the player
//! registry, and operator controls, then drives the platform on a
//! fixed-rate timer until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `arena-config.yaml`
//! 3. Create the platform with in-memory activity statistics
//! 4. Seed demo players from the `demo` section
//! 5. Create operator state and hook Ctrl-C to a clean stop
//! 6. Run the tick driver
//! 7. Log the result

mod battlefield;
mod dashboard;
mod demo;
mod error;
mod sprint;

use std::path::Path;
use std::sync::Arc;

use arena_core::PlayerGames;
use arena_core::config::ArenaConfig;
use arena_core::control::ControlChannel;
use arena_core::game::Player;
use arena_core::operator::OperatorState;
use arena_core::runner;
use arena_core::statistics::ActivityStatistics;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::dashboard::DashboardCallback;
use crate::demo::{Catalog, DemoConfig};
use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "arena-config.yaml";

/// Passes between scoreboard log lines.
const DASHBOARD_EVERY: u64 = 10;

/// Application entry point for the arena engine.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the demo roster
/// cannot be seeded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("arena-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    let demo_config = load_demo_config()?;
    info!(
        tick_interval_ms = config.engine.tick_interval_ms,
        max_ticks = config.engine.max_ticks,
        inactivity_enabled = config.inactivity.enabled,
        max_idle_ticks = config.inactivity.max_idle_ticks,
        "Configuration loaded"
    );

    // 3. Create the platform.
    let statistics = Arc::new(ActivityStatistics::new());
    let mut platform = PlayerGames::with_config(statistics, &config);
    platform.on_add_player(Arc::new(|player: &Player, _channel: &Arc<ControlChannel>| {
        info!(player = %player.name(), game = %player.game_name(), "Player joined");
    }));
    platform.on_remove_player(Arc::new(|player: &Player, _channel: &Arc<ControlChannel>| {
        info!(
            player = %player.name(),
            game = %player.game_name(),
            score = player.score(),
            "Player left"
        );
    }));

    // 4. Seed demo players.
    let catalog = Catalog::new(demo_config.board_size);
    let seeded = demo::seed_players(&catalog, &demo_config, &mut platform)?;
    let game_types = platform.game_types().len();
    info!(players = seeded, game_types, "Platform ready");

    let platform = platform.into_shared();

    // 5. Create operator state.
    let operator = Arc::new(OperatorState::new(&config.engine));
    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current pass");
                    operator.request_stop();
                }
                Err(e) => {
                    warn!(error = %e, "failed to listen for Ctrl-C, stop signal disabled");
                }
            }
        });
    }

    // 6. Run the tick driver.
    let mut callback = DashboardCallback::new(DASHBOARD_EVERY);
    let result = runner::run_platform(&platform, &operator, &mut callback).await;

    // 7. Log results.
    runner::log_run_end(&result);

    let remaining = platform.lock().await.len();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        players = remaining,
        "arena-engine shutdown complete"
    );

    Ok(())
}

/// Load the platform configuration from `arena-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<ArenaConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = ArenaConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(ArenaConfig::parse("")?)
    }
}

/// Load the demo roster from `arena-config.yaml`.
///
/// Reads the `demo` section from the YAML config file. If the file
/// does not exist or lacks the `demo` key, defaults are used.
fn load_demo_config() -> Result<DemoConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(DemoConfig::default());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Demo {
        message: format!("failed to read config file: {e}"),
    })?;

    // Parse the full YAML and extract just the "demo" section.
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Demo {
        message: format!("failed to parse config YAML: {e}"),
    })?;

    raw.get("demo").map_or_else(
        || Ok(DemoConfig::default()),
        |demo_value| {
            serde_yml::from_value(demo_value.clone()).map_err(|e| EngineError::Demo {
                message: format!("failed to parse demo config: {e}"),
            })
        },
    )
}
