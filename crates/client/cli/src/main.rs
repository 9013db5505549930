//! Battle simulator binary.
//!
//! Composition root that assembles:
//! 1. Content (characters, enemies, missions, team, engine config) from disk
//! 2. Runtime (battle logic) via `RuntimeBuilder`
//! 3. An event printer subscribed to every topic
//!
//! # Examples
//!
//! ```bash
//! # Auto battle on the first mission with a fixed seed
//! BATTLE_AUTO=true BATTLE_SEED=42 cargo run -p battle-cli
//!
//! # Hard mode of a specific mission, player turns chosen greedily
//! BATTLE_MISSION_ID=mission_001 BATTLE_MODIFIERS=hard cargo run -p battle-cli
//! ```
mod config;
mod logging;
mod printer;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_runtime::{EventBus, GreedyProvider, Runtime, RuntimeConfig, Topic};

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // 1. Load configuration from environment
    let config = CliConfig::from_env()?;

    // 2. Setup logging
    let _log_guard = logging::setup_logging(&config)?;

    // 3. Load content
    let factory = ContentFactory::new(&config.content_dir);
    let mut battle_config = factory.load_config()?;
    if let Some(tick_ms) = config.tick_ms {
        battle_config.tick_interval_ms = tick_ms;
    }
    let bundle = factory.load_bundle()?;
    let team = factory.load_team()?;

    for (mission, enemy) in bundle.unknown_enemy_refs() {
        tracing::warn!(%mission, %enemy, "unknown enemy id, fallback stats will be used");
    }

    let mission_id = match &config.mission_id {
        Some(id) => id.clone(),
        None => bundle
            .mission_ids()
            .first()
            .map(|id| id.to_string())
            .with_context(|| format!("no missions in {}", factory.data_dir().display()))?,
    };

    tracing::info!(
        content = %factory.data_dir().display(),
        characters = bundle.character_count(),
        enemies = bundle.enemy_count(),
        mission = %mission_id,
        auto = config.auto_mode,
        "Content loaded"
    );

    // 4. Build runtime
    let runtime_config = RuntimeConfig {
        battle_config,
        event_buffer_size: config.event_buffer,
        command_buffer_size: config.command_buffer,
        seed: config.seed,
    };
    // Subscribe before the worker starts so the printer sees every event.
    let event_bus = EventBus::with_capacity(config.event_buffer);
    let receivers = event_bus.subscribe_multiple(&Topic::ALL);
    let mut builder = Runtime::builder()
        .config(runtime_config)
        .event_bus(event_bus)
        .content(bundle)
        .mission(mission_id)
        .team(team)
        .modifiers(config.modifiers)
        .speed(config.speed)
        .auto_mode(config.auto_mode)
        .player_provider(GreedyProvider);
    if let Some(difficulty) = &config.difficulty {
        builder = builder.difficulty(difficulty.clone());
    }
    let mut runtime = builder.build().await?;

    // 5. Run, printing events as they arrive
    let printer = tokio::spawn(printer::print_events(receivers));
    let summary = runtime.run_to_completion().await?;
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "event printer failed");
    }

    println!();
    println!("{}", printer::summary_line(&summary));

    runtime.shutdown().await?;
    tracing::info!("Simulator shutdown complete");
    Ok(())
}
