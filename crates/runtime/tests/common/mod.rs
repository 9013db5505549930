//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::time::Duration;

use battle_content::ContentBundle;
use battle_core::{
    BaseStats, BattleConfig, BattleEvent, CharacterDefinition, EnemyTemplate, MissionDefinition,
    StageDefinition, TeamMember, TeamSpec, TierCode, WaveDefinition,
};
use battle_runtime::{Event, Runtime, RuntimeBuilder, RuntimeConfig};
use tokio::sync::broadcast;

/// Upper bound for any single test scenario.
pub const SCENARIO_TIMEOUT: Duration = Duration::from_secs(10);

fn character(id: &str, stats: BaseStats) -> CharacterDefinition {
    CharacterDefinition {
        id: id.into(),
        name: id.to_uppercase(),
        element: None,
        base_tier: TierCode::S5,
        stats: Some(stats),
        ..CharacterDefinition::default()
    }
}

fn enemy(id: &str, stats: BaseStats) -> EnemyTemplate {
    EnemyTemplate {
        id: id.into(),
        name: id.to_uppercase(),
        element: None,
        stats,
        abilities: Vec::new(),
    }
}

/// `stages[stage][wave]` lists enemy ids for the "normal" difficulty.
fn mission(id: &str, stages: &[&[&[&str]]]) -> MissionDefinition {
    let stages = stages
        .iter()
        .map(|waves| StageDefinition {
            name: None,
            waves: waves
                .iter()
                .map(|ids| WaveDefinition {
                    enemies: ids.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        })
        .collect();
    MissionDefinition {
        id: id.into(),
        name: id.into(),
        difficulties: vec![("normal".into(), stages)],
    }
}

pub fn content() -> ContentBundle {
    ContentBundle::new()
        .with_characters([
            character("hero", BaseStats::new(5000, 1000, 50, 150)),
            character("weakling", BaseStats::new(10, 1, 0, 100)),
        ])
        .with_enemies([
            enemy("dummy", BaseStats::new(100, 1, 0, 10)),
            enemy("ogre", BaseStats::new(100_000, 500, 500, 150)),
        ])
        .with_missions([
            mission("training", &[&[&["dummy"], &["dummy"]], &[&["dummy"]]]),
            mission("ogre_den", &[&[&["ogre"]]]),
        ])
}

pub fn team(ids: &[&str]) -> TeamSpec {
    TeamSpec {
        active: ids
            .iter()
            .enumerate()
            .map(|(slot, id)| TeamMember::new(*id, slot as u8))
            .collect(),
        ..TeamSpec::default()
    }
}

/// Fast ticks, a fixed seed and room for a whole encounter per topic.
pub fn config() -> RuntimeConfig {
    RuntimeConfig {
        battle_config: BattleConfig::default().with_tick_interval(1),
        event_buffer_size: 4096,
        command_buffer_size: 16,
        seed: Some(7),
    }
}

pub fn builder(mission_id: &str, ids: &[&str]) -> RuntimeBuilder {
    Runtime::builder()
        .config(config())
        .content(content())
        .mission(mission_id)
        .team(team(ids))
}

/// Everything currently buffered in `rx`.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn payloads(events: &[Event]) -> Vec<&BattleEvent> {
    events.iter().map(|e| &e.payload).collect()
}
