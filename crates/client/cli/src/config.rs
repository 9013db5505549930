//! Simulator configuration read from the process environment.
use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use battle_core::MissionModifiers;
use battle_runtime::{EventBus, RuntimeConfig};

/// Everything `battle-sim` needs to run one encounter.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub content_dir: PathBuf,
    /// Falls back to the first mission id in sorted order.
    pub mission_id: Option<String>,
    pub difficulty: Option<String>,
    pub modifiers: MissionModifiers,
    pub seed: Option<u64>,
    pub speed: u32,
    pub auto_mode: bool,
    /// Overrides `tick_interval_ms` from `battle.toml`.
    pub tick_ms: Option<u64>,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub command_buffer: usize,
    pub event_buffer: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            content_dir: PathBuf::from("data"),
            mission_id: None,
            difficulty: None,
            modifiers: MissionModifiers::empty(),
            seed: None,
            speed: 1,
            auto_mode: false,
            tick_ms: None,
            session_id: None,
            log_dir: None,
            command_buffer: runtime.command_buffer_size,
            event_buffer: EventBus::DEFAULT_CAPACITY,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONTENT_DIR` - Directory with the content files (default: `data`)
    /// - `BATTLE_MISSION_ID` - Mission to play (default: first mission)
    /// - `BATTLE_DIFFICULTY` - Difficulty key (default: `normal`)
    /// - `BATTLE_MODIFIERS` - Comma list such as `hard,no_jutsu`
    /// - `BATTLE_SEED` - Battle seed (default: random)
    /// - `BATTLE_SPEED` - Initial speed multiplier, 1-3 (default: 1)
    /// - `BATTLE_AUTO` - Let the engine AI drive player units (default: false)
    /// - `BATTLE_TICK_MS` - Tick interval override
    /// - `BATTLE_SESSION_ID` - Log directory name (default: timestamp)
    /// - `BATTLE_LOG_DIR` - Log root (default: platform cache dir)
    /// - `BATTLE_COMMAND_BUFFER` - Command queue size
    /// - `BATTLE_EVENT_BUFFER` - Event capacity per topic
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = read("BATTLE_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        config.mission_id = read("BATTLE_MISSION_ID");
        config.difficulty = read("BATTLE_DIFFICULTY");

        if let Some(list) = read("BATTLE_MODIFIERS") {
            config.modifiers = MissionModifiers::parse_list(&list)
                .map_err(|e| anyhow!("Failed to parse BATTLE_MODIFIERS: {}", e))?;
        }

        config.seed = parse(&read, "BATTLE_SEED")?;
        if let Some(speed) = parse::<u32>(&read, "BATTLE_SPEED")? {
            config.speed = speed.clamp(1, 3);
        }

        // Setting the variable without a value also enables auto mode.
        if let Some(enable) = parse::<bool>(&read, "BATTLE_AUTO").ok().flatten() {
            config.auto_mode = enable;
        } else if lookup("BATTLE_AUTO").is_some() {
            config.auto_mode = true;
        }

        config.tick_ms = parse::<u64>(&read, "BATTLE_TICK_MS")?.map(|ms| ms.max(1));
        config.session_id = read("BATTLE_SESSION_ID");
        config.log_dir = read("BATTLE_LOG_DIR").map(PathBuf::from);

        if let Some(capacity) = parse::<usize>(&read, "BATTLE_COMMAND_BUFFER")? {
            config.command_buffer = capacity.max(1);
        }
        if let Some(capacity) = parse::<usize>(&read, "BATTLE_EVENT_BUFFER")? {
            config.event_buffer = capacity.max(1);
        }

        Ok(config)
    }
}

fn parse<T>(read: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    read(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| anyhow!("Failed to parse {}='{}': {}", key, value, e))
        })
        .transpose()
}
