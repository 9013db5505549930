/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Gauge value at which a unit becomes ready to act.
    pub gauge_max: u32,
    /// Interval between scheduler ticks in the host loop.
    pub tick_interval_ms: u64,
    /// Window in which repeated clicks on the acting unit are counted together.
    pub click_window_ms: u64,
    /// Upper bound of every unit's chakra pool.
    pub max_chakra: u32,
    /// Starting gauges are drawn from `[0, initial_gauge_spread)`.
    pub initial_gauge_spread: u32,
    /// Speed above which speed sickness starts to accumulate.
    pub max_speed: u32,
    /// Excess speed per speed sickness stack.
    pub speed_sickness_step: u32,
    /// Time limit for the speed run modifier.
    pub speed_run_limit_ms: u64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Slots in the active team and in the bench.
    pub const TEAM_SIZE: usize = 4;
    /// Upper bound of enemies in a single wave.
    pub const MAX_ENEMIES: usize = 8;
    pub const MAX_SKILL_EFFECTS: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_GAUGE_MAX: u32 = 1200;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
    pub const DEFAULT_CLICK_WINDOW_MS: u64 = 400;
    pub const DEFAULT_MAX_CHAKRA: u32 = 10;
    pub const DEFAULT_INITIAL_GAUGE_SPREAD: u32 = 200;
    pub const DEFAULT_MAX_SPEED: u32 = 200;
    pub const DEFAULT_SPEED_SICKNESS_STEP: u32 = 50;
    pub const DEFAULT_SPEED_RUN_LIMIT_MS: u64 = 180_000;

    pub fn new() -> Self {
        Self {
            gauge_max: Self::DEFAULT_GAUGE_MAX,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            click_window_ms: Self::DEFAULT_CLICK_WINDOW_MS,
            max_chakra: Self::DEFAULT_MAX_CHAKRA,
            initial_gauge_spread: Self::DEFAULT_INITIAL_GAUGE_SPREAD,
            max_speed: Self::DEFAULT_MAX_SPEED,
            speed_sickness_step: Self::DEFAULT_SPEED_SICKNESS_STEP,
            speed_run_limit_ms: Self::DEFAULT_SPEED_RUN_LIMIT_MS,
        }
    }

    pub fn with_tick_interval(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms.max(1);
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
