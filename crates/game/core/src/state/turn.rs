use super::UnitId;

/// Scheduler bookkeeping shared by all combatants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Unit holding the turn lock.
    pub current: Option<UnitId>,
    /// At most one unit acts while this is set.
    pub locked: bool,
    /// Turns started so far; revive windows are measured against it.
    pub global_turn: u64,
    /// Gauge speed factor: 1, 2 or 3.
    pub speed_multiplier: u32,
    /// Session-wide pause; ticks are ignored while set.
    pub paused: bool,
    /// Engine AI plays player units too.
    pub auto_mode: bool,
}

impl TurnState {
    pub const SPEED_STEPS: [u32; 3] = [1, 2, 3];

    pub fn new() -> Self {
        Self {
            current: None,
            locked: false,
            global_turn: 0,
            speed_multiplier: 1,
            paused: false,
            auto_mode: false,
        }
    }

    /// Advances 1 -> 2 -> 3 -> 1 and returns the new value.
    pub fn cycle_speed(&mut self) -> u32 {
        self.speed_multiplier = match self.speed_multiplier {
            1 => 2,
            2 => 3,
            _ => 1,
        };
        self.speed_multiplier
    }

    /// Sets the multiplier, snapping invalid values to 1.
    pub fn set_speed(&mut self, multiplier: u32) {
        self.speed_multiplier = if Self::SPEED_STEPS.contains(&multiplier) {
            multiplier
        } else {
            1
        };
    }

    pub fn is_acting(&self, unit: UnitId) -> bool {
        self.locked && self.current == Some(unit)
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
