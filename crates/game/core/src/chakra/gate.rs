use std::collections::BTreeMap;

use crate::config::BattleConfig;
use crate::state::{ChakraMode, Unit, UnitId};

/// Chakra needed to enter each mode.
pub const JUTSU_THRESHOLD: u32 = 4;
pub const ULTIMATE_THRESHOLD: u32 = 8;
pub const SECRET_THRESHOLD: u32 = 10;

/// Mode reached with `clicks` consecutive clicks and the chakra it needs.
pub const fn mode_for_clicks(clicks: u8) -> Option<(ChakraMode, u32)> {
    match clicks {
        1 => Some((ChakraMode::Jutsu, JUTSU_THRESHOLD)),
        2 => Some((ChakraMode::Ultimate, ULTIMATE_THRESHOLD)),
        3 => Some((ChakraMode::Secret, SECRET_THRESHOLD)),
        _ => None,
    }
}

/// Click state of one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickTrack {
    pub count: u8,
    /// Mode falls back to NONE once the clock reaches this value.
    pub deadline_ms: u64,
}

/// Result of a single click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateOutcome {
    /// Mode after the click; NONE when the click failed the chakra check.
    pub mode: ChakraMode,
    /// Click count that was evaluated.
    pub clicks: u8,
    /// Previously clicked unit whose count was dropped by this click.
    pub superseded: Option<UnitId>,
}

/// Click-count state machine keyed by unit.
///
/// ```text
/// NONE --1 click, chakra >= 4--> JUTSU --click, >= 8--> ULTIMATE --click, >= 10--> SECRET
///   ^                              |                       |                          |
///   +------ window elapsed, insufficient chakra, or another unit clicked -------------+
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChakraGate {
    window_ms: u64,
    tracks: BTreeMap<UnitId, ClickTrack>,
    last_clicked: Option<UnitId>,
}

impl ChakraGate {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            tracks: BTreeMap::new(),
            last_clicked: None,
        }
    }

    pub fn from_config(config: &BattleConfig) -> Self {
        Self::new(config.click_window_ms)
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn track(&self, unit: UnitId) -> Option<&ClickTrack> {
        self.tracks.get(&unit)
    }

    /// Registers a click on `unit` at `now_ms` and updates its chakra mode.
    ///
    /// Chakra is never spent here; the mode only selects what the next
    /// target click executes.
    pub fn click(&mut self, unit: &mut Unit, now_ms: u64) -> GateOutcome {
        let superseded = match self.last_clicked {
            Some(previous) if previous != unit.id => {
                self.tracks.remove(&previous);
                Some(previous)
            }
            _ => None,
        };
        self.last_clicked = Some(unit.id);

        let track = self.tracks.entry(unit.id).or_insert(ClickTrack {
            count: 0,
            deadline_ms: now_ms,
        });
        if track.count > 0 && now_ms >= track.deadline_ms {
            track.count = 0;
        }
        track.count = track.count.saturating_add(1);
        let clicks = track.count;

        match mode_for_clicks(clicks) {
            Some((mode, required)) if unit.chakra >= required => {
                track.deadline_ms = now_ms.saturating_add(self.window_ms);
                unit.chakra_mode = mode;
                GateOutcome {
                    mode,
                    clicks,
                    superseded,
                }
            }
            _ => {
                self.reset(unit);
                GateOutcome {
                    mode: ChakraMode::None,
                    clicks,
                    superseded,
                }
            }
        }
    }

    /// Drops tracks whose window has elapsed and returns their units.
    ///
    /// The caller resets the chakra mode of every returned unit.
    pub fn expired(&mut self, now_ms: u64) -> Vec<UnitId> {
        let expired: Vec<UnitId> = self
            .tracks
            .iter()
            .filter(|(_, track)| now_ms >= track.deadline_ms)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.tracks.remove(id);
            if self.last_clicked == Some(*id) {
                self.last_clicked = None;
            }
        }
        expired
    }

    /// Returns `unit` to NONE and forgets its clicks.
    pub fn reset(&mut self, unit: &mut Unit) {
        unit.chakra_mode = ChakraMode::None;
        self.forget(unit.id);
    }

    /// Forgets the clicks of `unit` without touching its mode.
    pub fn forget(&mut self, unit: UnitId) {
        self.tracks.remove(&unit);
        if self.last_clicked == Some(unit) {
            self.last_clicked = None;
        }
    }

    /// Drops all tracking, e.g. when the session ends.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.last_clicked = None;
    }
}
