//! Discrete battle events for presentation layers.
//!
//! The engine computes every hit synchronously and reports what happened as
//! an ordered list of events. A multi-target skill emits one [`BattleEvent::Damage`]
//! per struck unit in strike order; the consumer decides how to pace them.

use crate::session::BattleSummary;
use crate::state::{ChakraMode, StatusKind, UnitId};

/// Action kinds reported in [`BattleEvent::ActionPerformed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionKind {
    Attack,
    Guard,
    Jutsu,
    Ultimate,
    Secret,
    MultiAttack,
    MultiJutsu,
    Combo,
    LastStand,
}

/// Where a damage number came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageSource {
    Hit { attacker: UnitId },
    Status(StatusKind),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    // ========================================================================
    // Turn flow
    // ========================================================================
    TurnStarted {
        unit: UnitId,
        global_turn: u64,
    },
    /// A player unit holds the turn and waits for clicks.
    AwaitingInput {
        unit: UnitId,
    },
    TurnSkipped {
        unit: UnitId,
        reason: StatusKind,
    },
    TurnEnded {
        unit: UnitId,
    },

    // ========================================================================
    // Combat
    // ========================================================================
    ActionPerformed {
        unit: UnitId,
        action: ActionKind,
        targets: Vec<UnitId>,
    },
    Damage {
        source: DamageSource,
        target: UnitId,
        amount: u32,
        is_critical: bool,
        absorbed: u32,
        remaining_hp: u32,
    },
    Dodged {
        attacker: UnitId,
        target: UnitId,
    },
    Healed {
        target: UnitId,
        amount: u32,
        remaining_hp: u32,
    },
    Guarding {
        unit: UnitId,
    },
    UnitDefeated {
        unit: UnitId,
    },
    UnitRevived {
        unit: UnitId,
        hp: u32,
    },

    // ========================================================================
    // Status effects
    // ========================================================================
    StatusApplied {
        unit: UnitId,
        kind: StatusKind,
        turns: u32,
    },
    StatusNullified {
        unit: UnitId,
        kind: StatusKind,
    },
    StatusExpired {
        unit: UnitId,
        kind: StatusKind,
    },
    StatusCleansed {
        unit: UnitId,
        kinds: Vec<StatusKind>,
    },
    BuffApplied {
        unit: UnitId,
        tag: String,
        turns: u32,
    },

    // ========================================================================
    // Chakra
    // ========================================================================
    ChakraChanged {
        unit: UnitId,
        chakra: u32,
        delta: i32,
    },
    ChakraModeChanged {
        unit: UnitId,
        mode: ChakraMode,
    },
    /// Enough straight basic attacks to fire the unit's Last Stand.
    LastStandReady {
        unit: UnitId,
    },

    // ========================================================================
    // Encounter
    // ========================================================================
    Swapped {
        outgoing: UnitId,
        incoming: UnitId,
    },
    WaveStarted {
        stage: usize,
        wave: usize,
        enemies: Vec<UnitId>,
    },
    StageCleared {
        stage: usize,
    },
    SpeedRunFailed {
        elapsed_ms: u64,
    },
    Victory {
        summary: BattleSummary,
    },
    Defeat {
        summary: BattleSummary,
    },

    // ========================================================================
    // Session controls
    // ========================================================================
    Paused,
    Resumed,
    SpeedChanged {
        multiplier: u32,
    },
    AutoModeChanged {
        enabled: bool,
    },
}

impl BattleEvent {
    /// Whether the event ends the encounter.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Victory { .. } | Self::Defeat { .. })
    }
}

/// Receives events as the engine produces them.
pub trait EventSink: Send {
    fn emit(&mut self, event: BattleEvent);
}

impl EventSink for Vec<BattleEvent> {
    fn emit(&mut self, event: BattleEvent) {
        self.push(event);
    }
}
