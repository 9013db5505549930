//! Authoritative battle state representation.
//!
//! This module owns the unit records, the roster, status effects and turn
//! bookkeeping. Hosts clone or query this state but mutate it exclusively
//! through the engine and the session.
mod modifiers;
mod passives;
mod roster;
mod status;
mod turn;
mod unit;

pub use modifiers::MissionModifiers;
pub use passives::{
    Ability, DEFAULT_ELEMENT_REDUCTION_PERCENT, PassiveFlags, Passives, SPEED_UP_BONUS,
};
pub use roster::{MAX_COMBATANTS, Roster, RosterError, SwapError};
pub use status::{
    AddStatusOutcome, BuffPayload, BuffStacking, StackingMode, StatusEffect, StatusEffects,
    StatusKind, StatusPayload, StatusProfile, StatusTick,
};
pub use turn::TurnState;
pub use unit::{ChakraMode, Side, Unit, UnitId, UnitProfile, UnitStats};

/// Canonical snapshot of the deterministic battle state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    /// RNG seed for deterministic random generation.
    ///
    /// Set once when the session is built and never modified.
    /// Combined with `nonce` to derive a unique seed for each roll.
    pub seed: u64,

    /// Roll counter, incremented before every random draw.
    pub nonce: u64,

    /// Sequential unit ID allocator (monotonically increasing, never reused).
    next_unit_id: u32,

    pub roster: Roster,
    pub turn: TurnState,
    pub modifiers: MissionModifiers,
}

impl BattleState {
    pub fn new(seed: u64, modifiers: MissionModifiers) -> Self {
        Self {
            seed,
            nonce: 0,
            next_unit_id: 1,
            roster: Roster::new(),
            turn: TurnState::new(),
            modifiers,
        }
    }

    /// Allocates a fresh unit id.
    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.saturating_add(1);
        id
    }

    /// Advances the roll counter and returns the value to seed the next draw.
    pub fn next_nonce(&mut self) -> u64 {
        self.nonce = self.nonce.wrapping_add(1);
        self.nonce
    }

    /// Unit currently holding the turn lock.
    pub fn acting_unit(&self) -> Option<&Unit> {
        if !self.turn.locked {
            return None;
        }
        self.turn.current.and_then(|id| self.roster.unit(id))
    }
}

impl Default for BattleState {
    fn default() -> Self {
        Self::new(0, MissionModifiers::empty())
    }
}
