//! Active team, bench and enemy wave.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{Side, Unit, UnitId};

/// Upper bound of units taking part in the gauge race.
pub const MAX_COMBATANTS: usize = BattleConfig::TEAM_SIZE + BattleConfig::MAX_ENEMIES;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Group {
    Active,
    Bench,
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("{group} is full ({capacity} units)")]
    Full {
        group: &'static str,
        capacity: usize,
    },
}

impl BattleError for RosterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("unit {0} is not in the active team")]
    NotActive(UnitId),

    #[error("unit {0} is not on the bench")]
    NotOnBench(UnitId),

    #[error("bench unit {0} is defeated")]
    BenchUnitDefeated(UnitId),

    #[error("unit {0} is taking its turn")]
    UnitActing(UnitId),

    #[error("slot mismatch: active slot {active}, bench slot {bench}")]
    SlotMismatch { active: u8, bench: u8 },
}

impl BattleError for SwapError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnitActing(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }
}

/// All units of an encounter and the derived combatant order.
///
/// The combatant list is active team then enemies, skipping bench and
/// inactive units. Its order decides ties between ready units.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    active: ArrayVec<Unit, { BattleConfig::TEAM_SIZE }>,
    bench: ArrayVec<Unit, { BattleConfig::TEAM_SIZE }>,
    enemies: ArrayVec<Unit, { BattleConfig::MAX_ENEMIES }>,
    combatants: ArrayVec<UnitId, MAX_COMBATANTS>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Unit] {
        &self.active
    }

    pub fn bench(&self) -> &[Unit] {
        &self.bench
    }

    pub fn enemies(&self) -> &[Unit] {
        &self.enemies
    }

    pub fn combatants(&self) -> &[UnitId] {
        &self.combatants
    }

    pub fn push_active(&mut self, mut unit: Unit) -> Result<(), RosterError> {
        unit.is_bench = false;
        unit.is_active = true;
        self.active.try_push(unit).map_err(|_| RosterError::Full {
            group: "active team",
            capacity: BattleConfig::TEAM_SIZE,
        })?;
        self.rebuild_combatants();
        Ok(())
    }

    pub fn push_bench(&mut self, mut unit: Unit) -> Result<(), RosterError> {
        unit.is_bench = true;
        unit.is_active = false;
        self.bench.try_push(unit).map_err(|_| RosterError::Full {
            group: "bench",
            capacity: BattleConfig::TEAM_SIZE,
        })
    }

    /// Replaces the enemy wave.
    pub fn set_enemies(&mut self, units: Vec<Unit>) -> Result<(), RosterError> {
        if units.len() > BattleConfig::MAX_ENEMIES {
            return Err(RosterError::Full {
                group: "enemy wave",
                capacity: BattleConfig::MAX_ENEMIES,
            });
        }
        self.enemies.clear();
        self.enemies.extend(units);
        self.rebuild_combatants();
        Ok(())
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.active.iter_mut()
    }

    /// Active and bench units.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.active.iter_mut().chain(self.bench.iter_mut())
    }

    pub fn enemies_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.enemies.iter_mut()
    }

    /// Every unit, bench included.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.active
            .iter()
            .chain(self.bench.iter())
            .chain(self.enemies.iter())
    }

    fn locate(&self, id: UnitId) -> Option<(Group, usize)> {
        if let Some(index) = self.active.iter().position(|u| u.id == id) {
            return Some((Group::Active, index));
        }
        if let Some(index) = self.bench.iter().position(|u| u.id == id) {
            return Some((Group::Bench, index));
        }
        self.enemies
            .iter()
            .position(|u| u.id == id)
            .map(|index| (Group::Enemy, index))
    }

    fn group_mut(&mut self, group: Group) -> &mut [Unit] {
        match group {
            Group::Active => self.active.as_mut_slice(),
            Group::Bench => self.bench.as_mut_slice(),
            Group::Enemy => self.enemies.as_mut_slice(),
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        let (group, index) = self.locate(id)?;
        self.group_mut(group).get_mut(index)
    }

    /// Two distinct units borrowed mutably at once.
    pub fn pair_mut(&mut self, first: UnitId, second: UnitId) -> Option<(&mut Unit, &mut Unit)> {
        if first == second {
            return None;
        }
        let (group_a, a) = self.locate(first)?;
        let (group_b, b) = self.locate(second)?;

        if group_a == group_b {
            let units = self.group_mut(group_a);
            return if a < b {
                let (head, tail) = units.split_at_mut(b);
                Some((&mut head[a], &mut tail[0]))
            } else {
                let (head, tail) = units.split_at_mut(a);
                Some((&mut tail[0], &mut head[b]))
            };
        }

        let Roster {
            active,
            bench,
            enemies,
            ..
        } = self;
        let (left, right): (&mut [Unit], &mut [Unit]) = match (group_a, group_b) {
            (Group::Active, Group::Bench) => (active.as_mut_slice(), bench.as_mut_slice()),
            (Group::Active, Group::Enemy) => (active.as_mut_slice(), enemies.as_mut_slice()),
            (Group::Bench, Group::Active) => (bench.as_mut_slice(), active.as_mut_slice()),
            (Group::Bench, Group::Enemy) => (bench.as_mut_slice(), enemies.as_mut_slice()),
            (Group::Enemy, Group::Active) => (enemies.as_mut_slice(), active.as_mut_slice()),
            (Group::Enemy, Group::Bench) => (enemies.as_mut_slice(), bench.as_mut_slice()),
            _ => return None,
        };
        Some((&mut left[a], &mut right[b]))
    }

    /// Living units of `side` that take part in combat, in roster order.
    pub fn living(&self, side: Side) -> Vec<UnitId> {
        let group = match side {
            Side::Player => self.active.as_slice(),
            Side::Enemy => self.enemies.as_slice(),
        };
        group
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.id)
            .collect()
    }

    /// Whether every fielded unit of `side` has hp 0.
    pub fn is_wiped(&self, side: Side) -> bool {
        self.living(side).is_empty()
    }

    /// Fallen fielded units of `side`.
    pub fn fallen(&self, side: Side) -> Vec<UnitId> {
        let group = match side {
            Side::Player => self.active.as_slice(),
            Side::Enemy => self.enemies.as_slice(),
        };
        group
            .iter()
            .filter(|u| !u.is_alive())
            .map(|u| u.id)
            .collect()
    }

    /// Recomputes the combatant order from active team and enemies.
    pub fn rebuild_combatants(&mut self) {
        self.combatants = self
            .active
            .iter()
            .chain(self.enemies.iter())
            .filter(|u| !u.is_bench && u.is_active)
            .map(|u| u.id)
            .collect();
    }

    /// Exchanges an active unit with the bench unit of the same slot.
    ///
    /// `acting` is the unit currently holding the turn lock, if any.
    pub fn swap(
        &mut self,
        active_id: UnitId,
        bench_id: UnitId,
        acting: Option<UnitId>,
    ) -> Result<(), SwapError> {
        let Some(active_index) = self.active.iter().position(|u| u.id == active_id) else {
            return Err(SwapError::NotActive(active_id));
        };
        let Some(bench_index) = self.bench.iter().position(|u| u.id == bench_id) else {
            return Err(SwapError::NotOnBench(bench_id));
        };
        if acting == Some(active_id) {
            return Err(SwapError::UnitActing(active_id));
        }

        let outgoing = &self.active[active_index];
        let incoming = &self.bench[bench_index];
        if !incoming.is_alive() {
            return Err(SwapError::BenchUnitDefeated(bench_id));
        }
        if outgoing.slot != incoming.slot {
            return Err(SwapError::SlotMismatch {
                active: outgoing.slot,
                bench: incoming.slot,
            });
        }

        core::mem::swap(&mut self.active[active_index], &mut self.bench[bench_index]);

        let incoming = &mut self.active[active_index];
        incoming.is_bench = false;
        incoming.is_active = true;
        incoming.speed_gauge = 0;
        incoming.is_paused = acting.is_some();

        let outgoing = &mut self.bench[bench_index];
        outgoing.is_bench = true;
        outgoing.is_active = false;
        outgoing.reset_turn_state();

        self.rebuild_combatants();
        Ok(())
    }
}
