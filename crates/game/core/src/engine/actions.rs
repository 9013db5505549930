//! Action execution for the acting unit.
//!
//! Every action validates first and mutates second: a rejected action leaves
//! chakra, hp and statuses untouched. Actions never end the turn themselves;
//! the caller decides whether a failure wastes the turn or allows a retry.

use crate::combat::calculate_damage;
use crate::error::{BattleError, ErrorSeverity};
use crate::events::{ActionKind, BattleEvent, DamageSource};
use crate::skill::{
    BuffTarget, EffectTarget, LastStandEffect, LastStandTarget, Multiplier, SecretEffects,
    SkillEffect, SkillEffects, SkillSlot, is_unlocked, resolve_skill,
};
use crate::state::{AddStatusOutcome, MissionModifiers, Side, StatusKind, StatusPayload, UnitId};

use super::BattleEngine;

/// Chakra gained by a basic or multi-target attack.
pub const ATTACK_CHAKRA_GAIN: u32 = 1;
/// Chakra gained by guarding.
pub const GUARD_CHAKRA_GAIN: u32 = 2;
/// Share of max hp restored by a revive.
pub const REVIVE_HP_PERCENT: u32 = 40;
/// Tag of a secret buff that names none.
pub const DEFAULT_SECRET_TAG: &str = "secret";

/// Errors that can occur while executing an action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unit {unit} needs {required} chakra but has {available}")]
    InsufficientChakra {
        unit: UnitId,
        required: u32,
        available: u32,
    },

    #[error("unit {0} is not a living opponent")]
    InvalidTarget(UnitId),

    #[error("no living targets")]
    NoTargets,

    #[error("unit {0} cannot act")]
    CannotAct(UnitId),

    #[error("unit {unit} has no {slot} skill")]
    MissingSkill { unit: UnitId, slot: SkillSlot },

    #[error("unit {unit} has not unlocked its {slot} skill")]
    SkillLocked { unit: UnitId, slot: SkillSlot },

    #[error("unit {0} is sealed")]
    SkillSealed(UnitId),

    #[error("skills are disabled for player units in this mission")]
    SkillsDisabled,

    #[error("unit {0} does not hold the turn")]
    NotActing(UnitId),

    #[error("unit {0} has no last stand ready")]
    LastStandNotReady(UnitId),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InsufficientChakra { .. }
            | Self::InvalidTarget(_)
            | Self::NoTargets
            | Self::CannotAct(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientChakra { .. } => "ACTION_INSUFFICIENT_CHAKRA",
            Self::InvalidTarget(_) => "ACTION_INVALID_TARGET",
            Self::NoTargets => "ACTION_NO_TARGETS",
            Self::CannotAct(_) => "ACTION_CANNOT_ACT",
            Self::MissingSkill { .. } => "ACTION_MISSING_SKILL",
            Self::SkillLocked { .. } => "ACTION_SKILL_LOCKED",
            Self::SkillSealed(_) => "ACTION_SKILL_SEALED",
            Self::SkillsDisabled => "ACTION_SKILLS_DISABLED",
            Self::NotActing(_) => "ACTION_NOT_ACTING",
            Self::LastStandNotReady(_) => "ACTION_LAST_STAND_NOT_READY",
        }
    }
}

/// Owned copy of the skill data an action needs after chakra is spent.
#[derive(Clone, Debug)]
pub(super) struct PreparedSkill {
    pub cost: u32,
    pub multiplier: Multiplier,
    pub effects: SkillEffects,
    pub secret: Option<SecretEffects>,
}

impl<'a> BattleEngine<'a> {
    // ========================================================================
    // Basic actions
    // ========================================================================

    /// Single-target basic attack; gains 1 chakra.
    pub fn attack(&mut self, actor: UnitId, target: UnitId) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        self.ensure_target(actor, target)?;

        self.performed(actor, ActionKind::Attack, vec![target]);
        self.strike(actor, target, Multiplier::BASIC);
        self.reward_chakra(actor, ATTACK_CHAKRA_GAIN);
        Ok(())
    }

    /// Halves incoming damage until the unit's next turn; gains 2 chakra.
    pub fn guard(&mut self, actor: UnitId) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;

        if let Some(unit) = self.state.roster.unit_mut(actor) {
            unit.is_guarding = true;
        }
        self.performed(actor, ActionKind::Guard, Vec::new());
        self.emit(BattleEvent::Guarding { unit: actor });
        self.reward_chakra(actor, GUARD_CHAKRA_GAIN);
        Ok(())
    }

    /// Basic attack against every listed target; gains 1 chakra once.
    pub fn multi_attack(&mut self, actor: UnitId, targets: &[UnitId]) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        self.ensure_targets(actor, targets)?;

        self.performed(actor, ActionKind::MultiAttack, targets.to_vec());
        for &target in targets {
            self.strike(actor, target, Multiplier::BASIC);
        }
        self.reward_chakra(actor, ATTACK_CHAKRA_GAIN);
        Ok(())
    }

    /// Proximity combo at 0.6x; no chakra either way.
    pub fn combo(&mut self, actor: UnitId, targets: &[UnitId]) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        self.ensure_targets(actor, targets)?;

        self.performed(actor, ActionKind::Combo, targets.to_vec());
        for &target in targets {
            self.strike(actor, target, Multiplier::COMBO);
        }
        Ok(())
    }

    // ========================================================================
    // Skills
    // ========================================================================

    /// Single-target jutsu.
    pub fn jutsu(&mut self, actor: UnitId, target: UnitId) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        self.ensure_target(actor, target)?;
        let skill = self.prepare_skill(actor, SkillSlot::Jutsu)?;

        self.performed(actor, ActionKind::Jutsu, vec![target]);
        self.strike(actor, target, skill.multiplier);
        self.apply_effects(actor, &[target], &skill.effects);
        Ok(())
    }

    /// Jutsu cost and multiplier against every listed target.
    pub fn multi_jutsu(&mut self, actor: UnitId, targets: &[UnitId]) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        self.ensure_targets(actor, targets)?;
        let skill = self.prepare_skill(actor, SkillSlot::Jutsu)?;

        self.performed(actor, ActionKind::MultiJutsu, targets.to_vec());
        for &target in targets {
            self.strike(actor, target, skill.multiplier);
        }
        self.apply_effects(actor, targets, &skill.effects);
        Ok(())
    }

    /// Ultimate against every living opponent, one hit each in roster order.
    pub fn ultimate(&mut self, actor: UnitId) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        let targets = self.living_opponents(actor);
        if targets.is_empty() {
            return Err(ActionError::NoTargets);
        }
        let skill = self.prepare_skill(actor, SkillSlot::Ultimate)?;

        self.performed(actor, ActionKind::Ultimate, targets.clone());
        for &target in &targets {
            self.strike(actor, target, skill.multiplier);
        }
        self.apply_effects(actor, &targets, &skill.effects);
        Ok(())
    }

    /// Secret technique.
    ///
    /// An entry with support effects resolves them on its allies; an entry
    /// without them strikes every living opponent like an ultimate.
    pub fn secret(&mut self, actor: UnitId) -> Result<(), ActionError> {
        self.ensure_acting(actor)?;
        let skill = self.check_skill(actor, SkillSlot::Secret)?;

        match skill.secret {
            Some(ref support) => {
                self.spend_skill_chakra(actor, skill.cost);
                let allies = self.secret_targets(actor, support.target);
                self.performed(actor, ActionKind::Secret, allies);
                self.apply_secret(actor, support);
            }
            None => {
                let targets = self.living_opponents(actor);
                if targets.is_empty() {
                    return Err(ActionError::NoTargets);
                }
                self.spend_skill_chakra(actor, skill.cost);
                self.performed(actor, ActionKind::Secret, targets.clone());
                for &target in &targets {
                    self.strike(actor, target, skill.multiplier);
                }
                self.apply_effects(actor, &targets, &skill.effects);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Last Stand
    // ========================================================================

    /// Fires `unit`'s charged Last Stand.
    ///
    /// Does not need the turn lock and does not end anyone's turn. A single
    /// enemy Last Stand strikes `target`, or the first living enemy when none
    /// is given.
    pub fn last_stand(&mut self, unit: UnitId, target: Option<UnitId>) -> Result<(), ActionError> {
        let user = self
            .state
            .roster
            .unit(unit)
            .filter(|u| u.is_alive() && u.is_active && !u.is_bench)
            .ok_or(ActionError::CannotAct(unit))?;
        let ultimate = user
            .last_stand
            .as_ref()
            .filter(|charge| charge.is_ready())
            .map(|charge| charge.ultimate.clone())
            .ok_or(ActionError::LastStandNotReady(unit))?;

        let targets = match ultimate.target {
            LastStandTarget::AllEnemies => self.living_opponents(unit),
            LastStandTarget::AllAllies => self.state.roster.living(self.side_of(unit)),
            LastStandTarget::SingleEnemy => match target {
                Some(id) => {
                    self.ensure_target(unit, id)?;
                    vec![id]
                }
                None => self.living_opponents(unit).into_iter().take(1).collect(),
            },
        };
        if targets.is_empty() {
            return Err(ActionError::NoTargets);
        }

        if let Some(charge) = self
            .state
            .roster
            .unit_mut(unit)
            .and_then(|u| u.last_stand.as_mut())
        {
            charge.consume();
        }
        self.performed(unit, ActionKind::LastStand, targets.clone());

        if let Some(multiplier) = ultimate.multiplier {
            for _ in 0..ultimate.hits() {
                for &id in &targets {
                    if self.state.roster.unit(id).is_some_and(|u| u.is_alive()) {
                        self.strike(unit, id, multiplier);
                    }
                }
            }
        }

        for effect in &ultimate.effects {
            for &id in &targets {
                if !self.state.roster.unit(id).is_some_and(|u| u.is_alive()) {
                    continue;
                }
                match *effect {
                    LastStandEffect::MultiHit { .. } => {}
                    LastStandEffect::Heal { percent } => {
                        let Some(ally) = self.state.roster.unit_mut(id) else {
                            continue;
                        };
                        let healed = ally.apply_heal(percent_of(ally.stats.max_hp, percent));
                        let remaining_hp = ally.stats.hp;
                        self.emit(BattleEvent::Healed {
                            target: id,
                            amount: healed,
                            remaining_hp,
                        });
                    }
                    LastStandEffect::Status { kind, turns } => self.inflict(id, kind, turns),
                    LastStandEffect::Cleanse => {
                        let kinds = self
                            .state
                            .roster
                            .unit_mut(id)
                            .map(|u| u.statuses.cleanse(&[]))
                            .unwrap_or_default();
                        if !kinds.is_empty() {
                            self.emit(BattleEvent::StatusCleansed { unit: id, kinds });
                        }
                    }
                    LastStandEffect::ChakraDrain { percent } => {
                        let amount = self
                            .state
                            .roster
                            .unit(id)
                            .map_or(0, |u| percent_of(u.chakra, percent));
                        self.transfer_chakra(id, unit, amount);
                    }
                }
            }
        }
        Ok(())
    }

    /// Basic attacks charge the Last Stand; skills break the streak.
    fn track_last_stand(&mut self, unit: UnitId, action: ActionKind) {
        let Some(charge) = self
            .state
            .roster
            .unit_mut(unit)
            .and_then(|u| u.last_stand.as_mut())
        else {
            return;
        };
        let ready = match action {
            ActionKind::Attack | ActionKind::MultiAttack => charge.note_basic_attack(),
            ActionKind::Jutsu | ActionKind::MultiJutsu | ActionKind::Ultimate | ActionKind::Secret => {
                charge.break_streak();
                false
            }
            _ => false,
        };
        if ready {
            self.emit(BattleEvent::LastStandReady { unit });
        }
    }

    /// Whether `actor` could cast `slot` right now.
    pub fn can_use(&self, actor: UnitId, slot: SkillSlot) -> bool {
        self.check_skill(actor, slot).is_ok()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn ensure_acting(&self, actor: UnitId) -> Result<(), ActionError> {
        if !self.state.turn.is_acting(actor) {
            return Err(ActionError::NotActing(actor));
        }
        match self.state.roster.unit(actor) {
            Some(unit) if unit.is_alive() => Ok(()),
            _ => Err(ActionError::CannotAct(actor)),
        }
    }

    fn ensure_target(&self, actor: UnitId, target: UnitId) -> Result<(), ActionError> {
        if self.living_opponents(actor).contains(&target) {
            Ok(())
        } else {
            Err(ActionError::InvalidTarget(target))
        }
    }

    fn ensure_targets(&self, actor: UnitId, targets: &[UnitId]) -> Result<(), ActionError> {
        if targets.is_empty() {
            return Err(ActionError::NoTargets);
        }
        let living = self.living_opponents(actor);
        match targets.iter().find(|id| !living.contains(id)) {
            Some(&invalid) => Err(ActionError::InvalidTarget(invalid)),
            None => Ok(()),
        }
    }

    fn side_of(&self, unit: UnitId) -> Side {
        self.state
            .roster
            .unit(unit)
            .map(|u| u.side)
            .unwrap_or(Side::Player)
    }

    /// Living fielded units on the other side, in roster order.
    pub fn living_opponents(&self, actor: UnitId) -> Vec<UnitId> {
        self.state.roster.living(self.side_of(actor).opponent())
    }

    /// Skill data for `slot` if every gate passes. Does not mutate.
    fn check_skill(&self, actor: UnitId, slot: SkillSlot) -> Result<PreparedSkill, ActionError> {
        let unit = self
            .state
            .roster
            .unit(actor)
            .ok_or(ActionError::CannotAct(actor))?;

        if unit.is_player() && self.state.modifiers.contains(MissionModifiers::NO_JUTSU) {
            return Err(ActionError::SkillsDisabled);
        }
        if unit.statuses.prevents_skills() {
            return Err(ActionError::SkillSealed(actor));
        }
        let resolved = resolve_skill(unit, slot).ok_or(ActionError::MissingSkill {
            unit: actor,
            slot,
        })?;
        if !is_unlocked(unit, slot) {
            return Err(ActionError::SkillLocked { unit: actor, slot });
        }
        if unit.chakra < resolved.chakra_cost {
            return Err(ActionError::InsufficientChakra {
                unit: actor,
                required: resolved.chakra_cost,
                available: unit.chakra,
            });
        }

        Ok(PreparedSkill {
            cost: resolved.chakra_cost,
            multiplier: resolved.multiplier,
            effects: resolved.entry.effects.clone(),
            secret: resolved.entry.secret.clone(),
        })
    }

    fn prepare_skill(&mut self, actor: UnitId, slot: SkillSlot) -> Result<PreparedSkill, ActionError> {
        let skill = self.check_skill(actor, slot)?;
        self.spend_skill_chakra(actor, skill.cost);
        Ok(skill)
    }

    fn spend_skill_chakra(&mut self, actor: UnitId, cost: u32) {
        let spent = self
            .state
            .roster
            .unit_mut(actor)
            .is_some_and(|unit| unit.spend_chakra(cost));
        if spent {
            self.chakra_changed(actor, -(cost as i32));
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    fn performed(&mut self, unit: UnitId, action: ActionKind, targets: Vec<UnitId>) {
        self.emit(BattleEvent::ActionPerformed {
            unit,
            action,
            targets,
        });
        self.track_last_stand(unit, action);
    }

    fn reward_chakra(&mut self, unit: UnitId, amount: u32) {
        let gained = self
            .state
            .roster
            .unit_mut(unit)
            .map_or(0, |u| u.gain_chakra(amount));
        self.chakra_changed(unit, gained as i32);
    }

    fn transfer_chakra(&mut self, from: UnitId, to: UnitId, amount: u32) {
        let Some((source, sink)) = self.state.roster.pair_mut(from, to) else {
            return;
        };
        let drained = source.drain_chakra(amount);
        let gained = sink.gain_chakra(drained);
        self.chakra_changed(from, -(drained as i32));
        self.chakra_changed(to, gained as i32);
    }

    /// One hit from `attacker` on `target`.
    ///
    /// A dodging target consumes its dodge and takes nothing. Returns the
    /// damage dealt.
    fn strike(&mut self, attacker: UnitId, target: UnitId, multiplier: Multiplier) -> u32 {
        let rolls = self.damage_rolls(attacker);
        let buffs = self.env.buffs;
        let Some((source, defender)) = self.state.roster.pair_mut(attacker, target) else {
            return 0;
        };

        if defender.statuses.consume(StatusKind::Dodge) {
            self.emit(BattleEvent::Dodged { attacker, target });
            return 0;
        }

        let result = calculate_damage(source, defender, multiplier, buffs, rolls);
        defender.apply_damage(result.damage);
        let remaining_hp = defender.stats.hp;

        self.emit(BattleEvent::Damage {
            source: DamageSource::Hit { attacker },
            target,
            amount: result.damage,
            is_critical: result.is_critical,
            absorbed: result.absorbed.ceil() as u32,
            remaining_hp,
        });
        self.note_if_defeated(target);
        result.damage
    }

    fn effect_targets(&self, actor: UnitId, struck: &[UnitId], target: EffectTarget) -> Vec<UnitId> {
        match target {
            EffectTarget::Caster => vec![actor],
            EffectTarget::Allies => self.state.roster.living(self.side_of(actor)),
            EffectTarget::Struck => struck
                .iter()
                .copied()
                .filter(|id| self.state.roster.unit(*id).is_some_and(|u| u.is_alive()))
                .collect(),
        }
    }

    /// Side-effects parsed from a skill description, applied after its hits.
    fn apply_effects(&mut self, actor: UnitId, struck: &[UnitId], effects: &SkillEffects) {
        for effect in effects {
            match *effect {
                SkillEffect::Heal {
                    amount,
                    percent,
                    target,
                } => {
                    for id in self.effect_targets(actor, struck, target) {
                        let Some(unit) = self.state.roster.unit_mut(id) else {
                            continue;
                        };
                        let heal = if percent {
                            percent_of(unit.stats.max_hp, amount)
                        } else {
                            amount
                        };
                        let healed = unit.apply_heal(heal);
                        let remaining_hp = unit.stats.hp;
                        self.emit(BattleEvent::Healed {
                            target: id,
                            amount: healed,
                            remaining_hp,
                        });
                    }
                }
                SkillEffect::Status {
                    kind,
                    turns,
                    target,
                } => {
                    for id in self.effect_targets(actor, struck, target) {
                        self.inflict(id, kind, turns);
                    }
                }
                SkillEffect::ChakraSteal { amount } => {
                    for id in self.effect_targets(actor, struck, EffectTarget::Struck) {
                        self.transfer_chakra(id, actor, amount);
                    }
                }
            }
        }
    }

    fn inflict(&mut self, unit: UnitId, kind: StatusKind, turns: u32) {
        let Some(target) = self.state.roster.unit_mut(unit) else {
            return;
        };
        match target.add_status(kind, turns, StatusPayload::for_kind(kind)) {
            AddStatusOutcome::Applied | AddStatusOutcome::Refreshed => {
                self.emit(BattleEvent::StatusApplied { unit, kind, turns });
            }
            AddStatusOutcome::Nullified => {
                self.emit(BattleEvent::StatusNullified { unit, kind });
            }
        }
    }

    fn secret_targets(&self, actor: UnitId, target: BuffTarget) -> Vec<UnitId> {
        match target {
            BuffTarget::Caster => vec![actor],
            BuffTarget::AllAllies => self.state.roster.living(self.side_of(actor)),
        }
    }

    /// Support effects in fixed order: cleanse, revive, heal, chakra, buff.
    fn apply_secret(&mut self, actor: UnitId, support: &SecretEffects) {
        let targets = self.secret_targets(actor, support.target);

        if let Some(only) = &support.cleanse {
            for &id in &targets {
                let Some(unit) = self.state.roster.unit_mut(id) else {
                    continue;
                };
                let kinds = unit.statuses.cleanse(only);
                if !kinds.is_empty() {
                    self.emit(BattleEvent::StatusCleansed { unit: id, kinds });
                }
            }
        }

        if let Some(window) = support.revive_window
            && support.target == BuffTarget::AllAllies
        {
            self.revive_fallen(actor, window);
        }

        if support.heal_percent > 0 {
            for &id in &targets {
                let Some(unit) = self.state.roster.unit_mut(id) else {
                    continue;
                };
                let heal = percent_of(unit.stats.max_hp, support.heal_percent);
                let healed = unit.apply_heal(heal);
                let remaining_hp = unit.stats.hp;
                self.emit(BattleEvent::Healed {
                    target: id,
                    amount: healed,
                    remaining_hp,
                });
            }
        }

        if support.chakra_gain > 0 {
            for &id in &targets {
                self.reward_chakra(id, support.chakra_gain);
            }
        }

        if support.duration_turns > 0 {
            let tag = support.tag.as_deref().unwrap_or(DEFAULT_SECRET_TAG);
            for &id in &targets {
                let Some(unit) = self.state.roster.unit_mut(id) else {
                    continue;
                };
                let outcome = unit.statuses.add_buff(
                    tag,
                    support.duration_turns,
                    support.payload,
                    support.stacking,
                );
                if outcome.is_applied() {
                    self.emit(BattleEvent::BuffApplied {
                        unit: id,
                        tag: tag.to_owned(),
                        turns: support.duration_turns,
                    });
                }
            }
        }
    }

    /// Revives allies that fell no more than `window` turns ago.
    fn revive_fallen(&mut self, actor: UnitId, window: u32) {
        let now = self.state.turn.global_turn;
        let locked = self.state.turn.locked;
        for id in self.state.roster.fallen(self.side_of(actor)) {
            let Some(unit) = self.state.roster.unit_mut(id) else {
                continue;
            };
            let recent = unit
                .died_at_turn
                .is_some_and(|turn| now.saturating_sub(turn) <= u64::from(window));
            if !recent {
                continue;
            }
            let hp = percent_of(unit.stats.max_hp, REVIVE_HP_PERCENT).max(1);
            unit.stats.hp = hp;
            unit.died_at_turn = None;
            unit.speed_gauge = 0;
            unit.is_paused = locked;
            self.emit(BattleEvent::UnitRevived { unit: id, hp });
        }
    }
}

/// `floor(value * percent / 100)` without intermediate overflow.
fn percent_of(value: u32, percent: u32) -> u32 {
    (u64::from(value) * u64::from(percent) / 100).min(u64::from(u32::MAX)) as u32
}
