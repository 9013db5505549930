use crate::chakra::ChakraGate;
use crate::combat::{BuffAggregator, StatusBuffs};
use crate::config::BattleConfig;
use crate::env::{CharacterDefinition, ContentOracle, EnemyTemplate, PcgRng, RngOracle};
use crate::skill::LastStandCharge;
use crate::state::{BattleState, MissionModifiers, Unit};

use super::commander::{apply_commander_buffs, commander_buffs};
use super::support::apply_support_skills;
use super::team::{TeamMember, TeamSpec, build_player_unit};
use super::{BattleSession, Progress, SessionError};

/// Enemy id from a wave definition with its resolved template.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct EnemySlot {
    pub id: String,
    /// `None` when the catalogue has no such enemy; fallback stats apply.
    pub template: Option<EnemyTemplate>,
}

/// Owned copy of the mission layout: stage, wave, enemies.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct Encounter {
    pub mission_id: String,
    pub difficulty: String,
    pub stages: Vec<Vec<Vec<EnemySlot>>>,
}

impl Encounter {
    pub fn wave(&self, stage: usize, wave: usize) -> &[EnemySlot] {
        self.stages
            .get(stage)
            .and_then(|waves| waves.get(wave))
            .map_or(&[], Vec::as_slice)
    }

    pub fn wave_counts(&self) -> Vec<usize> {
        self.stages.iter().map(Vec::len).collect()
    }
}

/// Builds a [`BattleSession`] from content and a team.
///
/// ```ignore
/// let session = SessionBuilder::new(&bundle, "mission_001")
///     .difficulty("hard")
///     .team(team)
///     .seed(42)
///     .build()?;
/// ```
pub struct SessionBuilder<'c> {
    content: &'c dyn ContentOracle,
    mission_id: String,
    difficulty: String,
    team: TeamSpec,
    config: BattleConfig,
    modifiers: MissionModifiers,
    seed: u64,
    speed: u32,
    auto_mode: bool,
    rng: Option<Box<dyn RngOracle>>,
    buffs: Option<Box<dyn BuffAggregator>>,
}

impl<'c> SessionBuilder<'c> {
    pub const DEFAULT_DIFFICULTY: &'static str = "normal";

    pub fn new(content: &'c dyn ContentOracle, mission_id: impl Into<String>) -> Self {
        Self {
            content,
            mission_id: mission_id.into(),
            difficulty: Self::DEFAULT_DIFFICULTY.to_owned(),
            team: TeamSpec::default(),
            config: BattleConfig::default(),
            modifiers: MissionModifiers::empty(),
            seed: 0,
            speed: 1,
            auto_mode: false,
            rng: None,
            buffs: None,
        }
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn team(mut self, team: TeamSpec) -> Self {
        self.team = team;
        self
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn modifiers(mut self, modifiers: MissionModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn auto_mode(mut self, enabled: bool) -> Self {
        self.auto_mode = enabled;
        self
    }

    pub fn rng(mut self, rng: Box<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn buffs(mut self, buffs: Box<dyn BuffAggregator>) -> Self {
        self.buffs = Some(buffs);
        self
    }

    pub fn build(self) -> Result<BattleSession, SessionError> {
        let encounter = self.resolve_encounter()?;
        if self.team.active.is_empty() {
            return Err(SessionError::EmptyTeam);
        }

        let mut state = BattleState::new(self.seed, self.modifiers);
        state.turn.auto_mode = self.auto_mode;
        state.turn.set_speed(self.speed);

        for member in &self.team.active {
            let unit = self.member_unit(&mut state, member)?;
            state.roster.push_active(unit)?;
        }
        for member in &self.team.bench {
            let unit = self.member_unit(&mut state, member)?;
            state.roster.push_bench(unit)?;
        }

        if let Some(commander) = &self.team.commander {
            let character = self.character(commander)?;
            if let Some(element) = character.element {
                let tier = commander.tier.unwrap_or(character.base_tier);
                let buffs = commander_buffs(element, tier.stars());
                for unit in state.roster.players_mut() {
                    apply_commander_buffs(unit, &buffs);
                }
            }
        }
        apply_support_skills(&mut state.roster);

        Ok(BattleSession {
            state,
            gate: ChakraGate::from_config(&self.config),
            config: self.config,
            rng: self.rng.unwrap_or_else(|| Box::new(PcgRng)),
            buffs: self.buffs.unwrap_or_else(|| Box::new(StatusBuffs)),
            encounter,
            progress: Progress::default(),
            started: false,
            start_ms: None,
            speed_run_failed: false,
            awaiting: None,
            summary: None,
        })
    }

    fn member_unit(&self, state: &mut BattleState, member: &TeamMember) -> Result<Unit, SessionError> {
        let character = self.character(member)?;
        let mut unit = build_player_unit(state, character, member, &self.config);
        if let Some(id) = &member.last_stand {
            let ultimate = self
                .content
                .last_stand(id)
                .ok_or_else(|| SessionError::UnknownLastStand(id.clone()))?;
            unit.last_stand = Some(LastStandCharge::new(ultimate.clone()));
        }
        Ok(unit)
    }

    fn character(
        &self,
        member: &TeamMember,
    ) -> Result<&'c CharacterDefinition, SessionError> {
        self.content
            .character(&member.character_id)
            .ok_or_else(|| SessionError::UnknownCharacter(member.character_id.clone()))
    }

    fn resolve_encounter(&self) -> Result<Encounter, SessionError> {
        let mission = self
            .content
            .mission(&self.mission_id)
            .ok_or_else(|| SessionError::UnknownMission(self.mission_id.clone()))?;
        let (difficulty, stages) = mission
            .stages(&self.difficulty)
            .filter(|(_, stages)| !stages.is_empty())
            .ok_or_else(|| SessionError::NoStages {
                mission: self.mission_id.clone(),
                difficulty: self.difficulty.clone(),
            })?;

        let mut resolved = Vec::with_capacity(stages.len());
        for (stage_index, stage) in stages.iter().enumerate() {
            let mut waves = Vec::with_capacity(stage.waves.len());
            for (wave_index, wave) in stage.waves.iter().enumerate() {
                if wave.enemies.len() > BattleConfig::MAX_ENEMIES {
                    return Err(SessionError::WaveTooLarge {
                        stage: stage_index + 1,
                        wave: wave_index + 1,
                        size: wave.enemies.len(),
                    });
                }
                let slots = wave
                    .enemies
                    .iter()
                    .map(|id| EnemySlot {
                        id: id.clone(),
                        template: self.content.enemy(id).cloned(),
                    })
                    .collect();
                waves.push(slots);
            }
            resolved.push(waves);
        }

        Ok(Encounter {
            mission_id: mission.id.clone(),
            difficulty: difficulty.to_owned(),
            stages: resolved,
        })
    }
}
