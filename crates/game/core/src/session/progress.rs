use crate::state::{MissionModifiers, Roster};

/// Position of the encounter inside its mission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Progress {
    pub stage: usize,
    pub wave: usize,
    /// Extra waves cleared after the final stage in survival mode.
    pub survival_round: u32,
}

/// Where the encounter goes after the current wave is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    NextWave { stage: usize, wave: usize },
    /// The stage is cleared and the next one starts at its first wave.
    NextStage { cleared: usize, stage: usize },
    /// Survival repeat of the final wave with round `round`.
    Survival { round: u32 },
    Victory,
}

impl Progress {
    /// Decides the next step given the wave count of every stage.
    pub fn advance(&self, waves_per_stage: &[usize], modifiers: MissionModifiers) -> Advance {
        let waves = waves_per_stage.get(self.stage).copied().unwrap_or(0);
        if self.survival_round == 0 && self.wave + 1 < waves {
            return Advance::NextWave {
                stage: self.stage,
                wave: self.wave + 1,
            };
        }
        if self.survival_round == 0 && self.stage + 1 < waves_per_stage.len() {
            return Advance::NextStage {
                cleared: self.stage,
                stage: self.stage + 1,
            };
        }
        if modifiers.contains(MissionModifiers::SURVIVAL) && waves > 0 {
            return Advance::Survival {
                round: self.survival_round + 1,
            };
        }
        Advance::Victory
    }
}

/// How the encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Result screen data, produced once when the encounter ends.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSummary {
    pub outcome: Outcome,
    /// 1-based stage reached.
    pub stage: usize,
    /// 1-based wave reached.
    pub wave: usize,
    pub team_hp: u32,
    pub team_max_hp: u32,
    /// `round(100 * team_hp / team_max_hp)`.
    pub hp_percent: u32,
    pub surviving: usize,
    pub total: usize,
    pub survival_waves: u32,
    pub speed_run_failed: bool,
    pub reward_multiplier: f64,
}

impl BattleSummary {
    /// Summarises the active team of `roster`.
    pub fn collect(
        outcome: Outcome,
        roster: &Roster,
        progress: &Progress,
        modifiers: MissionModifiers,
        speed_run_failed: bool,
    ) -> Self {
        let team = roster.active();
        let team_hp: u32 = team.iter().map(|u| u.stats.hp).sum();
        let team_max_hp: u32 = team.iter().map(|u| u.stats.max_hp).sum();
        let hp_percent = if team_max_hp == 0 {
            0
        } else {
            (f64::from(team_hp) * 100.0 / f64::from(team_max_hp)).round() as u32
        };

        Self {
            outcome,
            stage: progress.stage + 1,
            wave: progress.wave + 1,
            team_hp,
            team_max_hp,
            hp_percent,
            surviving: team.iter().filter(|u| u.is_alive()).count(),
            total: team.len(),
            survival_waves: progress.survival_round,
            speed_run_failed,
            reward_multiplier: modifiers.reward_multiplier(speed_run_failed, progress.survival_round),
        }
    }
}
