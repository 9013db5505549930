use bitflags::bitflags;

bitflags! {
    /// Optional mission rules chosen before the encounter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MissionModifiers: u8 {
        /// Enemy hp and atk doubled on every wave load.
        const HARD = 1 << 0;
        /// Player units may only attack and guard.
        const NO_JUTSU = 1 << 1;
        /// The last wave repeats with growing stats after the final stage.
        const SURVIVAL = 1 << 2;
        /// Exceeding the time limit marks the run as failed.
        const SPEED_RUN = 1 << 3;
    }
}

impl MissionModifiers {
    /// Parses a comma separated list such as `"hard, no_jutsu"`.
    ///
    /// Returns the offending token when a name is unknown.
    pub fn parse_list(text: &str) -> Result<Self, String> {
        let mut modifiers = Self::empty();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let flag = match token.to_ascii_lowercase().replace('-', "_").as_str() {
                "hard" => Self::HARD,
                "no_jutsu" | "nojutsu" => Self::NO_JUTSU,
                "survival" => Self::SURVIVAL,
                "speed_run" | "speedrun" => Self::SPEED_RUN,
                _ => return Err(token.to_string()),
            };
            modifiers |= flag;
        }
        Ok(modifiers)
    }

    /// Reward factor for a finished run.
    ///
    /// # Formula
    ///
    /// ```text
    /// HARD x2, SPEED_RUN (not failed) x1.5, NO_JUTSU x1.8,
    /// SURVIVAL x(1 + 0.5 * waves_survived)
    /// ```
    pub fn reward_multiplier(self, speed_run_failed: bool, survival_waves: u32) -> f64 {
        let mut multiplier = 1.0;
        if self.contains(Self::HARD) {
            multiplier *= 2.0;
        }
        if self.contains(Self::SPEED_RUN) && !speed_run_failed {
            multiplier *= 1.5;
        }
        if self.contains(Self::NO_JUTSU) {
            multiplier *= 1.8;
        }
        if self.contains(Self::SURVIVAL) {
            multiplier *= 1.0 + 0.5 * f64::from(survival_waves);
        }
        multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists() {
        let modifiers = MissionModifiers::parse_list("hard, No-Jutsu").unwrap();
        assert_eq!(modifiers, MissionModifiers::HARD | MissionModifiers::NO_JUTSU);
        assert_eq!(MissionModifiers::parse_list("").unwrap(), MissionModifiers::empty());
        assert_eq!(
            MissionModifiers::parse_list("hard,turbo"),
            Err("turbo".to_string())
        );
    }

    #[test]
    fn reward_multiplier_combines_factors() {
        let modifiers = MissionModifiers::HARD | MissionModifiers::SPEED_RUN;
        assert_eq!(modifiers.reward_multiplier(false, 0), 3.0);
        assert_eq!(modifiers.reward_multiplier(true, 0), 2.0);
        assert_eq!(MissionModifiers::SURVIVAL.reward_multiplier(false, 4), 3.0);
        assert_eq!(MissionModifiers::empty().reward_multiplier(false, 0), 1.0);
    }
}
