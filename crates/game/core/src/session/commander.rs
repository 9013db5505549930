//! Commander passive: a static, element-dependent team buff.
//!
//! The commander never fights. Its element selects one or two stat boosts
//! whose percentage grows linearly from the 5-star baseline to 20% at 10 stars.
//! The boosts are applied once when the team is loaded.

use crate::combat::Element;
use crate::state::Unit;

/// Percentage every commander boost reaches at 10 stars.
pub const COMMANDER_MAX_PERCENT: f64 = 20.0;

/// Stat raised by a commander boost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommanderStat {
    Atk,
    Hp,
    Speed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommanderBuff {
    pub stat: CommanderStat,
    pub percent: f64,
}

const fn baseline(element: Element) -> &'static [(CommanderStat, f64)] {
    match element {
        Element::Body | Element::Heart => &[(CommanderStat::Atk, 4.0)],
        Element::Bravery | Element::Wisdom => &[(CommanderStat::Atk, 3.0), (CommanderStat::Hp, 1.0)],
        Element::Skill => &[(CommanderStat::Speed, 4.0)],
    }
}

/// Boosts granted by a commander of `element` at `stars`.
///
/// # Formula
///
/// ```text
/// scale   = (stars - 5) / 5          (0 below 5 stars)
/// percent = base + scale * (20 - base), rounded to one decimal
/// ```
pub fn commander_buffs(element: Element, stars: u8) -> Vec<CommanderBuff> {
    let scale = if stars >= 5 {
        f64::from(stars - 5) / 5.0
    } else {
        0.0
    };
    baseline(element)
        .iter()
        .map(|&(stat, base)| {
            let percent = base + scale * (COMMANDER_MAX_PERCENT - base);
            CommanderBuff {
                stat,
                percent: (percent * 10.0).round() / 10.0,
            }
        })
        .collect()
}

/// Raises the unit's stats by every boost, rounding to whole points.
///
/// Hp boosts raise both current and max hp.
pub fn apply_commander_buffs(unit: &mut Unit, buffs: &[CommanderBuff]) {
    let boost = |value: u32, percent: f64| (f64::from(value) * (1.0 + percent / 100.0)).round() as u32;
    for buff in buffs {
        match buff.stat {
            CommanderStat::Atk => unit.stats.atk = boost(unit.stats.atk, buff.percent),
            CommanderStat::Speed => unit.stats.speed = boost(unit.stats.speed, buff.percent),
            CommanderStat::Hp => {
                unit.stats.max_hp = boost(unit.stats.max_hp, buff.percent);
                unit.stats.hp = boost(unit.stats.hp, buff.percent).min(unit.stats.max_hp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::BaseStats;
    use crate::state::{Side, UnitId, UnitProfile};

    #[test]
    fn baseline_at_five_stars_and_twenty_at_ten() {
        let five = commander_buffs(Element::Body, 5);
        assert_eq!(
            five,
            vec![CommanderBuff {
                stat: CommanderStat::Atk,
                percent: 4.0
            }]
        );
        let ten = commander_buffs(Element::Wisdom, 10);
        assert!(ten.iter().all(|b| b.percent == 20.0));
        assert_eq!(ten.len(), 2);
    }

    #[test]
    fn interpolates_and_rounds_to_one_decimal() {
        let seven = commander_buffs(Element::Bravery, 7);
        // 3 + 0.4 * 17 = 9.8, 1 + 0.4 * 19 = 8.6
        assert_eq!(seven[0].percent, 9.8);
        assert_eq!(seven[1].percent, 8.6);
        assert_eq!(commander_buffs(Element::Skill, 3)[0].percent, 4.0);
    }

    #[test]
    fn applies_percentages_once() {
        let mut unit = Unit::new(
            UnitId(1),
            "Shikamaru",
            Side::Player,
            BaseStats::new(1000, 100, 50, 100),
            UnitProfile::default(),
        );
        apply_commander_buffs(&mut unit, &commander_buffs(Element::Wisdom, 10));
        assert_eq!(unit.stats.atk, 120);
        assert_eq!(unit.stats.max_hp, 1200);
        assert_eq!(unit.stats.hp, 1200);
        assert_eq!(unit.stats.speed, 100);
    }
}
