//! Element affinity between attacker and defender.
//!
//! Body, Skill and Heart form a cycle where each beats the next. Wisdom and
//! Bravery list each other as both strong and weak target; since the strong
//! entry is checked first, that pairing always resolves to an advantage.

use crate::state::Unit;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Body,
    Skill,
    Heart,
    Wisdom,
    Bravery,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Body,
        Element::Skill,
        Element::Heart,
        Element::Wisdom,
        Element::Bravery,
    ];

    /// Entry of the advantage table for this element.
    pub const fn advantage(self) -> Advantage {
        match self {
            Element::Body => Advantage::new(Element::Skill, Element::Heart),
            Element::Skill => Advantage::new(Element::Heart, Element::Body),
            Element::Heart => Advantage::new(Element::Body, Element::Skill),
            Element::Wisdom => Advantage::new(Element::Bravery, Element::Bravery),
            Element::Bravery => Advantage::new(Element::Wisdom, Element::Wisdom),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The element an attacker is strong against and the one it is weak against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advantage {
    pub strong: Element,
    pub weak: Element,
}

impl Advantage {
    const fn new(strong: Element, weak: Element) -> Self {
        Self { strong, weak }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    Advantage,
    Disadvantage,
    Neutral,
}

pub const ADVANTAGE_MULTIPLIER: f64 = 1.5;
pub const DISADVANTAGE_MULTIPLIER: f64 = 0.9;
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// Classifies an attack. Same element or a missing element is neutral.
pub fn affinity(attacker: Option<Element>, defender: Option<Element>) -> Affinity {
    let (Some(attacker), Some(defender)) = (attacker, defender) else {
        return Affinity::Neutral;
    };
    if attacker == defender {
        return Affinity::Neutral;
    }

    let table = attacker.advantage();
    if table.strong == defender {
        Affinity::Advantage
    } else if table.weak == defender {
        Affinity::Disadvantage
    } else {
        Affinity::Neutral
    }
}

/// Plain table lookup.
///
/// # Formula
///
/// ```text
/// advantage    -> 1.5
/// disadvantage -> 0.9
/// otherwise    -> 1.0
/// ```
pub fn element_multiplier(attacker: Option<Element>, defender: Option<Element>) -> f64 {
    match affinity(attacker, defender) {
        Affinity::Advantage => ADVANTAGE_MULTIPLIER,
        Affinity::Disadvantage => DISADVANTAGE_MULTIPLIER,
        Affinity::Neutral => NEUTRAL_MULTIPLIER,
    }
}

/// Table lookup adjusted by the passives of both units.
///
/// # Formula
///
/// ```text
/// attacker has damage boost vs defender element:
///     disadvantage -> 1.1, neutral -> 1.5, advantage -> 2.0
/// defender nullifies element affinity and the matchup is a disadvantage:
///     -> 1.0
/// ```
///
/// A unit without an element, or facing its own element, always gets 1.0.
pub fn modified_element_multiplier(attacker: &Unit, defender: &Unit) -> f64 {
    let (Some(attacker_element), Some(defender_element)) =
        (attacker.profile.element, defender.profile.element)
    else {
        return NEUTRAL_MULTIPLIER;
    };
    if attacker_element == defender_element {
        return NEUTRAL_MULTIPLIER;
    }

    let affinity = affinity(Some(attacker_element), Some(defender_element));
    let mut multiplier = element_multiplier(Some(attacker_element), Some(defender_element));

    if attacker.passives.boosts_against(defender_element) {
        multiplier = match affinity {
            Affinity::Disadvantage => 1.1,
            Affinity::Neutral => 1.5,
            Affinity::Advantage => 2.0,
        };
    }

    if affinity == Affinity::Disadvantage && defender.passives.nullifies_element_affinity() {
        multiplier = NEUTRAL_MULTIPLIER;
    }

    multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_advantage_and_disadvantage() {
        assert_eq!(element_multiplier(Some(Element::Body), Some(Element::Skill)), 1.5);
        assert_eq!(element_multiplier(Some(Element::Skill), Some(Element::Body)), 0.9);
        assert_eq!(element_multiplier(Some(Element::Skill), Some(Element::Heart)), 1.5);
        assert_eq!(element_multiplier(Some(Element::Heart), Some(Element::Body)), 1.5);
    }

    #[test]
    fn wisdom_bravery_is_symmetric() {
        let a = element_multiplier(Some(Element::Wisdom), Some(Element::Bravery));
        let b = element_multiplier(Some(Element::Bravery), Some(Element::Wisdom));
        assert_eq!(a, b);
        assert_eq!(a, 1.5);
    }

    #[test]
    fn same_or_missing_element_is_neutral() {
        assert_eq!(element_multiplier(Some(Element::Body), Some(Element::Body)), 1.0);
        assert_eq!(element_multiplier(None, Some(Element::Body)), 1.0);
        assert_eq!(element_multiplier(Some(Element::Body), Some(Element::Wisdom)), 1.0);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("heart".parse::<Element>().unwrap(), Element::Heart);
        assert!("water".parse::<Element>().is_err());
    }
}
