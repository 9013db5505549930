//! Passive abilities derived from ability text.
//!
//! Character and enemy data only carries free-form ability names and
//! descriptions. They are scanned once when a unit is created and condensed
//! into [`Passives`], which the damage and status code consult.

use bitflags::bitflags;

use crate::combat::Element;
use crate::state::StatusKind;

/// Ability as authored in content data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

impl Ability {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PassiveFlags: u8 {
        /// Element disadvantage against this unit is ignored.
        const NULLIFY_ELEMENT_AFFINITY = 1 << 0;
        /// Immune to STUN, PARALYSIS and IMMOBILIZED.
        const NULLIFY_IMMOBILIZATION = 1 << 1;
        /// Immune to SEALED.
        const NULLIFY_JUTSU_SEALING = 1 << 2;
        /// Ignores the defender's damage reduction.
        const NULLIFY_DAMAGE_REDUCTION = 1 << 3;
    }
}

/// Percent used when "reduce <element> damage" gives no explicit value.
pub const DEFAULT_ELEMENT_REDUCTION_PERCENT: u32 = 20;
/// Flat speed granted by a "speed up" ability.
pub const SPEED_UP_BONUS: u32 = 20;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passives {
    pub flags: PassiveFlags,
    /// Elements this unit deals boosted damage against.
    pub damage_boost_vs: Vec<Element>,
    /// Percent of damage dropped when hit by the indexed element.
    pub element_reduction: [u32; 5],
    pub damage_reduction_percent: u32,
    pub speed_up: u32,
}

impl Passives {
    pub fn from_abilities(abilities: &[Ability]) -> Self {
        let mut passives = Self::default();
        for ability in abilities {
            passives.absorb(ability);
        }
        passives
    }

    fn absorb(&mut self, ability: &Ability) {
        let name = ability.name.to_lowercase();
        let desc = ability.description.to_lowercase();
        let mentions = |phrase: &str| name.contains(phrase) || desc.contains(phrase);

        if mentions("nullifies element affinity") {
            self.flags |= PassiveFlags::NULLIFY_ELEMENT_AFFINITY;
        }
        if mentions("nullifies immobilization") {
            self.flags |= PassiveFlags::NULLIFY_IMMOBILIZATION;
        }
        if mentions("nullifies jutsu sealing") {
            self.flags |= PassiveFlags::NULLIFY_JUTSU_SEALING;
        }
        if mentions("nullifies damage reduction") {
            self.flags |= PassiveFlags::NULLIFY_DAMAGE_REDUCTION;
        }

        if let Some(element) = element_after(&name, "damage boost against ")
            .or_else(|| element_after(&desc, "damage boost against "))
            && !self.damage_boost_vs.contains(&element)
        {
            self.damage_boost_vs.push(element);
        }

        if let Some(element) = element_between(&name, "reduce ", " damage")
            .or_else(|| element_between(&desc, "reduce ", " damage"))
        {
            self.element_reduction[element.index()] =
                first_percent(&desc).unwrap_or(DEFAULT_ELEMENT_REDUCTION_PERCENT);
        }

        if let Some(percent) = percent_after(&name, "reduce damage by ")
            .or_else(|| percent_after(&desc, "reduce damage by "))
        {
            self.damage_reduction_percent = percent;
        }

        if name.contains("speed up") && !name.contains("nullifies") {
            self.speed_up = SPEED_UP_BONUS;
        }
    }

    pub fn nullifies_element_affinity(&self) -> bool {
        self.flags.contains(PassiveFlags::NULLIFY_ELEMENT_AFFINITY)
    }

    pub fn ignores_damage_reduction(&self) -> bool {
        self.flags.contains(PassiveFlags::NULLIFY_DAMAGE_REDUCTION)
    }

    pub fn boosts_against(&self, element: Element) -> bool {
        self.damage_boost_vs.contains(&element)
    }

    pub fn reduction_from(&self, element: Element) -> u32 {
        self.element_reduction[element.index()]
    }

    /// Whether an incoming status of `kind` is blocked.
    pub fn nullifies(&self, kind: StatusKind) -> bool {
        (kind.is_immobilization() && self.flags.contains(PassiveFlags::NULLIFY_IMMOBILIZATION))
            || (kind == StatusKind::Sealed
                && self.flags.contains(PassiveFlags::NULLIFY_JUTSU_SEALING))
    }
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(text.len());
    &text[..end]
}

fn element_after(text: &str, phrase: &str) -> Option<Element> {
    let start = text.find(phrase)? + phrase.len();
    leading_word(&text[start..]).parse().ok()
}

/// Matches `<prefix><word><suffix>` where the word names an element.
fn element_between(text: &str, prefix: &str, suffix: &str) -> Option<Element> {
    text.match_indices(prefix).find_map(|(index, _)| {
        let rest = &text[index + prefix.len()..];
        let word = leading_word(rest);
        if word.is_empty() || !rest[word.len()..].starts_with(suffix) {
            return None;
        }
        word.parse().ok()
    })
}

fn percent_after(text: &str, phrase: &str) -> Option<u32> {
    let start = text.find(phrase)? + phrase.len();
    let rest = &text[start..];
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !rest[digits..].starts_with('%') {
        return None;
    }
    rest[..digits].parse().ok()
}

/// First `<digits>%` in the text.
fn first_percent(text: &str) -> Option<u32> {
    text.match_indices('%').find_map(|(index, _)| {
        let head = &text[..index];
        let digits = head.len() - head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        head[index - digits..].parse().ok()
    })
}
