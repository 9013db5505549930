//! Field and buddy skills: passive bonuses written as prose.
//!
//! A field skill boosts its owner while fielded. A buddy skill boosts the unit
//! sharing its owner's slot on the other side of the bench. Both are written
//! like `"Boosts attack by 65-130"`; a range reads as its midpoint.

/// Flat stat bonuses parsed from a field or buddy skill description.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SupportBonus {
    pub atk: u32,
    pub def: u32,
    pub hp: u32,
    pub speed: u32,
    pub damage_reduction_percent: u32,
    pub crit_rate_percent: u32,
}

impl SupportBonus {
    /// Reads every recognised boost in `description`.
    ///
    /// Returns `None` when nothing was recognised.
    pub fn parse(description: &str) -> Option<Self> {
        let text = description
            .to_ascii_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let boost = |stats: &[&str]| {
            stats.iter().find_map(|stat| {
                ["boosts", "boost"]
                    .iter()
                    .find_map(|verb| value_after(&text, &format!("{verb} {stat} by ")))
            })
        };
        let loose = |heads: &[&str]| {
            heads.iter().find_map(|head| {
                let start = text.find(head)? + head.len();
                let by = text[start..].find("by ")? + start + "by ".len();
                range_value(&text[by..])
            })
        };

        let bonus = Self {
            atk: boost(&["attack", "atk"]).unwrap_or(0),
            def: boost(&["defense", "def"]).unwrap_or(0),
            hp: boost(&["hp"]).unwrap_or(0),
            speed: boost(&["speed", "spd"]).unwrap_or(0),
            damage_reduction_percent: loose(&["reduces damage", "reduce damage"]).unwrap_or(0),
            crit_rate_percent: loose(&["boosts crit", "boost crit"]).unwrap_or(0),
        };
        (bonus != Self::default()).then_some(bonus)
    }
}

fn value_after(text: &str, phrase: &str) -> Option<u32> {
    let start = text.find(phrase)? + phrase.len();
    range_value(&text[start..])
}

/// `"65-130"` reads as 97, `"100"` as 100.
fn range_value(text: &str) -> Option<u32> {
    let digits = |s: &str| {
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        s[..end].parse::<u32>().ok().map(|value| (value, end))
    };
    let (low, end) = digits(text)?;
    match text[end..].strip_prefix('-').and_then(digits) {
        Some((high, _)) => Some(((u64::from(low) + u64::from(high)) / 2) as u32),
        None => Some(low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_reads_as_midpoint() {
        let bonus = SupportBonus::parse("Boosts attack by 65-130.").unwrap();
        assert_eq!(bonus.atk, 97);
        assert_eq!(bonus.def, 0);
    }

    #[test]
    fn reads_every_stat() {
        let bonus = SupportBonus::parse(
            "Boosts  DEF by 50-100, boosts HP by 200 and boost speed by 10-20. \
             Reduces damage from Heart enemies by 15-20%. Boosts critical rate by 5%.",
        )
        .unwrap();
        assert_eq!(
            bonus,
            SupportBonus {
                atk: 0,
                def: 75,
                hp: 200,
                speed: 15,
                damage_reduction_percent: 17,
                crit_rate_percent: 5,
            }
        );
    }

    #[test]
    fn unrelated_text_is_ignored() {
        assert_eq!(SupportBonus::parse("Grants a warm feeling."), None);
        assert_eq!(SupportBonus::parse("Boosts attack by a lot"), None);
    }
}
