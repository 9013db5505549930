/// Damage multiplier of a skill.
///
/// Content data writes multipliers as strings such as `"2.0x"`. They are
/// parsed once at load time; invalid or non-positive values never reach the
/// damage formula.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Multiplier(f64);

impl Multiplier {
    pub const BASIC: Self = Self(1.0);
    pub const COMBO: Self = Self(0.6);
    pub const DEFAULT_JUTSU: Self = Self(2.0);
    pub const DEFAULT_ULTIMATE: Self = Self(1.5);

    /// Wraps a raw value; NaN, infinite and non-positive values become 1.0.
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::BASIC
        }
    }

    /// Extracts the first decimal in `text` (`"2.5x"` gives 2.5). The
    /// trailing `x` is optional, so `"4"` reads as 4.0.
    ///
    /// Returns `None` if there is no positive decimal.
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit() || c == '.')?;
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let value: f64 = rest[..end].parse().ok()?;
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Like [`Multiplier::parse`] but falls back to 1.0.
    pub fn parse_or_basic(text: &str) -> Self {
        Self::parse(text).unwrap_or(Self::BASIC)
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::BASIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_decimal() {
        assert_eq!(Multiplier::parse("2.0x").unwrap().value(), 2.0);
        assert_eq!(Multiplier::parse("x3.25 damage").unwrap().value(), 3.25);
        assert_eq!(Multiplier::parse("4").unwrap().value(), 4.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Multiplier::parse("strong").is_none());
        assert!(Multiplier::parse("0x").is_none());
        assert!(Multiplier::parse("1.2.3x").is_none());
        assert_eq!(Multiplier::parse_or_basic("").value(), 1.0);
        assert_eq!(Multiplier::new(-2.0).value(), 1.0);
        assert_eq!(Multiplier::new(f64::NAN).value(), 1.0);
    }
}
