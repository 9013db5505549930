/// Star rank / evolution stage of a character.
///
/// Declaration order is rank order, so `Ord` compares tiers directly.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TierCode {
    #[default]
    #[strum(serialize = "3S")]
    #[cfg_attr(feature = "serde", serde(rename = "3S"))]
    S3,
    #[strum(serialize = "4S")]
    #[cfg_attr(feature = "serde", serde(rename = "4S"))]
    S4,
    #[strum(serialize = "5S")]
    #[cfg_attr(feature = "serde", serde(rename = "5S"))]
    S5,
    #[strum(serialize = "6S")]
    #[cfg_attr(feature = "serde", serde(rename = "6S"))]
    S6,
    #[strum(serialize = "6SB")]
    #[cfg_attr(feature = "serde", serde(rename = "6SB"))]
    S6B,
    #[strum(serialize = "7S")]
    #[cfg_attr(feature = "serde", serde(rename = "7S"))]
    S7,
    #[strum(serialize = "7SL")]
    #[cfg_attr(feature = "serde", serde(rename = "7SL"))]
    S7L,
    #[strum(serialize = "8S")]
    #[cfg_attr(feature = "serde", serde(rename = "8S"))]
    S8,
    #[strum(serialize = "8SM")]
    #[cfg_attr(feature = "serde", serde(rename = "8SM"))]
    S8M,
    #[strum(serialize = "9S")]
    #[cfg_attr(feature = "serde", serde(rename = "9S"))]
    S9,
    #[strum(serialize = "9ST")]
    #[cfg_attr(feature = "serde", serde(rename = "9ST"))]
    S9T,
    #[strum(serialize = "10SO")]
    #[cfg_attr(feature = "serde", serde(rename = "10SO"))]
    S10O,
}

impl TierCode {
    /// Star count encoded in the code's numeric prefix.
    pub const fn stars(self) -> u8 {
        match self {
            TierCode::S3 => 3,
            TierCode::S4 => 4,
            TierCode::S5 => 5,
            TierCode::S6 | TierCode::S6B => 6,
            TierCode::S7 | TierCode::S7L => 7,
            TierCode::S8 | TierCode::S8M => 8,
            TierCode::S9 | TierCode::S9T => 9,
            TierCode::S10O => 10,
        }
    }
}
