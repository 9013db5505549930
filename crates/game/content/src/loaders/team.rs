//! Player team loader.

use std::path::Path;

use battle_core::{TeamMember, TeamSpec};
use serde::Deserialize;

use crate::loaders::{LoadResult, parse_tier, read_json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    character_id: String,
    #[serde(default)]
    tier_code: Option<String>,
    #[serde(default)]
    level: Option<u32>,
    /// Defaults to the member's index in its list.
    #[serde(default)]
    position_id: Option<u8>,
    /// Id of an equipped Last Stand ultimate.
    #[serde(default)]
    last_stand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTeam {
    active: Vec<RawMember>,
    bench: Vec<RawMember>,
    commander: Option<RawMember>,
}

/// Loader for `team.json`.
///
/// ```json
/// {
///   "active": [{ "characterId": "naruto_001", "tierCode": "6S", "lastStand": "rasengan_ultimate" }],
///   "bench": [],
///   "commander": { "characterId": "shikamaru_001", "tierCode": "7S" }
/// }
/// ```
pub struct TeamLoader;

impl TeamLoader {
    pub fn load(path: &Path) -> LoadResult<TeamSpec> {
        let raw: RawTeam = read_json(path, "team")?;
        Self::convert(raw)
    }

    fn convert(raw: RawTeam) -> LoadResult<TeamSpec> {
        let members = |list: Vec<RawMember>| -> LoadResult<Vec<TeamMember>> {
            list.into_iter()
                .enumerate()
                .map(|(index, member)| convert_member(member, index as u8))
                .collect()
        };
        Ok(TeamSpec {
            active: members(raw.active)?,
            bench: members(raw.bench)?,
            commander: raw.commander.map(|m| convert_member(m, 0)).transpose()?,
        })
    }
}

fn convert_member(raw: RawMember, index: u8) -> LoadResult<TeamMember> {
    let mut member = TeamMember::new(raw.character_id, raw.position_id.unwrap_or(index));
    if let Some(code) = raw.tier_code {
        let tier = parse_tier(&code, &member.character_id)?;
        member = member.with_tier(tier);
    }
    if let Some(level) = raw.level {
        member = member.with_level(level);
    }
    if let Some(id) = raw.last_stand.filter(|id| !id.trim().is_empty()) {
        member = member.with_last_stand(id);
    }
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::TierCode;

    #[test]
    fn slots_default_to_list_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        std::fs::write(
            &path,
            r#"{
              "active": [
                { "characterId": "naruto_001", "tierCode": "6s", "level": 60 },
                { "characterId": "sakura_001", "lastStand": "" }
              ],
              "bench": [{ "characterId": "kakashi_001", "positionId": 1, "lastStand": "chidori_ultimate" }],
              "commander": { "characterId": "shikamaru_001", "tierCode": "7S" }
            }"#,
        )
        .unwrap();

        let team = TeamLoader::load(&path).unwrap();
        assert_eq!(team.active[0].tier, Some(TierCode::S6));
        assert_eq!(team.active[0].level, Some(60));
        assert_eq!(team.active[1].slot, 1);
        assert_eq!(team.active[1].tier, None);
        assert_eq!(team.bench[0].slot, 1);
        assert_eq!(team.bench[0].last_stand.as_deref(), Some("chidori_ultimate"));
        assert_eq!(team.active[1].last_stand, None);
        assert_eq!(
            team.commander.map(|c| c.tier),
            Some(Some(TierCode::S7))
        );
    }
}
