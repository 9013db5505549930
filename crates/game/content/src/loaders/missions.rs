//! Mission catalogue loader.
//!
//! Missions list their stages per difficulty. Difficulty order is kept as
//! authored because an unknown difficulty falls back to the first one.

use std::path::Path;

use battle_core::{MissionDefinition, StageDefinition, WaveDefinition};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_json};

#[derive(Debug, Deserialize)]
struct RawMission {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    difficulties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStage {
    name: Option<String>,
    waves: Vec<RawWave>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWave {
    enemies: Vec<String>,
}

/// Loader for `missions.json`.
pub struct MissionLoader;

impl MissionLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<MissionDefinition>> {
        let raw: Vec<RawMission> = read_json(path, "mission catalogue")?;
        raw.into_iter().map(convert_mission).collect()
    }
}

fn convert_mission(raw: RawMission) -> LoadResult<MissionDefinition> {
    let mut difficulties = Vec::with_capacity(raw.difficulties.len());
    for (difficulty, value) in raw.difficulties {
        let stages: Vec<RawStage> = serde_json::from_value(value).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse difficulty '{}' of mission '{}': {}",
                difficulty,
                raw.id,
                e
            )
        })?;
        let stages = stages
            .into_iter()
            .map(|stage| StageDefinition {
                name: stage.name,
                waves: stage
                    .waves
                    .into_iter()
                    .map(|wave| WaveDefinition {
                        enemies: wave.enemies,
                    })
                    .collect(),
            })
            .collect();
        difficulties.push((difficulty, stages));
    }

    Ok(MissionDefinition {
        name: raw.name.unwrap_or_else(|| raw.id.clone()),
        id: raw.id,
        difficulties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_difficulty_order_and_waves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions.json");
        std::fs::write(
            &path,
            r#"[{
              "id": "mission_001",
              "name": "Land of Waves",
              "difficulties": {
                "C": [{ "name": "Bridge", "waves": [{ "enemies": ["bandit", "bandit"] }, { "enemies": ["zabuza"] }] }],
                "A": [{ "waves": [{ "enemies": ["zabuza", "haku"] }] }, { "waves": [] }]
              }
            }]"#,
        )
        .unwrap();

        let missions = MissionLoader::load(&path).unwrap();
        let mission = &missions[0];
        let names: Vec<&str> = mission.difficulties.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(names, ["C", "A"]);

        let (difficulty, stages) = mission.stages("S").unwrap();
        assert_eq!(difficulty, "C");
        assert_eq!(stages[0].name.as_deref(), Some("Bridge"));
        assert_eq!(stages[0].waves[0].enemies, ["bandit", "bandit"]);

        let (_, hard) = mission.stages("a").unwrap();
        assert_eq!(hard.len(), 2);
        assert!(hard[1].waves.is_empty());
    }

    #[test]
    fn bad_stage_shape_names_the_difficulty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missions.json");
        std::fs::write(&path, r#"[{ "id": "m", "difficulties": { "B": 3 } }]"#).unwrap();
        let err = MissionLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("difficulty 'B' of mission 'm'"));
    }
}
