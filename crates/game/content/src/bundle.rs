//! In-memory [`ContentOracle`] backed by hash maps.
use std::collections::HashMap;

use battle_core::skill::LastStand;
use battle_core::{CharacterDefinition, ContentOracle, EnemyTemplate, MissionDefinition};

/// Characters, enemies, missions and Last Stand ultimates keyed by id.
///
/// Later definitions with an existing id replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct ContentBundle {
    characters: HashMap<String, CharacterDefinition>,
    enemies: HashMap<String, EnemyTemplate>,
    missions: HashMap<String, MissionDefinition>,
    last_stands: HashMap<String, LastStand>,
}

impl ContentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_character(&mut self, definition: CharacterDefinition) {
        self.characters.insert(definition.id.clone(), definition);
    }

    pub fn add_enemy(&mut self, template: EnemyTemplate) {
        self.enemies.insert(template.id.clone(), template);
    }

    pub fn add_mission(&mut self, mission: MissionDefinition) {
        self.missions.insert(mission.id.clone(), mission);
    }

    pub fn add_last_stand(&mut self, ultimate: LastStand) {
        self.last_stands.insert(ultimate.id.clone(), ultimate);
    }

    pub fn with_characters(mut self, definitions: impl IntoIterator<Item = CharacterDefinition>) -> Self {
        for definition in definitions {
            self.add_character(definition);
        }
        self
    }

    pub fn with_enemies(mut self, templates: impl IntoIterator<Item = EnemyTemplate>) -> Self {
        for template in templates {
            self.add_enemy(template);
        }
        self
    }

    pub fn with_missions(mut self, missions: impl IntoIterator<Item = MissionDefinition>) -> Self {
        for mission in missions {
            self.add_mission(mission);
        }
        self
    }

    pub fn with_last_stands(mut self, ultimates: impl IntoIterator<Item = LastStand>) -> Self {
        for ultimate in ultimates {
            self.add_last_stand(ultimate);
        }
        self
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn last_stand_count(&self) -> usize {
        self.last_stands.len()
    }

    /// Mission ids in sorted order.
    pub fn mission_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.missions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Enemy ids referenced by missions but absent from the catalogue.
    ///
    /// Such enemies still spawn with fallback stats; hosts use this to warn.
    pub fn unknown_enemy_refs(&self) -> Vec<(String, String)> {
        let mut missing = Vec::new();
        for mission in self.missions.values() {
            for (_, stages) in &mission.difficulties {
                let ids = stages.iter().flat_map(|s| &s.waves).flat_map(|w| &w.enemies);
                for id in ids {
                    let entry = (mission.id.clone(), id.clone());
                    if !self.enemies.contains_key(id) && !missing.contains(&entry) {
                        missing.push(entry);
                    }
                }
            }
        }
        missing.sort();
        missing
    }
}

impl ContentOracle for ContentBundle {
    fn character(&self, id: &str) -> Option<&CharacterDefinition> {
        self.characters.get(id)
    }

    fn enemy(&self, id: &str) -> Option<&EnemyTemplate> {
        self.enemies.get(id)
    }

    fn mission(&self, id: &str) -> Option<&MissionDefinition> {
        self.missions.get(id)
    }

    fn last_stand(&self, id: &str) -> Option<&LastStand> {
        self.last_stands.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BaseStats, StageDefinition, WaveDefinition};

    #[test]
    fn reports_missing_enemy_templates() {
        let mission = MissionDefinition {
            id: "m1".into(),
            name: "m1".into(),
            difficulties: vec![(
                "normal".into(),
                vec![StageDefinition {
                    name: None,
                    waves: vec![WaveDefinition {
                        enemies: vec!["bandit".into(), "ghost".into(), "ghost".into()],
                    }],
                }],
            )],
        };
        let bandit = EnemyTemplate {
            id: "bandit".into(),
            name: "Bandit".into(),
            element: None,
            stats: BaseStats::ENEMY_FALLBACK,
            abilities: Vec::new(),
        };
        let bundle = ContentBundle::new()
            .with_enemies([bandit])
            .with_missions([mission]);

        assert!(bundle.enemy("bandit").is_some());
        assert_eq!(bundle.mission_ids(), ["m1"]);
        assert_eq!(
            bundle.unknown_enemy_refs(),
            vec![("m1".to_string(), "ghost".to_string())]
        );
    }

    #[test]
    fn resolves_last_stands_by_id() {
        use battle_core::skill::LastStandTarget;

        let bundle = ContentBundle::new().with_last_stands([
            LastStand::new("chidori", "Lightning Blade", LastStandTarget::SingleEnemy),
            LastStand::new("chidori", "Raikiri", LastStandTarget::SingleEnemy),
        ]);
        assert_eq!(bundle.last_stand_count(), 1);
        assert_eq!(bundle.last_stand("chidori").map(|u| u.name.as_str()), Some("Raikiri"));
        assert!(bundle.last_stand("rasengan").is_none());
    }
}
