use std::collections::HashMap;

use super::*;
use crate::env::{
    BaseStats, CharacterDefinition, ContentOracle, EnemyTemplate, MissionDefinition,
    StageDefinition, WaveDefinition,
};
use crate::skill::{LastStand, LastStandTarget, TierCode};
use crate::state::StatusKind;

const STEP_MS: u64 = 50;

#[derive(Default)]
struct Fixture {
    characters: HashMap<String, CharacterDefinition>,
    enemies: HashMap<String, EnemyTemplate>,
    missions: HashMap<String, MissionDefinition>,
    last_stands: HashMap<String, LastStand>,
}

impl ContentOracle for Fixture {
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

impl Fixture {
    fn character(mut self, id: &str, stats: BaseStats) -> Self {
        self.characters.insert(
            id.into(),
            CharacterDefinition {
                id: id.into(),
                name: id.to_uppercase(),
                element: None,
                base_tier: TierCode::S5,
                stats: Some(stats),
                ..CharacterDefinition::default()
            },
        );
        self
    }

    fn support(mut self, id: &str, field: Option<&str>, buddy: Option<&str>) -> Self {
        if let Some(character) = self.characters.get_mut(id) {
            character.field_skill = field.map(str::to_owned);
            character.buddy_skill = buddy.map(str::to_owned);
        }
        self
    }

    fn last_stand(mut self, ultimate: LastStand) -> Self {
        self.last_stands.insert(ultimate.id.clone(), ultimate);
        self
    }

    fn enemy(mut self, id: &str, stats: BaseStats) -> Self {
        self.enemies.insert(
            id.into(),
            EnemyTemplate {
                id: id.into(),
                name: id.to_uppercase(),
                element: None,
                stats,
                abilities: Vec::new(),
            },
        );
        self
    }

    /// One difficulty, `stages[stage][wave]` lists enemy ids.
    fn mission(mut self, id: &str, stages: &[&[&[&str]]]) -> Self {
        let stages = stages
            .iter()
            .map(|waves| StageDefinition {
                name: None,
                waves: waves
                    .iter()
                    .map(|ids| WaveDefinition {
                        enemies: ids.iter().map(|s| s.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        self.missions.insert(
            id.into(),
            MissionDefinition {
                id: id.into(),
                name: id.into(),
                difficulties: vec![("normal".into(), stages)],
            },
        );
        self
    }
}

fn content() -> Fixture {
    Fixture::default()
        .character("hero", BaseStats::new(5000, 1000, 50, 150))
        .character("weakling", BaseStats::new(10, 1, 0, 100))
        .enemy("dummy", BaseStats::new(100, 1, 0, 10))
        .enemy("ogre", BaseStats::new(100_000, 500, 500, 150))
        .mission("training", &[&[&["dummy"], &["dummy"]], &[&["dummy"]]])
        .mission("ogre_den", &[&[&["ogre"]]])
}

fn team(ids: &[&str]) -> TeamSpec {
    TeamSpec {
        active: ids
            .iter()
            .enumerate()
            .map(|(slot, id)| TeamMember::new(*id, slot as u8))
            .collect(),
        ..TeamSpec::default()
    }
}

/// Ticks until the session finishes or `max_ticks` elapse.
fn run(session: &mut BattleSession, events: &mut Vec<BattleEvent>, max_ticks: u64) -> u64 {
    let mut now = 0;
    for _ in 0..max_ticks {
        if session.is_finished() {
            break;
        }
        session.tick(now, events).unwrap();
        now += STEP_MS;
    }
    now
}

/// Ticks until a player unit waits for input.
fn until_awaiting(session: &mut BattleSession, events: &mut Vec<BattleEvent>) -> (UnitId, u64) {
    let mut now = 0;
    for _ in 0..200 {
        session.tick(now, events).unwrap();
        if let Some(unit) = session.awaiting() {
            return (unit, now);
        }
        now += STEP_MS;
    }
    panic!("no player turn within 200 ticks");
}

#[test]
fn build_rejects_bad_input() {
    let content = content();
    let err = SessionBuilder::new(&content, "missing")
        .team(team(&["hero"]))
        .build()
        .err()
        .unwrap();
    assert_eq!(err, SessionError::UnknownMission("missing".into()));

    let err = SessionBuilder::new(&content, "training").build().err().unwrap();
    assert_eq!(err, SessionError::EmptyTeam);
    assert_eq!(err.severity(), ErrorSeverity::Fatal);

    let err = SessionBuilder::new(&content, "training")
        .team(team(&["nobody"]))
        .build()
        .err()
        .unwrap();
    assert_eq!(err, SessionError::UnknownCharacter("nobody".into()));
}

#[test]
fn first_tick_loads_the_first_wave() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .seed(3)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    session.tick(0, &mut events).unwrap();

    assert!(matches!(
        events.first(),
        Some(BattleEvent::WaveStarted { stage: 0, wave: 0, .. })
    ));
    assert_eq!(session.state().roster.enemies().len(), 1);
    assert!(
        session
            .state()
            .roster
            .units()
            .all(|u| u.speed_gauge < session.config().initial_gauge_spread)
    );
}

#[test]
fn player_turn_waits_for_a_target_click() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "ogre_den")
        .team(team(&["hero"]))
        .seed(11)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    let (hero, now) = until_awaiting(&mut session, &mut events);
    assert!(events.contains(&BattleEvent::AwaitingInput { unit: hero }));

    // the lock holds across ticks until the player acts
    session.tick(now + STEP_MS, &mut events).unwrap();
    assert_eq!(session.awaiting(), Some(hero));
    assert!(session.state().turn.is_acting(hero));

    let ogre = session.state().roster.enemies()[0].id;
    events.clear();
    session.click_unit(ogre, now + 2 * STEP_MS, &mut events).unwrap();

    assert_eq!(session.awaiting(), None);
    assert!(!session.state().turn.locked);
    assert!(events.iter().any(|e| matches!(
        e,
        BattleEvent::ActionPerformed {
            action: crate::events::ActionKind::Attack,
            ..
        }
    )));
    assert!(events.contains(&BattleEvent::TurnEnded { unit: hero }));
}

#[test]
fn self_click_needs_chakra_and_expires() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "ogre_den")
        .team(team(&["hero"]))
        .seed(5)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    let (hero, now) = until_awaiting(&mut session, &mut events);

    // no chakra yet: the click is rejected and the mode stays NONE
    session.click_unit(hero, now, &mut events).unwrap();
    assert_eq!(
        session.state().roster.unit(hero).unwrap().chakra_mode,
        ChakraMode::None
    );

    session.state.roster.unit_mut(hero).unwrap().chakra = 4;
    events.clear();
    session.click_unit(hero, now + 500, &mut events).unwrap();
    assert_eq!(
        events,
        vec![BattleEvent::ChakraModeChanged {
            unit: hero,
            mode: ChakraMode::Jutsu
        }]
    );

    let window = session.config().click_window_ms;
    events.clear();
    session.tick(now + 500 + window, &mut events).unwrap();
    assert!(events.contains(&BattleEvent::ChakraModeChanged {
        unit: hero,
        mode: ChakraMode::None
    }));
    assert_eq!(session.awaiting(), Some(hero));
}

#[test]
fn ally_click_and_idle_calls_are_harmless() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "ogre_den")
        .team(team(&["hero", "weakling"]))
        .seed(9)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    assert_eq!(
        session.guard(&mut events),
        Err(SessionError::NotAwaitingInput)
    );

    let (actor, now) = until_awaiting(&mut session, &mut events);
    let ally = session
        .state()
        .roster
        .active()
        .iter()
        .map(|u| u.id)
        .find(|id| *id != actor)
        .unwrap();
    session.click_unit(ally, now, &mut events).unwrap();
    assert_eq!(session.awaiting(), Some(actor));
}

#[test]
fn auto_battle_clears_every_wave_then_wins_once() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .auto_mode(true)
        .seed(21)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    run(&mut session, &mut events, 2_000);

    let summary = session.summary().cloned().unwrap();
    assert_eq!(summary.outcome, Outcome::Victory);
    assert_eq!((summary.stage, summary.wave), (2, 1));
    assert_eq!(summary.surviving, 1);

    let waves = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::WaveStarted { .. }))
        .count();
    assert_eq!(waves, 3);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, BattleEvent::StageCleared { stage: 0 }))
            .count(),
        1
    );
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

    // finished sessions ignore further ticks and input
    events.clear();
    session.tick(1_000_000, &mut events).unwrap();
    assert!(events.is_empty());
    assert_eq!(session.guard(&mut events), Err(SessionError::Finished));
}

#[test]
fn wiped_team_is_defeated() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "ogre_den")
        .team(team(&["weakling"]))
        .auto_mode(true)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    run(&mut session, &mut events, 2_000);

    let summary = session.summary().unwrap();
    assert_eq!(summary.outcome, Outcome::Defeat);
    assert_eq!(summary.team_hp, 0);
    assert_eq!(summary.hp_percent, 0);
    assert!(session.state().turn.paused);
}

#[test]
fn hard_modifier_doubles_enemy_stats() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .modifiers(MissionModifiers::HARD)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    session.start(&mut events).unwrap();

    let dummy = &session.state().roster.enemies()[0];
    assert_eq!(dummy.stats.max_hp, 200);
    assert_eq!(dummy.stats.hp, 200);
    assert_eq!(dummy.stats.atk, 2);
    assert_eq!(dummy.stats.def, 0);
}

#[test]
fn survival_repeats_the_last_wave_with_scaling() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .modifiers(MissionModifiers::SURVIVAL)
        .auto_mode(true)
        .seed(4)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    let mut now = 0;
    while session.progress().survival_round < 2 {
        session.tick(now, &mut events).unwrap();
        now += STEP_MS;
        assert!(now < 1_000_000, "survival rounds never started");
    }

    let dummy = &session.state().roster.enemies()[0];
    // 100 * (1 + 0.2 * 2)
    assert_eq!(dummy.stats.max_hp, 140);
    assert!(!session.is_finished());
}

#[test]
fn paused_session_does_not_advance() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    session.tick(0, &mut events).unwrap();
    session.pause(&mut events);
    let before = session.snapshot();

    for step in 1..50 {
        session.tick(step * STEP_MS, &mut events).unwrap();
    }
    assert_eq!(session.snapshot().state, before.state);
    assert_eq!(events.last(), Some(&BattleEvent::Paused));

    session.resume(&mut events);
    assert_eq!(events.last(), Some(&BattleEvent::Resumed));
    assert!(!session.state().turn.paused);
}

#[test]
fn controls_report_their_changes() {
    let content = content();
    let mut session = SessionBuilder::new(&content, "training")
        .team(team(&["hero"]))
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();

    assert_eq!(session.cycle_speed(&mut events), 2);
    assert!(session.toggle_auto(&mut events));
    assert_eq!(
        events,
        vec![
            BattleEvent::SpeedChanged { multiplier: 2 },
            BattleEvent::AutoModeChanged { enabled: true },
        ]
    );
}

#[test]
fn speed_run_failure_is_reported_once() {
    let content = content();
    let config = BattleConfig {
        speed_run_limit_ms: 100,
        ..BattleConfig::default()
    };
    let mut session = SessionBuilder::new(&content, "ogre_den")
        .team(team(&["hero"]))
        .modifiers(MissionModifiers::SPEED_RUN)
        .config(config)
        .auto_mode(true)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    for step in 0..10 {
        session.tick(step * STEP_MS, &mut events).unwrap();
    }
    let failures = events
        .iter()
        .filter(|e| matches!(e, BattleEvent::SpeedRunFailed { .. }))
        .count();
    assert_eq!(failures, 1);
    assert!(session.snapshot().speed_run_failed);
}

#[test]
fn team_load_applies_field_and_buddy_skills() {
    let content = content()
        .support("hero", Some("Boosts attack by 80-120"), Some("Boosts HP by 500"))
        .support("weakling", Some("Boosts attack by 999"), Some("Boosts speed by 20"));
    let spec = TeamSpec {
        active: vec![TeamMember::new("hero", 0)],
        bench: vec![TeamMember::new("weakling", 0)],
        commander: None,
    };
    let session = SessionBuilder::new(&content, "training")
        .team(spec)
        .build()
        .unwrap();

    let roster = &session.state().roster;
    let hero = &roster.active()[0];
    let field = hero
        .statuses
        .iter()
        .find(|e| e.tag.as_deref() == Some(FIELD_SKILL_TAG))
        .unwrap();
    assert_eq!(field.payload.buff.atk_boost, 100);
    assert_eq!(hero.stats.speed, 170);
    assert_eq!(hero.stats.max_hp, 5000);

    let bench = &roster.bench()[0];
    assert_eq!(bench.stats.max_hp, 510);
    assert_eq!(bench.stats.hp, 510);
    assert!(!bench.statuses.has(StatusKind::Buff));
}

#[test]
fn unknown_last_stand_is_rejected() {
    let content = content();
    let spec = TeamSpec {
        active: vec![TeamMember::new("hero", 0).with_last_stand("nope")],
        ..TeamSpec::default()
    };
    let err = SessionBuilder::new(&content, "training")
        .team(spec)
        .build()
        .err()
        .unwrap();
    assert_eq!(err, SessionError::UnknownLastStand("nope".into()));
}

#[test]
fn charged_last_stand_clears_the_wave_once() {
    let content = content()
        .enemy("sandbag", BaseStats::new(20_000, 1, 0, 10))
        .mission("yard", &[&[&["sandbag"]]])
        .last_stand(
            LastStand::new("finisher", "Massive Rasengan", LastStandTarget::AllEnemies)
                .with_power(5000),
        );
    let spec = TeamSpec {
        active: vec![TeamMember::new("hero", 0).with_last_stand("finisher")],
        ..TeamSpec::default()
    };
    let mut session = SessionBuilder::new(&content, "yard")
        .team(spec)
        .seed(5)
        .build()
        .unwrap();
    let mut events: Vec<BattleEvent> = Vec::new();
    let hero = session.state().roster.active()[0].id;

    let mut now = 0;
    let mut attacks = 0;
    while attacks < 3 {
        session.tick(now, &mut events).unwrap();
        now += STEP_MS;
        if session.awaiting() == Some(hero) {
            assert_eq!(
                session.last_stand(hero, None, &mut events),
                Err(SessionError::Action(ActionError::LastStandNotReady(hero)))
            );
            let sandbag = session.state().roster.enemies()[0].id;
            session.click_unit(sandbag, now, &mut events).unwrap();
            attacks += 1;
        }
        assert!(now < 100_000, "hero never got three turns");
    }
    assert!(events.contains(&BattleEvent::LastStandReady { unit: hero }));
    assert!(!session.is_finished());

    session.last_stand(hero, None, &mut events).unwrap();

    let summary = session.summary().cloned().unwrap();
    assert_eq!(summary.outcome, Outcome::Victory);
    assert_eq!(session.last_stand(hero, None, &mut events), Err(SessionError::Finished));
}

