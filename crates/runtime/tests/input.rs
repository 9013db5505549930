//! Player input and session controls sent through the handle.
mod common;

use battle_core::{ActionKind, BattleEvent, ChakraMode, UnitId};
use battle_runtime::{RuntimeHandle, Topic};
use common::{SCENARIO_TIMEOUT, builder, drain, payloads};
use tokio::sync::broadcast;

/// Waits for the next `AwaitingInput` on the turn topic.
async fn next_awaiting(turn_rx: &mut broadcast::Receiver<battle_runtime::Event>) -> UnitId {
    tokio::time::timeout(SCENARIO_TIMEOUT, async {
        loop {
            let event = turn_rx.recv().await.unwrap();
            if let BattleEvent::AwaitingInput { unit } = event.payload {
                return unit;
            }
        }
    })
    .await
    .expect("a player unit should await input")
}

async fn first_enemy(handle: &RuntimeHandle) -> UnitId {
    let snapshot = handle.query_snapshot().await.unwrap();
    snapshot.state.roster.enemies()[0].id
}

#[tokio::test]
async fn click_without_chakra_keeps_mode_none() {
    let runtime = builder("training", &["hero"]).build().await.unwrap();
    let handle = runtime.handle();
    let mut turn_rx = handle.subscribe(Topic::Turn).unwrap();
    let mut combat_rx = handle.subscribe(Topic::Combat).unwrap();

    let hero = next_awaiting(&mut turn_rx).await;
    let snapshot = handle.query_snapshot().await.unwrap();
    assert_eq!(snapshot.state.roster.unit(hero).unwrap().chakra, 0);

    // One click needs 4 chakra for jutsu.
    handle.click_unit(hero).await.unwrap();
    let snapshot = handle.query_snapshot().await.unwrap();
    assert_eq!(
        snapshot.state.roster.unit(hero).unwrap().chakra_mode,
        ChakraMode::None
    );
    assert_eq!(snapshot.awaiting, Some(hero));

    let enemy = first_enemy(&handle).await;
    handle.click_unit(enemy).await.unwrap();

    let events = drain(&mut combat_rx);
    let actions: Vec<ActionKind> = payloads(&events)
        .into_iter()
        .filter_map(|e| match e {
            BattleEvent::ActionPerformed { unit, action, .. } if *unit == hero => Some(*action),
            _ => None,
        })
        .collect();
    assert_eq!(actions, vec![ActionKind::Attack]);
    assert!(
        !payloads(&events)
            .iter()
            .any(|e| matches!(e, BattleEvent::ChakraModeChanged { .. })),
        "a failed click must not select a mode"
    );
}

#[tokio::test]
async fn input_outside_a_player_turn_is_rejected() {
    // In auto mode no player unit ever waits for input.
    let runtime = builder("training", &["hero"])
        .auto_mode(true)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    let err = handle.guard().await.unwrap_err();
    assert!(err.is_rejected_input(), "{err}");
}

#[tokio::test]
async fn controls_report_their_new_values() {
    let runtime = builder("training", &["hero"]).build().await.unwrap();
    let handle = runtime.handle();
    let mut turn_rx = handle.subscribe(Topic::Turn).unwrap();

    handle.pause().await.unwrap();
    assert!(handle.query_snapshot().await.unwrap().state.turn.paused);
    handle.resume().await.unwrap();
    assert!(!handle.query_snapshot().await.unwrap().state.turn.paused);

    assert_eq!(handle.cycle_speed().await.unwrap(), 2);
    assert_eq!(handle.cycle_speed().await.unwrap(), 3);
    assert_eq!(handle.cycle_speed().await.unwrap(), 1);
    assert!(handle.toggle_auto().await.unwrap());

    let controls: Vec<BattleEvent> = drain(&mut turn_rx)
        .into_iter()
        .map(|e| e.payload)
        .filter(|e| {
            matches!(
                e,
                BattleEvent::Paused
                    | BattleEvent::Resumed
                    | BattleEvent::SpeedChanged { .. }
                    | BattleEvent::AutoModeChanged { .. }
            )
        })
        .collect();
    assert_eq!(
        controls,
        vec![
            BattleEvent::Paused,
            BattleEvent::Resumed,
            BattleEvent::SpeedChanged { multiplier: 2 },
            BattleEvent::SpeedChanged { multiplier: 3 },
            BattleEvent::SpeedChanged { multiplier: 1 },
            BattleEvent::AutoModeChanged { enabled: true },
        ]
    );
}

#[tokio::test]
async fn force_end_turn_releases_the_awaiting_unit() {
    let runtime = builder("training", &["hero"]).build().await.unwrap();
    let handle = runtime.handle();
    let mut turn_rx = handle.subscribe(Topic::Turn).unwrap();

    let hero = next_awaiting(&mut turn_rx).await;
    assert!(handle.force_end_turn().await.unwrap());

    assert!(
        payloads(&drain(&mut turn_rx))
            .iter()
            .any(|e| matches!(e, BattleEvent::TurnEnded { unit } if *unit == hero))
    );
}
