//! Prints the event stream of all topics in emission order.
use std::collections::{BTreeMap, HashMap};

use battle_core::{BattleEvent, BattleSummary, DamageSource};
use battle_runtime::{Event, Topic};
use tokio::sync::broadcast::{self, error::RecvError};

/// Restores the global order of events received from several topics.
///
/// Events are held back until every lower sequence number has arrived.
#[derive(Debug, Default)]
pub struct Reorder {
    next: u64,
    pending: BTreeMap<u64, BattleEvent>,
}

impl Reorder {
    /// Buffers `event` and returns the events now ready, in order.
    pub fn push(&mut self, event: Event) -> Vec<BattleEvent> {
        self.pending.insert(event.sequence, event.payload);
        let mut ready = Vec::new();
        while let Some(payload) = self.pending.remove(&self.next) {
            ready.push(payload);
            self.next += 1;
        }
        ready
    }

    /// Gives up on missing sequences, e.g. after a receiver lagged.
    pub fn skip_gap(&mut self) {
        if let Some(&lowest) = self.pending.keys().next() {
            self.next = lowest;
        }
    }
}

/// Prints events until the encounter's terminal event.
pub async fn print_events(mut receivers: HashMap<Topic, broadcast::Receiver<Event>>) {
    let (Some(mut combat), Some(mut turn), Some(mut encounter)) = (
        receivers.remove(&Topic::Combat),
        receivers.remove(&Topic::Turn),
        receivers.remove(&Topic::Encounter),
    ) else {
        tracing::warn!("event printer started without every topic");
        return;
    };

    let mut reorder = Reorder::default();
    loop {
        let received = tokio::select! {
            received = combat.recv() => received,
            received = turn.recv() => received,
            received = encounter.recv() => received,
        };
        let event = match received {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event printer lagged");
                reorder.skip_gap();
                continue;
            }
            Err(RecvError::Closed) => return,
        };

        for payload in reorder.push(event) {
            println!("{}", describe(&payload));
            if payload.is_terminal() {
                return;
            }
        }
    }
}

/// One-line rendering of an event.
pub fn describe(event: &BattleEvent) -> String {
    match event {
        BattleEvent::TurnStarted { unit, global_turn } => format!("turn {global_turn}: {unit}"),
        BattleEvent::AwaitingInput { unit } => format!("  {unit} awaits input"),
        BattleEvent::TurnSkipped { unit, reason } => format!("  {unit} skips ({reason})"),
        BattleEvent::ActionPerformed {
            unit,
            action,
            targets,
        } => format!("  {unit} uses {action} on {}", list(targets)),
        BattleEvent::Damage {
            source,
            target,
            amount,
            is_critical,
            remaining_hp,
            ..
        } => {
            let crit = if *is_critical { " (critical)" } else { "" };
            let from = match source {
                DamageSource::Hit { attacker } => attacker.to_string(),
                DamageSource::Status(kind) => kind.to_string(),
            };
            format!("    {from} hits {target} for {amount}{crit}, {remaining_hp} hp left")
        }
        BattleEvent::Dodged { attacker, target } => format!("    {target} dodges {attacker}"),
        BattleEvent::Healed {
            target,
            amount,
            remaining_hp,
        } => format!("    {target} heals {amount}, {remaining_hp} hp"),
        BattleEvent::UnitDefeated { unit } => format!("    {unit} is defeated"),
        BattleEvent::UnitRevived { unit, hp } => format!("    {unit} revives with {hp} hp"),
        BattleEvent::StatusApplied { unit, kind, turns } => {
            format!("    {unit} gains {kind} for {turns} turns")
        }
        BattleEvent::LastStandReady { unit } => format!("    {unit} can unleash a last stand"),
        BattleEvent::WaveStarted {
            stage,
            wave,
            enemies,
        } => format!(
            "== stage {} wave {}: {} ==",
            stage + 1,
            wave + 1,
            list(enemies)
        ),
        BattleEvent::StageCleared { stage } => format!("== stage {} cleared ==", stage + 1),
        BattleEvent::Victory { summary } | BattleEvent::Defeat { summary } => summary_line(summary),
        other => format!("    {other:?}"),
    }
}

pub fn summary_line(summary: &BattleSummary) -> String {
    format!(
        "{} at stage {} wave {}: {}/{} hp ({}%), {}/{} standing, reward x{:.2}{}",
        summary.outcome.to_string().to_uppercase(),
        summary.stage,
        summary.wave,
        summary.team_hp,
        summary.team_max_hp,
        summary.hp_percent,
        summary.surviving,
        summary.total,
        summary.reward_multiplier,
        if summary.speed_run_failed {
            ", speed run failed"
        } else {
            ""
        }
    )
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::UnitId;

    #[test]
    fn releases_events_in_sequence_order() {
        let mut reorder = Reorder::default();
        assert!(reorder.push(Event::new(1, BattleEvent::Resumed)).is_empty());
        assert_eq!(
            reorder.push(Event::new(0, BattleEvent::Paused)),
            vec![BattleEvent::Paused, BattleEvent::Resumed]
        );

        assert!(reorder.push(Event::new(5, BattleEvent::Paused)).is_empty());
        reorder.skip_gap();
        assert_eq!(
            reorder.push(Event::new(6, BattleEvent::Resumed)),
            vec![BattleEvent::Paused, BattleEvent::Resumed]
        );
    }

    #[test]
    fn describes_waves_one_based() {
        let line = describe(&BattleEvent::WaveStarted {
            stage: 0,
            wave: 1,
            enemies: vec![UnitId(3), UnitId(4)],
        });
        assert_eq!(line, "== stage 1 wave 2: #3, #4 ==");
    }
}
