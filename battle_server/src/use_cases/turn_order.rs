// Alternating turn order for the movement and attack phases.

use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStep {
    pub player_id: Uuid,
    pub units_to_play: u32,
}

/// Builds the steps of a phase from the initiative order (loser first).
///
/// Each round, every player with units left plays `max(1, remaining / min_remaining)`
/// of them, so players with more units spread them over the rounds.
pub fn build_turn_order(initiative_order: &[Uuid], unit_counts: &BTreeMap<Uuid, u32>) -> Vec<TurnStep> {
    let mut remaining: Vec<(Uuid, u32)> = initiative_order
        .iter()
        .map(|id| (*id, unit_counts.get(id).copied().unwrap_or(0)))
        .filter(|(_, count)| *count > 0)
        .collect();
    let mut steps = Vec::new();

    while let Some(min_remaining) = remaining
        .iter()
        .map(|(_, count)| *count)
        .filter(|count| *count > 0)
        .min()
    {
        for (player_id, count) in remaining.iter_mut().filter(|(_, count)| *count > 0) {
            let units = (*count / min_remaining).max(1).min(*count);
            *count -= units;
            steps.push(TurnStep {
                player_id: *player_id,
                units_to_play: units,
            });
        }
    }
    steps
}

/// Progress through the steps of one phase.
#[derive(Debug, Clone, Default)]
pub struct TurnOrder {
    steps: Vec<TurnStep>,
    index: usize,
    played: u32,
}

impl TurnOrder {
    pub fn new(steps: Vec<TurnStep>) -> Self {
        Self {
            steps,
            index: 0,
            played: 0,
        }
    }

    pub fn current(&self) -> Option<TurnStep> {
        self.steps.get(self.index).copied()
    }

    /// Counts one unit played; true once the current step is used up.
    pub fn record_play(&mut self) -> bool {
        self.played += 1;
        self.current()
            .is_none_or(|step| self.played >= step.units_to_play)
    }

    pub fn advance(&mut self) {
        self.index += 1;
        self.played = 0;
    }

    pub fn steps(&self) -> &[TurnStep] {
        &self.steps
    }
}
