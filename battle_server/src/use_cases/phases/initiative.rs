// Initiative: every player rolls 2d6; ties re-roll; lowest roll moves first.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};
use uuid::Uuid;

use super::PhaseOutcome;
use crate::domain::dice;
use crate::domain::player::PlayerStatus;
use crate::use_cases::commands::{Command, DiceRolledCommand};
use crate::use_cases::game::GameContext;

#[derive(Debug, Default)]
pub struct InitiativePhase {
    // Every roll a player made this phase, re-rolls appended.
    rolls: BTreeMap<Uuid, Vec<u32>>,
    pending: BTreeSet<Uuid>,
}

impl InitiativePhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        ctx.set_active_player(None, 0);
        self.rolls = ctx
            .roster
            .players()
            .iter()
            .filter(|p| p.status == PlayerStatus::Playing && p.surviving_units().next().is_some())
            .map(|p| (p.id, Vec::new()))
            .collect();
        self.pending = self.rolls.keys().copied().collect();
        if self.pending.is_empty() {
            info!(turn = ctx.turn, "no player left to roll initiative");
        }
        PhaseOutcome::Stay
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        let Command::RollDice(roll) = command else {
            return None;
        };
        if !self.pending.remove(&roll.player_id) {
            debug!(player_id = %roll.player_id, "player has no initiative roll pending");
            return Some(PhaseOutcome::Stay);
        }

        ctx.accept(command);
        let value = dice::total(&ctx.roll_2d6());
        self.rolls.entry(roll.player_id).or_default().push(value);
        let (game_origin_id, timestamp) = ctx.stamp();
        ctx.commit(Command::DiceRolled(DiceRolledCommand {
            game_origin_id,
            timestamp,
            player_id: roll.player_id,
            roll: value,
        }));

        if !self.pending.is_empty() {
            return Some(PhaseOutcome::Stay);
        }

        self.pending = tied_players(&self.rolls);
        if !self.pending.is_empty() {
            debug!(tied = self.pending.len(), "initiative tie, re-rolling");
            return Some(PhaseOutcome::Stay);
        }

        ctx.initiative_order = initiative_order(&self.rolls);
        info!(turn = ctx.turn, order = ?ctx.initiative_order, "initiative resolved");
        Some(PhaseOutcome::Advance)
    }
}

fn tied_players(rolls: &BTreeMap<Uuid, Vec<u32>>) -> BTreeSet<Uuid> {
    rolls
        .iter()
        .filter(|(id, history)| rolls.iter().any(|(other, h)| other != *id && h == *history))
        .map(|(id, _)| *id)
        .collect()
}

/// Ascending by roll history, so the loser of initiative acts first.
fn initiative_order(rolls: &BTreeMap<Uuid, Vec<u32>>) -> Vec<Uuid> {
    let mut order: Vec<(&Uuid, &Vec<u32>)> = rolls.iter().collect();
    order.sort_by(|a, b| a.1.cmp(b.1));
    order.into_iter().map(|(id, _)| *id).collect()
}
