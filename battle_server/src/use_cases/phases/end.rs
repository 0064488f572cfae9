// End: waits for every player to end the turn, then increments it.

use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;

use super::PhaseOutcome;
use crate::domain::player::PlayerStatus;
use crate::use_cases::commands::{Command, TurnIncrementedCommand};
use crate::use_cases::game::GameContext;

#[derive(Debug, Default)]
pub struct EndPhase {
    pending: BTreeSet<Uuid>,
}

impl EndPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        self.pending = ctx
            .roster
            .players()
            .iter()
            .filter(|p| p.status == PlayerStatus::Playing && p.surviving_units().next().is_some())
            .map(|p| p.id)
            .collect();
        if self.pending.is_empty() {
            // Nobody can end the turn; stay so the machine does not spin.
            info!(turn = ctx.turn, "no player left to end the turn");
        }
        PhaseOutcome::Stay
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        let Command::TurnEnded(end) = command else {
            return None;
        };
        if !self.pending.remove(&end.player_id) {
            debug!(player_id = %end.player_id, "turn already ended for player");
            return Some(PhaseOutcome::Stay);
        }
        ctx.accept(command);
        if !self.pending.is_empty() {
            return Some(PhaseOutcome::Stay);
        }

        ctx.turn += 1;
        let (game_origin_id, timestamp) = ctx.stamp();
        ctx.commit(Command::TurnIncremented(TurnIncrementedCommand {
            game_origin_id,
            timestamp,
            turn_number: ctx.turn,
        }));
        info!(turn = ctx.turn, "turn incremented");
        Some(PhaseOutcome::Advance)
    }
}
