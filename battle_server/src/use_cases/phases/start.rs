// Start: players join and declare themselves ready.

use tracing::{debug, info};

use super::PhaseOutcome;
use crate::use_cases::commands::Command;
use crate::use_cases::game::GameContext;

#[derive(Debug, Default)]
pub struct StartPhase;

impl StartPhase {
    /// Ready once a map is set and every joined player is playing.
    pub fn gate(ctx: &GameContext) -> PhaseOutcome {
        if ctx.map.is_some() && ctx.roster.all_playing() {
            PhaseOutcome::Advance
        } else {
            PhaseOutcome::Stay
        }
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        match command {
            Command::JoinGame(join) => {
                if ctx.roster.player(join.player_id).is_some() {
                    debug!(player_id = %join.player_id, "duplicate join ignored");
                    return Some(PhaseOutcome::Stay);
                }
                if ctx.accept(command) {
                    info!(player_id = %join.player_id, name = %join.player_name, units = join.units.len(), "player joined");
                }
                Some(Self::gate(ctx))
            }
            Command::UpdatePlayerStatus(update) => {
                if ctx.roster.player(update.player_id).is_none() {
                    debug!(player_id = %update.player_id, "status update for unknown player");
                    return Some(PhaseOutcome::Stay);
                }
                ctx.accept(command);
                info!(player_id = %update.player_id, status = ?update.player_status, "player status changed");
                Some(Self::gate(ctx))
            }
            _ => None,
        }
    }
}
