// Deployment: players take turns placing one unit each, in join order.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::PhaseOutcome;
use crate::domain::player::PlayerStatus;
use crate::use_cases::commands::Command;
use crate::use_cases::game::GameContext;

#[derive(Debug, Default)]
pub struct DeploymentPhase;

impl DeploymentPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        self.activate_next(ctx, None)
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        let Command::DeployUnit(deploy) = command else {
            return None;
        };

        let Some(unit) = ctx.roster.owned_unit(deploy.player_id, deploy.unit_id) else {
            debug!(player_id = %deploy.player_id, unit_id = %deploy.unit_id, "deploy for unit the player does not own");
            return Some(PhaseOutcome::Stay);
        };
        if unit.is_deployed() || unit.is_destroyed() {
            debug!(unit_id = %unit.id, "unit cannot be deployed");
            return Some(PhaseOutcome::Stay);
        }
        if !ctx.map.as_ref().is_some_and(|map| map.contains(deploy.position)) {
            warn!(unit_id = %unit.id, q = deploy.position.q, r = deploy.position.r, "deploy position off the map");
            return Some(PhaseOutcome::Stay);
        }
        if ctx.roster.unit_at(deploy.position).is_some() {
            warn!(unit_id = %unit.id, q = deploy.position.q, r = deploy.position.r, "deploy position occupied");
            return Some(PhaseOutcome::Stay);
        }

        if ctx.accept(command) {
            info!(player_id = %deploy.player_id, unit_id = %deploy.unit_id, "unit deployed");
        }
        Some(self.activate_next(ctx, Some(deploy.player_id)))
    }

    fn activate_next(&mut self, ctx: &mut GameContext, after: Option<Uuid>) -> PhaseOutcome {
        match next_deployer(ctx, after) {
            Some(player_id) => {
                ctx.set_active_player(Some(player_id), 1);
                PhaseOutcome::Stay
            }
            None => {
                ctx.set_active_player(None, 0);
                PhaseOutcome::Advance
            }
        }
    }
}

/// First player after `after` (wrapping) who still has units to place.
fn next_deployer(ctx: &GameContext, after: Option<Uuid>) -> Option<Uuid> {
    let players = ctx.roster.players();
    let start = after
        .and_then(|id| players.iter().position(|p| p.id == id))
        .map_or(0, |index| index + 1);
    (0..players.len())
        .map(|offset| &players[(start + offset) % players.len()])
        .find(|p| p.status == PlayerStatus::Playing && p.has_undeployed_units())
        .map(|p| p.id)
}
