// Movement: players move their units in alternating steps.

use tracing::{debug, info, warn};

use super::{PhaseOutcome, activate_step, build_order, finish_play};
use crate::domain::movement::{self, validate_path};
use crate::domain::units::{MovementType, Unit};
use crate::use_cases::commands::{Command, MoveUnitCommand};
use crate::use_cases::game::GameContext;
use crate::use_cases::turn_order::TurnOrder;

fn can_move(unit: &Unit) -> bool {
    unit.is_operational() && unit.is_deployed() && !unit.has_moved()
}

#[derive(Debug, Default)]
pub struct MovementPhase {
    order: TurnOrder,
}

impl MovementPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        // Shut-down units cannot act but still need a movement record for heat and to-hit.
        let idle: Vec<_> = ctx
            .roster
            .players()
            .iter()
            .flat_map(|p| {
                p.units
                    .iter()
                    .filter(|u| u.is_shutdown() && !u.is_destroyed() && u.is_deployed() && !u.has_moved())
                    .map(move |u| (p.id, u.id))
            })
            .collect();
        for (player_id, unit_id) in idle {
            let (game_origin_id, timestamp) = ctx.stamp();
            ctx.commit(Command::MoveUnit(MoveUnitCommand {
                game_origin_id,
                timestamp,
                player_id,
                unit_id,
                movement_type: MovementType::StandingStill,
                movement_path: Vec::new(),
            }));
        }

        self.order = build_order(ctx, can_move);
        activate_step(&mut self.order, ctx, can_move)
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        let Command::MoveUnit(mv) = command else {
            return None;
        };
        let Some(unit) = ctx.roster.owned_unit(mv.player_id, mv.unit_id).filter(|u| can_move(u)) else {
            debug!(player_id = %mv.player_id, unit_id = %mv.unit_id, "unit cannot move now");
            return Some(PhaseOutcome::Stay);
        };
        let (Some(start), Some(map)) = (unit.position, ctx.map.as_ref()) else {
            return Some(PhaseOutcome::Stay);
        };

        let budget = unit.movement_points(mv.movement_type);
        let cost = match validate_path(map, start, mv.movement_type, &mv.movement_path, budget) {
            Ok(cost) => cost,
            Err(e) => {
                warn!(unit_id = %unit.id, movement = ?mv.movement_type, error = %e, "movement rejected");
                return Some(PhaseOutcome::Stay);
            }
        };
        let destination = movement::summarize(start, mv.movement_type, &mv.movement_path).final_position;
        if ctx
            .roster
            .unit_at(destination.coordinates)
            .is_some_and(|other| other.id != unit.id)
        {
            warn!(unit_id = %unit.id, q = destination.coordinates.q, r = destination.coordinates.r, "movement ends on an occupied hex");
            return Some(PhaseOutcome::Stay);
        }

        info!(unit_id = %mv.unit_id, movement = ?mv.movement_type, cost, "unit moved");
        ctx.accept(command);
        Some(finish_play(&mut self.order, ctx, can_move))
    }
}
