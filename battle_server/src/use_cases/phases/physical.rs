// Physical attack declarations against adjacent enemies.

use tracing::{debug, info, warn};

use super::{PhaseOutcome, activate_step, build_order, finish_play};
use crate::domain::units::Unit;
use crate::use_cases::commands::Command;
use crate::use_cases::game::GameContext;
use crate::use_cases::turn_order::TurnOrder;

fn can_attack(unit: &Unit) -> bool {
    unit.is_operational() && unit.is_deployed() && !unit.physical_declared
}

#[derive(Debug, Default)]
pub struct PhysicalAttackPhase {
    order: TurnOrder,
}

impl PhysicalAttackPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        self.order = build_order(ctx, can_attack);
        activate_step(&mut self.order, ctx, can_attack)
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        match command {
            Command::PhysicalAttack(attack) => {
                let Some(attacker) = ctx
                    .roster
                    .owned_unit(attack.player_id, attack.attacker_id)
                    .filter(|u| can_attack(u))
                else {
                    debug!(unit_id = %attack.attacker_id, "unit cannot make a physical attack now");
                    return Some(PhaseOutcome::Stay);
                };
                let valid_target = ctx.roster.unit(attack.target_id).is_some_and(|target| {
                    target.owner_id != Some(attack.player_id)
                        && target.is_operational()
                        && match (attacker.position, target.position) {
                            (Some(from), Some(to)) => from.coordinates.distance_to(to.coordinates) == 1,
                            _ => false,
                        }
                });
                if !valid_target {
                    warn!(unit_id = %attack.attacker_id, target_id = %attack.target_id, "physical attack needs an adjacent enemy");
                    return Some(PhaseOutcome::Stay);
                }

                info!(unit_id = %attack.attacker_id, target_id = %attack.target_id, attack = ?attack.attack_type, "physical attack declared");
                ctx.accept(command);
                Some(finish_play(&mut self.order, ctx, can_attack))
            }
            Command::TurnEnded(_) => {
                // Passing spends the rest of the step.
                ctx.accept(command);
                self.order.advance();
                Some(activate_step(&mut self.order, ctx, can_attack))
            }
            _ => None,
        }
    }
}
