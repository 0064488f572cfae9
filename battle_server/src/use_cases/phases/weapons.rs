// Weapons attack: torso twists and weapon-by-weapon target declarations.

use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::{PhaseOutcome, activate_step, build_order, finish_play};
use crate::domain::units::{Unit, WeaponTarget};
use crate::use_cases::commands::{Command, WeaponConfiguration};
use crate::use_cases::game::GameContext;
use crate::use_cases::turn_order::TurnOrder;

fn can_fire(unit: &Unit) -> bool {
    unit.is_operational() && unit.is_deployed() && !unit.weapons_declared
}

#[derive(Debug, Default)]
pub struct WeaponsAttackPhase {
    order: TurnOrder,
}

impl WeaponsAttackPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        self.order = build_order(ctx, can_fire);
        activate_step(&mut self.order, ctx, can_fire)
    }

    pub fn handle(&mut self, ctx: &mut GameContext, command: &Command) -> Option<PhaseOutcome> {
        match command {
            Command::WeaponConfiguration(config) => {
                let Some(unit) = ctx
                    .roster
                    .owned_unit(config.player_id, config.unit_id)
                    .filter(|u| can_fire(u))
                else {
                    debug!(unit_id = %config.unit_id, "unit cannot be configured now");
                    return Some(PhaseOutcome::Stay);
                };
                match config.configuration {
                    WeaponConfiguration::TorsoRotation { direction } => {
                        let reachable = unit
                            .position
                            .is_some_and(|p| p.facing.sides_between(direction) <= 1);
                        if !reachable {
                            warn!(unit_id = %unit.id, direction = ?direction, "torso cannot twist that far");
                            return Some(PhaseOutcome::Stay);
                        }
                    }
                }
                ctx.accept(command);
                // Configuring does not use up the unit's turn.
                Some(PhaseOutcome::Stay)
            }
            Command::WeaponAttackDeclaration(declaration) => {
                let Some(unit) = ctx
                    .roster
                    .owned_unit(declaration.player_id, declaration.unit_id)
                    .filter(|u| can_fire(u))
                else {
                    debug!(unit_id = %declaration.unit_id, "unit cannot declare attacks now");
                    return Some(PhaseOutcome::Stay);
                };
                if let Err(reason) = check_targets(ctx, unit, &declaration.weapon_targets) {
                    warn!(unit_id = %declaration.unit_id, reason, "weapon attack declaration rejected");
                    return Some(PhaseOutcome::Stay);
                }

                info!(
                    unit_id = %declaration.unit_id,
                    weapons = declaration.weapon_targets.len(),
                    "weapon attacks declared"
                );
                ctx.accept(command);
                Some(finish_play(&mut self.order, ctx, can_fire))
            }
            _ => None,
        }
    }
}

fn check_targets(ctx: &GameContext, unit: &Unit, targets: &[WeaponTarget]) -> Result<(), &'static str> {
    let mut mounts = BTreeSet::new();
    for target in targets {
        if !mounts.insert((target.weapon.location, target.weapon.slot)) {
            return Err("weapon declared twice");
        }
        match unit.weapon_at(target.weapon) {
            Some((component, _)) if !component.destroyed => {}
            Some(_) => return Err("weapon destroyed"),
            None => return Err("no weapon at mount"),
        }
        let valid = ctx.roster.unit(target.target_id).is_some_and(|enemy| {
            enemy.owner_id != unit.owner_id && enemy.is_operational() && enemy.is_deployed()
        });
        if !valid {
            return Err("target is not an active enemy unit");
        }
    }
    Ok(())
}
