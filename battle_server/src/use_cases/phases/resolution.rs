// Weapon attack resolution: rolls every declared attack and broadcasts the results.

use tracing::{debug, error, info};
use uuid::Uuid;

use super::PhaseOutcome;
use crate::domain::rules::PhysicalAttackType;
use crate::domain::units::WeaponMount;
use crate::use_cases::combat;
use crate::use_cases::commands::{AttackKind, AttackResolution, Command, WeaponAttackResolutionCommand};
use crate::use_cases::game::GameContext;

struct PendingAttack {
    player_id: Uuid,
    attacker_id: Uuid,
    target_id: Uuid,
    kind: PendingKind,
}

enum PendingKind {
    Weapon { mount: WeaponMount, is_primary_target: bool },
    Physical(PhysicalAttackType),
}

#[derive(Debug, Default)]
pub struct ResolutionPhase;

impl ResolutionPhase {
    pub fn enter(&mut self, ctx: &mut GameContext) -> PhaseOutcome {
        let attacks = pending_attacks(ctx);
        info!(turn = ctx.turn, attacks = attacks.len(), "resolving attacks");
        for attack in attacks {
            if let Some(command) = resolve(ctx, &attack) {
                ctx.commit(command);
            }
        }
        PhaseOutcome::Advance
    }
}

/// Weapon attacks first, then physical ones; each in initiative order, then unit order.
fn pending_attacks(ctx: &GameContext) -> Vec<PendingAttack> {
    let players: Vec<_> = ctx
        .initiative_order
        .iter()
        .filter_map(|id| ctx.roster.player(*id))
        .collect();

    let mut attacks = Vec::new();
    for player in &players {
        for unit in &player.units {
            attacks.extend(unit.weapon_targets.iter().map(|target| PendingAttack {
                player_id: player.id,
                attacker_id: unit.id,
                target_id: target.target_id,
                kind: PendingKind::Weapon {
                    mount: target.weapon,
                    is_primary_target: target.is_primary_target,
                },
            }));
        }
    }
    for player in &players {
        for unit in &player.units {
            if let Some(declaration) = unit.physical_attack {
                attacks.push(PendingAttack {
                    player_id: player.id,
                    attacker_id: unit.id,
                    target_id: declaration.target_id,
                    kind: PendingKind::Physical(declaration.attack_type),
                });
            }
        }
    }
    attacks
}

fn resolve(ctx: &mut GameContext, attack: &PendingAttack) -> Option<Command> {
    let (Some(attacker), Some(target), Some(map)) = (
        ctx.roster.unit(attack.attacker_id),
        ctx.roster.unit(attack.target_id),
        ctx.map.as_ref(),
    ) else {
        return None;
    };
    // Fire is simultaneous: destroyed attackers still shoot, destroyed targets are not shot again.
    if target.is_destroyed() {
        debug!(unit_id = %attacker.id, target_id = %target.id, "target already destroyed");
        return None;
    }

    let (kind, result): (AttackKind, Result<Option<AttackResolution>, _>) = match attack.kind {
        PendingKind::Weapon {
            mount,
            is_primary_target,
        } => (
            AttackKind::Weapon { mount },
            combat::resolve_weapon(
                &ctx.calculator,
                ctx.dice.as_mut(),
                map,
                attacker,
                target,
                mount,
                is_primary_target,
            ),
        ),
        PendingKind::Physical(attack_type) => (
            AttackKind::Physical { attack_type },
            combat::resolve_physical(&ctx.calculator, ctx.dice.as_mut(), attacker, target, attack_type)
                .map(Some),
        ),
    };

    let resolution = match result {
        Ok(Some(resolution)) => resolution,
        Ok(None) => {
            debug!(unit_id = %attack.attacker_id, "weapon can no longer fire");
            return None;
        }
        Err(e) => {
            error!(unit_id = %attack.attacker_id, target_id = %attack.target_id, error = %e, "attack could not be resolved");
            return None;
        }
    };

    info!(
        unit_id = %attack.attacker_id,
        target_id = %attack.target_id,
        weapon = %resolution.weapon_name,
        to_hit = resolution.to_hit_number,
        roll = resolution.attack_roll,
        hit = resolution.is_hit,
        damage = resolution.total_damage(),
        "attack resolved"
    );
    let (game_origin_id, timestamp) = ctx.stamp();
    Some(Command::WeaponAttackResolution(WeaponAttackResolutionCommand {
        game_origin_id,
        timestamp,
        player_id: attack.player_id,
        attacker_id: attack.attacker_id,
        target_id: attack.target_id,
        attack: kind,
        resolution,
    }))
}
