// Attack resolution: to-hit roll, hit direction, hit locations and cluster hits.

use crate::domain::dice::{self, DiceSource};
use crate::domain::errors::DomainError;
use crate::domain::hex::relative_bearing;
use crate::domain::map::BattleMap;
use crate::domain::rules::{IMPOSSIBLE_ROLL, PhysicalAttackType};
use crate::domain::to_hit::ToHitCalculator;
use crate::domain::units::{HitDirection, Unit, WeaponMount};
use crate::use_cases::commands::{AttackResolution, HitLocationData};

/// Side of `target` that faces `attacker`.
pub fn hit_direction(attacker: &Unit, target: &Unit) -> Result<HitDirection, DomainError> {
    let from = attacker
        .position
        .ok_or(DomainError::UnitNotDeployed(attacker.id))?;
    let to = target
        .position
        .ok_or(DomainError::UnitNotDeployed(target.id))?;
    let bearing = relative_bearing(to.coordinates, to.facing, from.coordinates);
    Ok(HitDirection::from_relative_bearing(bearing))
}

fn roll(dice: &mut dyn DiceSource) -> u32 {
    dice::total(&dice.roll_2d6())
}

fn hits(to_hit_number: i32, attack_roll: u32) -> bool {
    to_hit_number < IMPOSSIBLE_ROLL && attack_roll as i32 >= to_hit_number
}

/// Resolves one declared weapon. `None` when the weapon can no longer fire.
pub fn resolve_weapon(
    calculator: &ToHitCalculator,
    dice: &mut dyn DiceSource,
    map: &BattleMap,
    attacker: &Unit,
    target: &Unit,
    mount: WeaponMount,
    is_primary_target: bool,
) -> Result<Option<AttackResolution>, DomainError> {
    let (component, weapon) = attacker.weapon_at(mount).ok_or(DomainError::UnknownWeapon {
        unit_id: attacker.id,
        location: mount.location,
        slot: mount.slot,
    })?;
    if component.destroyed || !attacker.has_ammo_for(weapon) {
        return Ok(None);
    }

    let breakdown = calculator.evaluate(attacker, target, weapon, map, is_primary_target)?;
    let hit_direction = hit_direction(attacker, target)?;
    let to_hit_number = breakdown.total();
    let attack_roll = roll(dice);
    let is_hit = hits(to_hit_number, attack_roll);

    let rules = calculator.rules();
    let mut cluster_roll = None;
    let mut locations = Vec::new();
    if is_hit {
        let mut groups = Vec::new();
        if weapon.is_cluster() {
            let cluster = roll(dice);
            cluster_roll = Some(cluster);
            let mut missiles_left = rules.cluster_hits(cluster, weapon.missiles());
            let group_size = weapon.cluster_size.max(1);
            while missiles_left > 0 {
                let group = missiles_left.min(group_size);
                groups.push(group * weapon.damage_per_missile());
                missiles_left -= group;
            }
        } else {
            groups.push(weapon.damage);
        }

        for damage in groups {
            let location_roll = roll(dice);
            locations.push(HitLocationData {
                location: rules.hit_location(hit_direction, location_roll),
                damage,
                location_roll,
            });
        }
    }

    Ok(Some(AttackResolution {
        weapon_name: component.name.clone(),
        to_hit_number,
        breakdown,
        attack_roll,
        is_hit,
        hit_direction,
        cluster_roll,
        hits: locations,
    }))
}

pub fn resolve_physical(
    calculator: &ToHitCalculator,
    dice: &mut dyn DiceSource,
    attacker: &Unit,
    target: &Unit,
    attack: PhysicalAttackType,
) -> Result<AttackResolution, DomainError> {
    let breakdown = calculator.evaluate_physical(attacker, target, attack)?;
    let hit_direction = hit_direction(attacker, target)?;
    let to_hit_number = breakdown.total();
    let attack_roll = roll(dice);
    let is_hit = hits(to_hit_number, attack_roll);

    let rules = calculator.rules();
    let mut locations = Vec::new();
    if is_hit {
        let location_roll = u32::from(dice.roll_d6());
        locations.push(HitLocationData {
            location: rules.physical_hit_location(attack, location_roll),
            damage: rules.physical_damage(attack, attacker.mass),
            location_roll,
        });
    }

    Ok(AttackResolution {
        weapon_name: format!("{attack:?}"),
        to_hit_number,
        breakdown,
        attack_roll,
        is_hit,
        hit_direction,
        cluster_roll: None,
        hits: locations,
    })
}
