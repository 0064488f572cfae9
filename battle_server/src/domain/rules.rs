// Classic rules tables behind a provider trait so variants can override single tables.

use crate::domain::errors::DomainError;
use crate::domain::map::Terrain;
use crate::domain::to_hit::RangeBracket;
use crate::domain::units::{HitDirection, MovementType, PartLocation};

/// Sentinel target number for shots that cannot connect; exceeds any 2d6 roll.
pub const IMPOSSIBLE_ROLL: i32 = 13;
/// Heat at which a unit shuts down, no roll allowed.
pub const SHUTDOWN_HEAT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureValues {
    pub head: u32,
    pub center_torso: u32,
    pub side_torso: u32,
    pub arm: u32,
    pub leg: u32,
}

impl StructureValues {
    pub fn for_location(&self, location: PartLocation) -> u32 {
        match location {
            PartLocation::Head => self.head,
            PartLocation::CenterTorso => self.center_torso,
            PartLocation::LeftTorso | PartLocation::RightTorso => self.side_torso,
            PartLocation::LeftArm | PartLocation::RightArm => self.arm,
            PartLocation::LeftLeg | PartLocation::RightLeg => self.leg,
        }
    }
}

/// What a heat level threatens; only `shutdown` is acted upon automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeatEffects {
    pub shutdown: bool,
    // Target numbers to avoid the effect on 2d6.
    pub shutdown_avoid: Option<u32>,
    pub ammo_explosion_avoid: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PhysicalAttackType {
    Punch,
    Kick,
}

pub trait RulesProvider: Send + Sync {
    fn attacker_movement_modifier(&self, movement: MovementType) -> i32;
    fn target_movement_modifier(&self, hexes_moved: u32, jumped: bool) -> i32;
    fn heat_modifier(&self, heat: u32) -> i32;
    fn range_modifier(&self, bracket: RangeBracket, threshold: u32, distance: u32) -> i32;
    fn secondary_target_modifier(&self, in_forward_arc: bool) -> i32;
    fn terrain_modifier(&self, terrain: Terrain) -> i32;
    fn hit_location(&self, direction: HitDirection, roll: u32) -> PartLocation;
    fn cluster_hits(&self, roll: u32, missiles: u32) -> u32;
    fn structure(&self, mass: u32) -> Result<StructureValues, DomainError>;
    fn movement_heat(&self, movement: MovementType, hexes_moved: u32) -> u32;
    fn heat_effects(&self, heat: u32) -> HeatEffects;
    fn physical_attack_modifier(&self, attack: PhysicalAttackType) -> i32;
    fn physical_damage(&self, attack: PhysicalAttackType, attacker_mass: u32) -> u32;
    fn physical_hit_location(&self, attack: PhysicalAttackType, roll: u32) -> PartLocation;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicRules;

use PartLocation::{
    CenterTorso as CT, Head as HD, LeftArm as LA, LeftLeg as LL, LeftTorso as LT,
    RightArm as RA, RightLeg as RL, RightTorso as RT,
};

// Indexed by 2d6 roll - 2.
const FRONT_HIT_LOCATIONS: [PartLocation; 11] = [CT, RA, RA, RL, RT, CT, LT, LL, LA, LA, HD];
const LEFT_HIT_LOCATIONS: [PartLocation; 11] = [LT, LL, LA, LA, LL, LT, CT, RT, RA, RL, HD];
const RIGHT_HIT_LOCATIONS: [PartLocation; 11] = [RT, RL, RA, RA, RL, RT, CT, LT, LA, LL, HD];

// Indexed by 1d6 roll - 1.
const PUNCH_LOCATIONS: [PartLocation; 6] = [LA, LT, CT, RT, RA, HD];
const KICK_LOCATIONS: [PartLocation; 6] = [RL, RL, RL, LL, LL, LL];

// (missiles, hits for 2d6 rolls 2..=12)
#[rustfmt::skip]
const CLUSTER_HITS: &[(u32, [u32; 11])] = &[
    (2, [1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2]),
    (3, [1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3]),
    (4, [1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4]),
    (5, [1, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5]),
    (6, [2, 2, 3, 3, 4, 4, 4, 5, 5, 6, 6]),
    (10, [3, 3, 4, 6, 6, 6, 6, 8, 8, 10, 10]),
    (15, [5, 5, 6, 9, 9, 9, 9, 12, 12, 15, 15]),
    (20, [6, 6, 9, 12, 12, 12, 12, 16, 16, 20, 20]),
];

// (mass, center torso, side torso, arm, leg); head is always 3.
#[rustfmt::skip]
const STRUCTURE_BY_MASS: &[(u32, u32, u32, u32, u32)] = &[
    (20, 6, 5, 3, 4), (25, 8, 6, 4, 6), (30, 10, 7, 5, 7), (35, 11, 8, 6, 8),
    (40, 12, 10, 6, 10), (45, 14, 11, 7, 11), (50, 16, 12, 8, 12), (55, 18, 13, 9, 13),
    (60, 20, 14, 10, 14), (65, 21, 15, 10, 15), (70, 22, 15, 11, 15), (75, 23, 16, 12, 16),
    (80, 25, 17, 13, 17), (85, 27, 18, 14, 18), (90, 29, 19, 15, 19), (95, 30, 20, 16, 20),
    (100, 31, 21, 17, 21),
];

fn roll_index(roll: u32) -> usize {
    roll.clamp(2, 12) as usize - 2
}

impl RulesProvider for ClassicRules {
    fn attacker_movement_modifier(&self, movement: MovementType) -> i32 {
        match movement {
            MovementType::StandingStill => 0,
            MovementType::Walk => 1,
            MovementType::Run => 2,
            MovementType::Jump => 3,
        }
    }

    fn target_movement_modifier(&self, hexes_moved: u32, jumped: bool) -> i32 {
        let base = match hexes_moved {
            0..=2 => 0,
            3..=4 => 1,
            5..=6 => 2,
            7..=9 => 3,
            10..=17 => 4,
            18..=24 => 5,
            _ => 6,
        };
        base + i32::from(jumped)
    }

    fn heat_modifier(&self, heat: u32) -> i32 {
        match heat {
            0..=7 => 0,
            8..=12 => 1,
            13..=16 => 2,
            17..=23 => 3,
            _ => 4,
        }
    }

    fn range_modifier(&self, bracket: RangeBracket, threshold: u32, distance: u32) -> i32 {
        match bracket {
            // Penalty grows the closer the target is inside minimum range.
            RangeBracket::Minimum => (threshold + 1).saturating_sub(distance) as i32,
            RangeBracket::Short => 0,
            RangeBracket::Medium => 2,
            RangeBracket::Long => 4,
            RangeBracket::OutOfRange => IMPOSSIBLE_ROLL,
        }
    }

    fn secondary_target_modifier(&self, in_forward_arc: bool) -> i32 {
        if in_forward_arc { 1 } else { 2 }
    }

    fn terrain_modifier(&self, terrain: Terrain) -> i32 {
        terrain.to_hit_modifier()
    }

    fn hit_location(&self, direction: HitDirection, roll: u32) -> PartLocation {
        let table = match direction {
            HitDirection::Front | HitDirection::Rear => &FRONT_HIT_LOCATIONS,
            HitDirection::Left => &LEFT_HIT_LOCATIONS,
            HitDirection::Right => &RIGHT_HIT_LOCATIONS,
        };
        table[roll_index(roll)]
    }

    fn cluster_hits(&self, roll: u32, missiles: u32) -> u32 {
        if missiles <= 1 {
            return missiles;
        }
        let index = roll_index(roll);
        if let Some((_, row)) = CLUSTER_HITS.iter().find(|(count, _)| *count == missiles) {
            return row[index];
        }
        // Sizes without a column scale the 10-missile column.
        let ten = CLUSTER_HITS
            .iter()
            .find(|(count, _)| *count == 10)
            .map_or(missiles, |(_, row)| row[index]);
        ((ten * missiles + 5) / 10).clamp(1, missiles)
    }

    fn structure(&self, mass: u32) -> Result<StructureValues, DomainError> {
        STRUCTURE_BY_MASS
            .iter()
            .find(|(tons, ..)| *tons == mass)
            .map(|&(_, center_torso, side_torso, arm, leg)| StructureValues {
                head: 3,
                center_torso,
                side_torso,
                arm,
                leg,
            })
            .ok_or(DomainError::UnsupportedMass(mass))
    }

    fn movement_heat(&self, movement: MovementType, hexes_moved: u32) -> u32 {
        match movement {
            MovementType::StandingStill => 0,
            MovementType::Walk => 1,
            MovementType::Run => 2,
            MovementType::Jump => hexes_moved.max(3),
        }
    }

    fn heat_effects(&self, heat: u32) -> HeatEffects {
        let shutdown_avoid = match heat {
            0..=13 => None,
            14..=17 => Some(4),
            18..=21 => Some(6),
            22..=25 => Some(8),
            26..=29 => Some(10),
            _ => None,
        };
        let ammo_explosion_avoid = match heat {
            0..=18 => None,
            19..=22 => Some(4),
            23..=27 => Some(6),
            _ => Some(8),
        };
        HeatEffects {
            shutdown: heat >= SHUTDOWN_HEAT,
            shutdown_avoid,
            ammo_explosion_avoid,
        }
    }

    fn physical_attack_modifier(&self, attack: PhysicalAttackType) -> i32 {
        match attack {
            PhysicalAttackType::Punch => 0,
            PhysicalAttackType::Kick => -2,
        }
    }

    fn physical_damage(&self, attack: PhysicalAttackType, attacker_mass: u32) -> u32 {
        match attack {
            PhysicalAttackType::Punch => attacker_mass.div_ceil(10),
            PhysicalAttackType::Kick => attacker_mass.div_ceil(5),
        }
    }

    fn physical_hit_location(&self, attack: PhysicalAttackType, roll: u32) -> PartLocation {
        let index = roll.clamp(1, 6) as usize - 1;
        match attack {
            PhysicalAttackType::Punch => PUNCH_LOCATIONS[index],
            PhysicalAttackType::Kick => KICK_LOCATIONS[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_movement_is_monotonic_in_hexes_moved() {
        let rules = ClassicRules;
        let mut previous = 0;
        for hexes in 0..30 {
            let modifier = rules.target_movement_modifier(hexes, false);
            assert!(modifier >= previous);
            previous = modifier;
        }
        assert_eq!(rules.target_movement_modifier(3, false), 1);
        assert_eq!(rules.target_movement_modifier(3, true), 2);
    }

    #[test]
    fn heat_modifier_is_monotonic() {
        let rules = ClassicRules;
        let mut previous = 0;
        for heat in 0..40 {
            let modifier = rules.heat_modifier(heat);
            assert!(modifier >= previous);
            previous = modifier;
        }
    }

    #[test]
    fn minimum_range_penalty_shrinks_with_distance() {
        let rules = ClassicRules;
        assert_eq!(rules.range_modifier(RangeBracket::Minimum, 6, 6), 1);
        assert_eq!(rules.range_modifier(RangeBracket::Minimum, 6, 3), 4);
        assert_eq!(rules.range_modifier(RangeBracket::Medium, 14, 10), 2);
    }

    #[test]
    fn cluster_table_lookups() {
        let rules = ClassicRules;
        assert_eq!(rules.cluster_hits(7, 10), 6);
        assert_eq!(rules.cluster_hits(12, 4), 4);
        assert_eq!(rules.cluster_hits(2, 20), 6);
        assert_eq!(rules.cluster_hits(7, 1), 1);
    }

    #[test]
    fn hit_location_extremes() {
        let rules = ClassicRules;
        assert_eq!(rules.hit_location(HitDirection::Front, 12), HD);
        assert_eq!(rules.hit_location(HitDirection::Front, 7), CT);
        assert_eq!(rules.hit_location(HitDirection::Left, 7), LT);
        assert_eq!(rules.hit_location(HitDirection::Right, 7), RT);
    }

    #[test]
    fn structure_requires_supported_mass() {
        let rules = ClassicRules;
        let values = rules.structure(50).expect("50 tons is supported");
        assert_eq!(values.for_location(CT), 16);
        assert_eq!(values.for_location(HD), 3);
        assert_eq!(rules.structure(52), Err(DomainError::UnsupportedMass(52)));
    }

    #[test]
    fn heat_effects_thresholds() {
        let rules = ClassicRules;
        assert!(!rules.heat_effects(29).shutdown);
        assert!(rules.heat_effects(30).shutdown);
        assert_eq!(rules.heat_effects(25).shutdown_avoid, Some(8));
        assert_eq!(rules.heat_effects(25).ammo_explosion_avoid, Some(6));
        assert_eq!(rules.heat_effects(5), HeatEffects::default());
    }
}
