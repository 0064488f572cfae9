// GATOR to-hit calculation: gunnery, attacker movement, target movement, other, range.

pub mod format;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::hex::{HexCoordinates, in_forward_arc};
use crate::domain::map::{BattleMap, Terrain};
use crate::domain::rules::{IMPOSSIBLE_ROLL, PhysicalAttackType, RulesProvider};
use crate::domain::units::{MovementType, Unit, Weapon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RangeBracket {
    Minimum,
    Short,
    Medium,
    Long,
    OutOfRange,
}

impl RangeBracket {
    /// Bracket for a distance and the threshold it is measured against.
    pub fn classify(weapon: &Weapon, distance: u32) -> (RangeBracket, u32) {
        if weapon.minimum_range > 0 && distance <= weapon.minimum_range {
            (RangeBracket::Minimum, weapon.minimum_range)
        } else if distance <= weapon.short_range {
            (RangeBracket::Short, weapon.short_range)
        } else if distance <= weapon.medium_range {
            (RangeBracket::Medium, weapon.medium_range)
        } else if distance <= weapon.long_range {
            (RangeBracket::Long, weapon.long_range)
        } else {
            (RangeBracket::OutOfRange, weapon.long_range + 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModifierKind {
    Gunnery { skill: u32 },
    Piloting { skill: u32 },
    AttackerMovement { movement: MovementType },
    TargetMovement { hexes_moved: u32, jumped: bool },
    Range { bracket: RangeBracket, distance: u32 },
    PhysicalAttack { attack: PhysicalAttackType },
    Heat { heat: u32 },
    SecondaryTarget { in_forward_arc: bool },
    Terrain { coordinates: HexCoordinates, terrain: Terrain },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollModifier {
    pub kind: ModifierKind,
    pub value: i32,
}

impl RollModifier {
    pub fn new(kind: ModifierKind, value: i32) -> Self {
        Self { kind, value }
    }
}

/// Every modifier that went into one to-hit number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToHitBreakdown {
    pub gunnery: RollModifier,
    pub attacker_movement: RollModifier,
    pub target_movement: RollModifier,
    pub range: RollModifier,
    pub other: Vec<RollModifier>,
    pub terrain: Vec<RollModifier>,
    pub has_line_of_sight: bool,
    pub range_bracket: RangeBracket,
    pub distance: u32,
}

impl ToHitBreakdown {
    pub fn modifiers(&self) -> impl Iterator<Item = &RollModifier> {
        [
            &self.gunnery,
            &self.attacker_movement,
            &self.target_movement,
            &self.range,
        ]
        .into_iter()
        .chain(self.other.iter())
        .chain(self.terrain.iter())
    }

    pub fn is_possible(&self) -> bool {
        self.has_line_of_sight && self.range_bracket != RangeBracket::OutOfRange
    }

    /// Target number on 2d6; the impossible-roll sentinel when the shot cannot connect.
    pub fn total(&self) -> i32 {
        if !self.is_possible() {
            return IMPOSSIBLE_ROLL;
        }
        self.modifiers().map(|m| m.value).sum()
    }
}

#[derive(Clone)]
pub struct ToHitCalculator {
    rules: Arc<dyn RulesProvider>,
}

impl ToHitCalculator {
    pub fn new(rules: Arc<dyn RulesProvider>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &dyn RulesProvider {
        self.rules.as_ref()
    }

    pub fn evaluate(
        &self,
        attacker: &Unit,
        target: &Unit,
        weapon: &Weapon,
        map: &BattleMap,
        is_primary_target: bool,
    ) -> Result<ToHitBreakdown, DomainError> {
        let (from, to) = positions(attacker, target)?;
        let movement = attacker
            .movement_type_used
            .ok_or(DomainError::MovementTypeNotSet(attacker.id))?;

        let distance = from.distance_to(to);
        let (range_bracket, threshold) = RangeBracket::classify(weapon, distance);

        let mut other = Vec::new();
        let heat = self.rules.heat_modifier(attacker.heat);
        if heat != 0 {
            other.push(RollModifier::new(
                ModifierKind::Heat { heat: attacker.heat },
                heat,
            ));
        }
        if !is_primary_target {
            let facing = attacker
                .torso_facing()
                .ok_or(DomainError::UnitNotDeployed(attacker.id))?;
            let forward = in_forward_arc(from, facing, to);
            other.push(RollModifier::new(
                ModifierKind::SecondaryTarget {
                    in_forward_arc: forward,
                },
                self.rules.secondary_target_modifier(forward),
            ));
        }

        // Only hexes strictly between the two units count.
        let path = map.line_of_sight_path(from, to);
        let between = if path.len() > 2 { &path[1..path.len() - 1] } else { &[][..] };
        let terrain = between
            .iter()
            .flat_map(|hex| {
                hex.terrains.iter().map(|&terrain| {
                    RollModifier::new(
                        ModifierKind::Terrain {
                            coordinates: hex.coordinates,
                            terrain,
                        },
                        self.rules.terrain_modifier(terrain),
                    )
                })
            })
            .filter(|modifier| modifier.value != 0)
            .collect();

        Ok(ToHitBreakdown {
            gunnery: RollModifier::new(
                ModifierKind::Gunnery {
                    skill: attacker.pilot.gunnery,
                },
                attacker.pilot.gunnery as i32,
            ),
            attacker_movement: self.attacker_movement(movement),
            target_movement: self.target_movement(target),
            range: RollModifier::new(
                ModifierKind::Range {
                    bracket: range_bracket,
                    distance,
                },
                self.rules.range_modifier(range_bracket, threshold, distance),
            ),
            other,
            terrain,
            has_line_of_sight: map.has_line_of_sight(from, to),
            range_bracket,
            distance,
        })
    }

    /// Punches and kicks roll against piloting and only reach adjacent hexes.
    pub fn evaluate_physical(
        &self,
        attacker: &Unit,
        target: &Unit,
        attack: PhysicalAttackType,
    ) -> Result<ToHitBreakdown, DomainError> {
        let (from, to) = positions(attacker, target)?;
        let movement = attacker
            .movement_type_used
            .ok_or(DomainError::MovementTypeNotSet(attacker.id))?;

        let distance = from.distance_to(to);
        let range_bracket = if distance == 1 {
            RangeBracket::Short
        } else {
            RangeBracket::OutOfRange
        };

        Ok(ToHitBreakdown {
            gunnery: RollModifier::new(
                ModifierKind::Piloting {
                    skill: attacker.pilot.piloting,
                },
                attacker.pilot.piloting as i32,
            ),
            attacker_movement: self.attacker_movement(movement),
            target_movement: self.target_movement(target),
            range: RollModifier::new(
                ModifierKind::PhysicalAttack { attack },
                self.rules.physical_attack_modifier(attack),
            ),
            other: Vec::new(),
            terrain: Vec::new(),
            has_line_of_sight: true,
            range_bracket,
            distance,
        })
    }

    fn attacker_movement(&self, movement: MovementType) -> RollModifier {
        RollModifier::new(
            ModifierKind::AttackerMovement { movement },
            self.rules.attacker_movement_modifier(movement),
        )
    }

    fn target_movement(&self, target: &Unit) -> RollModifier {
        let jumped = target.movement_type_used == Some(MovementType::Jump);
        RollModifier::new(
            ModifierKind::TargetMovement {
                hexes_moved: target.distance_covered,
                jumped,
            },
            self.rules
                .target_movement_modifier(target.distance_covered, jumped),
        )
    }
}

fn positions(attacker: &Unit, target: &Unit) -> Result<(HexCoordinates, HexCoordinates), DomainError> {
    let from = attacker
        .position
        .ok_or(DomainError::UnitNotDeployed(attacker.id))?;
    let to = target
        .position
        .ok_or(DomainError::UnitNotDeployed(target.id))?;
    Ok((from.coordinates, to.coordinates))
}
