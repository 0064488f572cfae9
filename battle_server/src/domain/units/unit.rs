// Mech units: movement, damage propagation and heat state.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::heat::{DissipationData, HeatData, WeaponHeatSource};
use crate::domain::hex::{HexDirection, HexPosition};
use crate::domain::rules::{PhysicalAttackType, SHUTDOWN_HEAT};
use crate::domain::units::component::{Component, ComponentKind, Weapon};
use crate::domain::units::part::{PartLocation, UnitPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    StandingStill,
    Walk,
    Run,
    Jump,
}

/// Side of the target an attack comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitDirection {
    Front,
    Left,
    Right,
    Rear,
}

impl HitDirection {
    /// Classifies a bearing relative to the target's facing.
    pub fn from_relative_bearing(bearing: f64) -> Self {
        let bearing = bearing.rem_euclid(360.0);
        if bearing <= 60.0 || bearing >= 300.0 {
            HitDirection::Front
        } else if bearing < 150.0 {
            HitDirection::Right
        } else if bearing <= 210.0 {
            HitDirection::Rear
        } else {
            HitDirection::Left
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Active,
    Shutdown,
    Prone,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    Fusion,
    XlFusion,
    LightFusion,
    CompactFusion,
    Ice,
}

impl FromStr for EngineType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fusion" => Ok(EngineType::Fusion),
            "xl" | "xlfusion" | "xl fusion" => Ok(EngineType::XlFusion),
            "light" | "lightfusion" | "light fusion" => Ok(EngineType::LightFusion),
            "compact" | "compactfusion" | "compact fusion" => Ok(EngineType::CompactFusion),
            "ice" => Ok(EngineType::Ice),
            _ => Err(DomainError::UnknownEngineType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub rating: u32,
    pub kind: EngineType,
}

impl Engine {
    /// Heat sinks built into the engine that need no critical slots.
    pub fn integral_heat_sinks(&self) -> u32 {
        match self.kind {
            EngineType::Ice => 0,
            _ => (self.rating / 25).min(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    pub gunnery: u32,
    pub piloting: u32,
}

impl Default for Pilot {
    fn default() -> Self {
        Self {
            gunnery: 4,
            piloting: 5,
        }
    }
}

/// Where a weapon is mounted: its part and first slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponMount {
    pub location: PartLocation,
    pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponTarget {
    pub weapon: WeaponMount,
    pub target_id: Uuid,
    pub is_primary_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalAttackDeclaration {
    pub target_id: Uuid,
    pub attack_type: PhysicalAttackType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDamage {
    pub location: PartLocation,
    pub armor: u32,
    pub structure: u32,
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DamageReport {
    pub locations: Vec<LocationDamage>,
    // Damage with nowhere left to go (beyond head or center torso).
    pub lost: u32,
}

impl DamageReport {
    pub fn absorbed(&self) -> u32 {
        self.locations.iter().map(|l| l.armor + l.structure).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub chassis: String,
    pub model: String,
    pub mass: u32,
    pub walk_mp: u32,
    pub engine: Engine,
    pub pilot: Pilot,
    pub heat: u32,
    pub position: Option<HexPosition>,
    pub movement_type_used: Option<MovementType>,
    pub distance_covered: u32,
    pub parts: Vec<UnitPart>,

    // Explicit rule states; everything else about status is derived from parts.
    shutdown: bool,
    prone: bool,
    destroyed: bool,

    // Turn-scoped declarations.
    pub weapon_targets: Vec<WeaponTarget>,
    pub weapons_declared: bool,
    pub physical_attack: Option<PhysicalAttackDeclaration>,
    pub physical_declared: bool,
    pub weapon_heat: Vec<WeaponHeatSource>,
}

impl Unit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        chassis: impl Into<String>,
        model: impl Into<String>,
        mass: u32,
        walk_mp: u32,
        engine: Engine,
        pilot: Pilot,
        parts: Vec<UnitPart>,
    ) -> Self {
        Self {
            id,
            owner_id: None,
            chassis: chassis.into(),
            model: model.into(),
            mass,
            walk_mp,
            engine,
            pilot,
            heat: 0,
            position: None,
            movement_type_used: None,
            distance_covered: 0,
            parts,
            shutdown: false,
            prone: false,
            destroyed: false,
            weapon_targets: Vec::new(),
            weapons_declared: false,
            physical_attack: None,
            physical_declared: false,
            weapon_heat: Vec::new(),
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.chassis, self.model)
    }

    pub fn status(&self) -> UnitStatus {
        if self.destroyed {
            UnitStatus::Destroyed
        } else if self.shutdown {
            UnitStatus::Shutdown
        } else if self.prone {
            UnitStatus::Prone
        } else {
            UnitStatus::Active
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Not destroyed and not shut down: the unit can still take actions.
    pub fn is_operational(&self) -> bool {
        !self.destroyed && !self.shutdown
    }

    pub fn is_deployed(&self) -> bool {
        self.position.is_some()
    }

    pub fn has_moved(&self) -> bool {
        self.movement_type_used.is_some()
    }

    pub fn run_mp(&self) -> u32 {
        (self.walk_mp * 3).div_ceil(2)
    }

    pub fn jump_mp(&self) -> u32 {
        self.components()
            .filter(|c| c.is_operational() && matches!(c.kind, ComponentKind::JumpJet))
            .count() as u32
    }

    pub fn movement_points(&self, movement: MovementType) -> u32 {
        match movement {
            MovementType::StandingStill => 0,
            MovementType::Walk => self.walk_mp,
            MovementType::Run => self.run_mp(),
            MovementType::Jump => self.jump_mp(),
        }
    }

    pub fn part(&self, location: PartLocation) -> Option<&UnitPart> {
        self.parts.iter().find(|p| p.location == location)
    }

    pub fn part_mut(&mut self, location: PartLocation) -> Option<&mut UnitPart> {
        self.parts.iter_mut().find(|p| p.location == location)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.parts.iter().flat_map(|p| p.components.iter())
    }

    pub fn weapons(&self) -> impl Iterator<Item = (WeaponMount, &Component, &Weapon)> {
        self.parts.iter().flat_map(|part| {
            part.components.iter().filter_map(move |component| {
                component.weapon().map(|weapon| {
                    let mount = WeaponMount {
                        location: part.location,
                        slot: component.first_slot,
                    };
                    (mount, component, weapon)
                })
            })
        })
    }

    pub fn weapon_at(&self, mount: WeaponMount) -> Option<(&Component, &Weapon)> {
        let component = self.part(mount.location)?.component_at(mount.slot)?;
        component.weapon().map(|weapon| (component, weapon))
    }

    /// Facing used for firing arcs: torso facing when twisted, body facing otherwise.
    pub fn torso_facing(&self) -> Option<HexDirection> {
        self.part(PartLocation::CenterTorso)
            .and_then(|p| p.facing)
            .or(self.position.map(|p| p.facing))
    }

    pub fn deploy(&mut self, position: HexPosition) {
        self.position = Some(position);
        self.set_torso_facing(position.facing);
    }

    pub fn move_to(&mut self, position: HexPosition, movement: MovementType, hexes_moved: u32) {
        self.position = Some(position);
        self.movement_type_used = Some(movement);
        self.distance_covered = hexes_moved;
        self.set_torso_facing(position.facing);
    }

    /// Twists the torso; at most one hex side away from the body facing.
    pub fn rotate_torso(&mut self, direction: HexDirection) -> bool {
        let Some(body) = self.position.map(|p| p.facing) else {
            return false;
        };
        if body.sides_between(direction) > 1 {
            return false;
        }
        self.set_torso_facing(direction);
        true
    }

    fn set_torso_facing(&mut self, direction: HexDirection) {
        for part in self.parts.iter_mut().filter(|p| p.location.is_torso()) {
            part.facing = Some(direction);
        }
    }

    pub fn declare_weapon_attack(&mut self, targets: Vec<WeaponTarget>) {
        self.weapon_targets = targets;
        self.weapons_declared = true;
    }

    pub fn declare_physical_attack(&mut self, declaration: Option<PhysicalAttackDeclaration>) {
        self.physical_attack = declaration;
        self.physical_declared = true;
    }

    pub fn has_ammo_for(&self, weapon: &Weapon) -> bool {
        let Some(ammo_type) = weapon.ammo_type else {
            return true;
        };
        self.components().any(|component| match &component.kind {
            ComponentKind::Ammo(ammo) => {
                !component.destroyed && ammo.ammo_type == ammo_type && ammo.shots > 0
            }
            _ => false,
        })
    }

    /// Spends one shot of ammo (first bin in location order) and records the weapon's heat.
    pub fn fire_weapon(&mut self, mount: WeaponMount) -> Result<(), DomainError> {
        let (name, weapon) = match self.weapon_at(mount) {
            Some((component, weapon)) => (component.name.clone(), weapon.clone()),
            None => {
                return Err(DomainError::UnknownWeapon {
                    unit_id: self.id,
                    location: mount.location,
                    slot: mount.slot,
                });
            }
        };

        if let Some(ammo_type) = weapon.ammo_type {
            let bin = self
                .parts
                .iter_mut()
                .flat_map(|p| p.components.iter_mut())
                .filter(|component| !component.destroyed)
                .find_map(|component| match &mut component.kind {
                    ComponentKind::Ammo(ammo) if ammo.ammo_type == ammo_type && ammo.shots > 0 => {
                        Some(ammo)
                    }
                    _ => None,
                });
            if let Some(ammo) = bin {
                ammo.shots -= 1;
            }
        }

        self.weapon_heat.push(WeaponHeatSource {
            weapon_name: name,
            heat: weapon.heat,
        });
        Ok(())
    }

    /// Applies damage to `location`, spilling into transfer locations as parts are exhausted.
    pub fn apply_damage(
        &mut self,
        location: PartLocation,
        amount: u32,
        direction: HitDirection,
    ) -> DamageReport {
        let rear = direction == HitDirection::Rear;
        let mut report = DamageReport::default();
        let mut remaining = amount;
        let mut current = Some(location);

        while let Some(location) = current {
            if remaining == 0 {
                break;
            }
            let Some(part) = self.part_mut(location) else {
                break;
            };
            let damage = part.absorb(remaining, rear);
            if damage.armor + damage.structure > 0 {
                report.locations.push(LocationDamage {
                    location,
                    armor: damage.armor,
                    structure: damage.structure,
                    destroyed: part.is_destroyed(),
                });
            }
            remaining = damage.excess;
            current = location.transfer_location();
        }

        report.lost = remaining;
        self.refresh_destruction();
        report
    }

    fn refresh_destruction(&mut self) {
        let lost = |location| self.part(location).is_some_and(UnitPart::is_destroyed);
        let vital = lost(PartLocation::Head) || lost(PartLocation::CenterTorso);
        let fallen = lost(PartLocation::LeftLeg) || lost(PartLocation::RightLeg);
        if vital {
            self.destroyed = true;
        }
        if fallen {
            self.prone = true;
        }
    }

    pub fn dissipation(&self) -> DissipationData {
        let (heat_sinks, sink_points) = self
            .components()
            .filter(|c| !c.destroyed)
            .filter_map(|c| match c.kind {
                ComponentKind::HeatSink { dissipation } => Some(dissipation),
                _ => None,
            })
            .fold((0, 0), |(count, points), d| (count + 1, points + d));
        let engine_heat_sinks = self.engine.integral_heat_sinks();
        DissipationData {
            heat_sinks,
            engine_heat_sinks,
            dissipation_points: sink_points + engine_heat_sinks,
        }
    }

    /// Applies the turn's heat; shuts the unit down at the shutdown threshold and restarts it below.
    pub fn apply_heat(&mut self, heat_data: &HeatData) -> u32 {
        self.heat = heat_data.resolve(self.heat);
        self.shutdown = self.heat >= SHUTDOWN_HEAT;
        self.heat
    }

    /// Clears per-turn state at the start of a new turn.
    pub fn reset_turn_state(&mut self) {
        self.movement_type_used = None;
        self.distance_covered = 0;
        self.weapon_targets.clear();
        self.weapons_declared = false;
        self.physical_attack = None;
        self.physical_declared = false;
        self.weapon_heat.clear();
        if let Some(position) = self.position {
            self.set_torso_facing(position.facing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::heat::MovementHeatSource;
    use crate::domain::hex::HexCoordinates;
    use crate::domain::units::catalog;
    use proptest::prelude::*;

    fn test_unit() -> Unit {
        let parts = PartLocation::ALL
            .into_iter()
            .map(|location| match location {
                PartLocation::CenterTorso => UnitPart::new(location, 10, 5, 6),
                PartLocation::LeftArm | PartLocation::RightArm => UnitPart::new(location, 4, 0, 3),
                PartLocation::Head => UnitPart::new(location, 9, 0, 3),
                _ => UnitPart::new(location, 8, 4, 5),
            })
            .collect();
        Unit::new(
            Uuid::new_v4(),
            "Test",
            "TST-1",
            50,
            5,
            Engine {
                rating: 250,
                kind: EngineType::Fusion,
            },
            Pilot::default(),
            parts,
        )
    }

    #[test]
    fn arm_overflow_transfers_to_side_torso() {
        let mut unit = test_unit();
        let report = unit.apply_damage(PartLocation::LeftArm, 10, HitDirection::Front);

        let arm = unit.part(PartLocation::LeftArm).expect("arm exists");
        assert_eq!((arm.armor, arm.structure), (0, 0));
        let torso = unit.part(PartLocation::LeftTorso).expect("torso exists");
        assert_eq!(torso.armor, 5);
        assert_eq!(report.locations.len(), 2);
        assert_eq!(report.locations[1].location, PartLocation::LeftTorso);
        assert_eq!(report.locations[1].armor, 3);
        assert_eq!(report.lost, 0);
        assert_eq!(unit.status(), UnitStatus::Active);
    }

    #[test]
    fn center_torso_destruction_destroys_unit_and_loses_excess() {
        let mut unit = test_unit();
        let report = unit.apply_damage(PartLocation::CenterTorso, 20, HitDirection::Front);
        assert_eq!(report.lost, 4);
        assert!(unit.is_destroyed());
        assert_eq!(unit.status(), UnitStatus::Destroyed);

        // Destroyed is terminal even if other parts are intact.
        let heat = HeatData::default();
        unit.apply_heat(&heat);
        assert_eq!(unit.status(), UnitStatus::Destroyed);
    }

    #[test]
    fn head_destruction_destroys_unit() {
        let mut unit = test_unit();
        unit.apply_damage(PartLocation::Head, 12, HitDirection::Front);
        assert!(unit.is_destroyed());
    }

    #[test]
    fn rear_hits_strip_rear_armor() {
        let mut unit = test_unit();
        unit.apply_damage(PartLocation::CenterTorso, 3, HitDirection::Rear);
        let torso = unit.part(PartLocation::CenterTorso).expect("torso exists");
        assert_eq!(torso.armor, 10);
        assert_eq!(torso.rear_armor, Some(2));
    }

    #[test]
    fn destroyed_leg_knocks_unit_prone() {
        let mut unit = test_unit();
        unit.apply_damage(PartLocation::RightLeg, 13, HitDirection::Front);
        assert_eq!(unit.status(), UnitStatus::Prone);
    }

    #[test]
    fn destroyed_part_zeroes_its_ammo() {
        let mut unit = test_unit();
        let ammo = catalog::component("SRM-4 Ammo").expect("ammo resolves");
        unit.part_mut(PartLocation::LeftArm)
            .expect("arm exists")
            .mount(ammo)
            .expect("arm has room");

        unit.apply_damage(PartLocation::LeftArm, 7, HitDirection::Front);
        let bin = &unit.part(PartLocation::LeftArm).expect("arm exists").components[0];
        assert!(bin.destroyed);
        assert!(matches!(&bin.kind, ComponentKind::Ammo(a) if a.shots == 0));
    }

    #[test]
    fn firing_consumes_ammo_and_records_heat() {
        let mut unit = test_unit();
        let torso = unit.part_mut(PartLocation::RightTorso).expect("torso exists");
        torso.mount(catalog::component("SRM-4").expect("srm")).expect("room");
        torso.mount(catalog::component("SRM-4 Ammo").expect("ammo")).expect("room");

        let mount = WeaponMount {
            location: PartLocation::RightTorso,
            slot: 0,
        };
        unit.fire_weapon(mount).expect("weapon exists");
        let bin = &unit.part(PartLocation::RightTorso).expect("torso").components[1];
        assert!(matches!(&bin.kind, ComponentKind::Ammo(a) if a.shots == 24));
        assert_eq!(unit.weapon_heat.len(), 1);
        assert_eq!(unit.weapon_heat[0].heat, 3);

        let missing = WeaponMount {
            location: PartLocation::Head,
            slot: 3,
        };
        assert!(unit.fire_weapon(missing).is_err());
    }

    #[test]
    fn shutdown_at_thirty_and_restart_below() {
        let mut unit = test_unit();
        let hot = HeatData {
            movement_heat_sources: vec![MovementHeatSource {
                movement_type: MovementType::Jump,
                hexes_moved: 30,
                heat: 30,
            }],
            ..HeatData::default()
        };
        assert_eq!(unit.apply_heat(&hot), 30);
        assert_eq!(unit.status(), UnitStatus::Shutdown);

        let cooling = HeatData {
            dissipation: unit.dissipation(),
            ..HeatData::default()
        };
        unit.apply_heat(&cooling);
        assert_eq!(unit.heat, 20);
        assert_eq!(unit.status(), UnitStatus::Active);
    }

    #[test]
    fn torso_twist_is_limited_to_one_hex_side() {
        let mut unit = test_unit();
        assert!(!unit.rotate_torso(HexDirection::TopRight));
        unit.deploy(HexPosition::new(HexCoordinates::new(3, 3), HexDirection::Top));
        assert!(unit.rotate_torso(HexDirection::TopRight));
        assert_eq!(unit.torso_facing(), Some(HexDirection::TopRight));
        assert!(!unit.rotate_torso(HexDirection::Bottom));

        unit.reset_turn_state();
        assert_eq!(unit.torso_facing(), Some(HexDirection::Top));
    }

    #[test]
    fn attack_direction_from_bearing() {
        assert_eq!(HitDirection::from_relative_bearing(0.0), HitDirection::Front);
        assert_eq!(HitDirection::from_relative_bearing(90.0), HitDirection::Right);
        assert_eq!(HitDirection::from_relative_bearing(180.0), HitDirection::Rear);
        assert_eq!(HitDirection::from_relative_bearing(270.0), HitDirection::Left);
    }

    proptest! {
        #[test]
        fn damage_is_conserved_and_never_negative(
            armor in 0u32..40,
            structure in 0u32..20,
            damage in 0u32..80,
        ) {
            let mut part = UnitPart::new(PartLocation::LeftArm, armor, 0, structure);
            let result = part.absorb(damage, false);
            prop_assert_eq!(result.armor + result.structure + result.excess, damage);
            prop_assert!(part.armor <= armor && part.structure <= structure);
        }

        #[test]
        fn unit_damage_is_absorbed_or_lost(
            location in 0usize..8,
            damage in 0u32..120,
        ) {
            let mut unit = test_unit();
            let report = unit.apply_damage(PartLocation::ALL[location], damage, HitDirection::Front);
            prop_assert_eq!(report.absorbed() + report.lost, damage);
        }
    }
}
