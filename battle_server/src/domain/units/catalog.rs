// Equipment catalog: resolves template equipment names into components.

use crate::domain::errors::DomainError;
use crate::domain::units::component::{ActuatorKind, Ammo, Component, ComponentKind, Weapon};

struct WeaponSpec {
    name: &'static str,
    damage: u32,
    heat: u32,
    ranges: [u32; 4],
    size: u8,
    ammo: Option<(&'static str, u32)>,
    clusters: (u32, u32),
}

#[rustfmt::skip]
const WEAPONS: &[WeaponSpec] = &[
    WeaponSpec { name: "Small Laser", damage: 3, heat: 1, ranges: [0, 1, 2, 3], size: 1, ammo: None, clusters: (1, 1) },
    WeaponSpec { name: "Medium Laser", damage: 5, heat: 3, ranges: [0, 3, 6, 9], size: 1, ammo: None, clusters: (1, 1) },
    WeaponSpec { name: "Large Laser", damage: 8, heat: 8, ranges: [0, 5, 10, 15], size: 2, ammo: None, clusters: (1, 1) },
    WeaponSpec { name: "PPC", damage: 10, heat: 10, ranges: [3, 6, 12, 18], size: 3, ammo: None, clusters: (1, 1) },
    WeaponSpec { name: "Machine Gun", damage: 2, heat: 0, ranges: [0, 1, 2, 3], size: 1, ammo: Some(("MG", 200)), clusters: (1, 1) },
    WeaponSpec { name: "AC/5", damage: 5, heat: 1, ranges: [3, 6, 12, 18], size: 4, ammo: Some(("AC/5", 20)), clusters: (1, 1) },
    WeaponSpec { name: "AC/10", damage: 10, heat: 3, ranges: [0, 5, 10, 15], size: 7, ammo: Some(("AC/10", 10)), clusters: (1, 1) },
    WeaponSpec { name: "AC/20", damage: 20, heat: 7, ranges: [0, 3, 6, 9], size: 10, ammo: Some(("AC/20", 5)), clusters: (1, 1) },
    WeaponSpec { name: "LRM-5", damage: 5, heat: 2, ranges: [6, 7, 14, 21], size: 1, ammo: Some(("LRM-5", 24)), clusters: (1, 5) },
    WeaponSpec { name: "LRM-10", damage: 10, heat: 4, ranges: [6, 7, 14, 21], size: 2, ammo: Some(("LRM-10", 12)), clusters: (2, 5) },
    WeaponSpec { name: "LRM-20", damage: 20, heat: 6, ranges: [6, 7, 14, 21], size: 5, ammo: Some(("LRM-20", 6)), clusters: (4, 5) },
    WeaponSpec { name: "SRM-2", damage: 4, heat: 2, ranges: [0, 3, 6, 9], size: 1, ammo: Some(("SRM-2", 50)), clusters: (2, 1) },
    WeaponSpec { name: "SRM-4", damage: 8, heat: 3, ranges: [0, 3, 6, 9], size: 1, ammo: Some(("SRM-4", 25)), clusters: (4, 1) },
    WeaponSpec { name: "SRM-6", damage: 12, heat: 4, ranges: [0, 3, 6, 9], size: 2, ammo: Some(("SRM-6", 15)), clusters: (6, 1) },
];

fn weapon_component(spec: &WeaponSpec) -> Component {
    let [minimum_range, short_range, medium_range, long_range] = spec.ranges;
    Component::new(
        spec.name,
        ComponentKind::Weapon(Weapon {
            damage: spec.damage,
            heat: spec.heat,
            minimum_range,
            short_range,
            medium_range,
            long_range,
            ammo_type: spec.ammo.map(|(ammo_type, _)| ammo_type),
            clusters: spec.clusters.0,
            cluster_size: spec.clusters.1,
        }),
        spec.size,
    )
}

fn actuator(name: &str) -> Option<ActuatorKind> {
    let kind = match name {
        "shoulder" => ActuatorKind::Shoulder,
        "upper arm actuator" => ActuatorKind::UpperArm,
        "lower arm actuator" => ActuatorKind::LowerArm,
        "hand actuator" => ActuatorKind::Hand,
        "hip" => ActuatorKind::Hip,
        "upper leg actuator" => ActuatorKind::UpperLeg,
        "lower leg actuator" => ActuatorKind::LowerLeg,
        "foot actuator" => ActuatorKind::Foot,
        _ => return None,
    };
    Some(kind)
}

/// Builds a fresh component for a catalog name (case-insensitive).
pub fn component(name: &str) -> Result<Component, DomainError> {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();

    if let Some(spec) = WEAPONS.iter().find(|w| w.name.eq_ignore_ascii_case(trimmed)) {
        return Ok(weapon_component(spec));
    }

    if let Some(weapon_name) = lowered.strip_suffix(" ammo") {
        if let Some(spec) = WEAPONS.iter().find(|w| w.name.eq_ignore_ascii_case(weapon_name)) {
            if let Some((ammo_type, shots)) = spec.ammo {
                return Ok(Component::new(
                    format!("{} Ammo", spec.name),
                    ComponentKind::Ammo(Ammo { ammo_type, shots }),
                    1,
                ));
            }
        }
    }

    if let Some(kind) = actuator(&lowered) {
        return Ok(Component::new(trimmed, ComponentKind::Actuator(kind), 1));
    }

    let component = match lowered.as_str() {
        "heat sink" => Component::new("Heat Sink", ComponentKind::HeatSink { dissipation: 1 }, 1),
        "double heat sink" => Component::new(
            "Double Heat Sink",
            ComponentKind::HeatSink { dissipation: 2 },
            3,
        ),
        "jump jet" => Component::new("Jump Jet", ComponentKind::JumpJet, 1),
        "engine" => Component::new("Engine", ComponentKind::Engine, 6),
        "gyro" => Component::new("Gyro", ComponentKind::Gyro, 4),
        "cockpit" => Component::new("Cockpit", ComponentKind::Cockpit, 1),
        "life support" => Component::new("Life Support", ComponentKind::LifeSupport, 1),
        "sensors" => Component::new("Sensors", ComponentKind::Sensors, 1),
        _ => return Err(DomainError::UnknownComponent(trimmed.to_string())),
    };
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_weapons_and_their_ammo() {
        let lrm = component("lrm-10").expect("lrm should resolve");
        let weapon = lrm.weapon().expect("lrm is a weapon");
        assert_eq!(weapon.missiles(), 10);
        assert_eq!(weapon.damage_per_missile(), 1);
        assert_eq!(weapon.ammo_type, Some("LRM-10"));

        let ammo = component("LRM-10 Ammo").expect("ammo should resolve");
        assert_eq!(
            ammo.kind,
            ComponentKind::Ammo(Ammo {
                ammo_type: "LRM-10",
                shots: 12
            })
        );
    }

    #[test]
    fn energy_weapons_have_no_ammo_and_no_clusters() {
        let laser = component("Medium Laser").expect("laser should resolve");
        let weapon = laser.weapon().expect("laser is a weapon");
        assert_eq!(weapon.ammo_type, None);
        assert!(!weapon.is_cluster());
        assert!(component("Medium Laser Ammo").is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            component("Gauss Cannon"),
            Err(DomainError::UnknownComponent("Gauss Cannon".to_string()))
        );
    }
}
