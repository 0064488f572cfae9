// Mounted equipment: weapons, ammo and internal systems.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorKind {
    Shoulder,
    UpperArm,
    LowerArm,
    Hand,
    Hip,
    UpperLeg,
    LowerLeg,
    Foot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    pub damage: u32,
    pub heat: u32,
    pub minimum_range: u32,
    pub short_range: u32,
    pub medium_range: u32,
    pub long_range: u32,
    pub ammo_type: Option<&'static str>,
    // Cluster weapons fire `clusters * cluster_size` missiles.
    pub clusters: u32,
    pub cluster_size: u32,
}

impl Weapon {
    pub fn is_cluster(&self) -> bool {
        self.missiles() > 1
    }

    pub fn missiles(&self) -> u32 {
        self.clusters * self.cluster_size
    }

    pub fn damage_per_missile(&self) -> u32 {
        self.damage / self.missiles().max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ammo {
    pub ammo_type: &'static str,
    pub shots: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    Weapon(Weapon),
    Ammo(Ammo),
    Actuator(ActuatorKind),
    Engine,
    HeatSink { dissipation: u32 },
    Gyro,
    Cockpit,
    LifeSupport,
    Sensors,
    JumpJet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub kind: ComponentKind,
    pub first_slot: u8,
    pub size: u8,
    pub destroyed: bool,
    pub active: bool,
}

impl Component {
    pub fn new(name: impl Into<String>, kind: ComponentKind, size: u8) -> Self {
        Self {
            name: name.into(),
            kind,
            first_slot: 0,
            size,
            destroyed: false,
            active: true,
        }
    }

    pub fn is_operational(&self) -> bool {
        !self.destroyed && self.active
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        match &self.kind {
            ComponentKind::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        if let ComponentKind::Ammo(ammo) = &mut self.kind {
            ammo.shots = 0;
        }
    }
}
