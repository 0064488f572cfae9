// Hit locations and the armor/structure they carry.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::hex::HexDirection;
use crate::domain::units::component::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartLocation {
    Head,
    CenterTorso,
    LeftTorso,
    RightTorso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl PartLocation {
    pub const ALL: [PartLocation; 8] = [
        PartLocation::Head,
        PartLocation::CenterTorso,
        PartLocation::LeftTorso,
        PartLocation::RightTorso,
        PartLocation::LeftArm,
        PartLocation::RightArm,
        PartLocation::LeftLeg,
        PartLocation::RightLeg,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PartLocation::Head => "HD",
            PartLocation::CenterTorso => "CT",
            PartLocation::LeftTorso => "LT",
            PartLocation::RightTorso => "RT",
            PartLocation::LeftArm => "LA",
            PartLocation::RightArm => "RA",
            PartLocation::LeftLeg => "LL",
            PartLocation::RightLeg => "RL",
        }
    }

    /// Connected location that absorbs damage beyond this one's structure.
    pub fn transfer_location(self) -> Option<PartLocation> {
        match self {
            PartLocation::LeftArm | PartLocation::LeftLeg => Some(PartLocation::LeftTorso),
            PartLocation::RightArm | PartLocation::RightLeg => Some(PartLocation::RightTorso),
            PartLocation::LeftTorso | PartLocation::RightTorso => Some(PartLocation::CenterTorso),
            PartLocation::Head | PartLocation::CenterTorso => None,
        }
    }

    pub fn is_torso(self) -> bool {
        matches!(
            self,
            PartLocation::CenterTorso | PartLocation::LeftTorso | PartLocation::RightTorso
        )
    }

    pub fn is_leg(self) -> bool {
        matches!(self, PartLocation::LeftLeg | PartLocation::RightLeg)
    }

    pub fn slot_capacity(self) -> u8 {
        match self {
            PartLocation::Head | PartLocation::LeftLeg | PartLocation::RightLeg => 6,
            _ => 12,
        }
    }
}

impl FromStr for PartLocation {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        PartLocation::ALL
            .into_iter()
            .find(|location| location.code() == normalized)
            .ok_or_else(|| DomainError::UnknownLocation(value.to_string()))
    }
}

/// Damage taken by one part during a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartDamage {
    pub armor: u32,
    pub structure: u32,
    pub excess: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPart {
    pub location: PartLocation,
    pub armor: u32,
    pub max_armor: u32,
    pub structure: u32,
    pub max_structure: u32,
    // Torso parts only.
    pub rear_armor: Option<u32>,
    pub max_rear_armor: Option<u32>,
    pub facing: Option<HexDirection>,
    pub components: Vec<Component>,
}

impl UnitPart {
    pub fn new(location: PartLocation, armor: u32, rear_armor: u32, structure: u32) -> Self {
        let rear = location.is_torso().then_some(rear_armor);
        Self {
            location,
            armor,
            max_armor: armor,
            structure,
            max_structure: structure,
            rear_armor: rear,
            max_rear_armor: rear,
            facing: None,
            components: Vec::new(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.structure == 0
    }

    pub fn used_slots(&self) -> u8 {
        self.components.iter().map(|c| c.size).sum()
    }

    /// Mounts a component in the next free slots.
    pub fn mount(&mut self, mut component: Component) -> Result<(), DomainError> {
        let used = self.used_slots();
        let free = self.location.slot_capacity().saturating_sub(used);
        if component.size > free {
            return Err(DomainError::SlotCapacityExceeded {
                location: self.location,
                component: component.name,
                needed: component.size,
                free,
            });
        }
        component.first_slot = used;
        self.components.push(component);
        Ok(())
    }

    pub fn component_at(&self, slot: u8) -> Option<&Component> {
        self.components.iter().find(|c| c.first_slot == slot)
    }

    pub fn component_at_mut(&mut self, slot: u8) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.first_slot == slot)
    }

    /// Absorbs `amount` into armor then structure; whatever is left is returned as excess.
    pub fn absorb(&mut self, amount: u32, rear: bool) -> PartDamage {
        if self.is_destroyed() {
            return PartDamage {
                excess: amount,
                ..PartDamage::default()
            };
        }

        let armor = match (rear, self.rear_armor.as_mut()) {
            (true, Some(rear_armor)) => rear_armor,
            _ => &mut self.armor,
        };
        let armor_damage = amount.min(*armor);
        *armor -= armor_damage;

        let remaining = amount - armor_damage;
        let structure_damage = remaining.min(self.structure);
        self.structure -= structure_damage;

        if self.is_destroyed() {
            for component in &mut self.components {
                component.destroy();
            }
        }

        PartDamage {
            armor: armor_damage,
            structure: structure_damage,
            excess: remaining - structure_damage,
        }
    }
}
