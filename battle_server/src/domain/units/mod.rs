// Unit model: parts, components and the catalog that builds them.

pub mod catalog;
pub mod component;
pub mod data;
pub mod part;
pub mod unit;

pub use component::{ActuatorKind, Ammo, Component, ComponentKind, Weapon};
pub use data::{ArmorData, UnitData};
pub use part::{PartDamage, PartLocation, UnitPart};
pub use unit::{
    DamageReport, Engine, EngineType, HitDirection, LocationDamage, MovementType,
    PhysicalAttackDeclaration, Pilot, Unit, UnitStatus, WeaponMount, WeaponTarget,
};
