// Domain-level errors for unit construction and rule evaluation.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::units::PartLocation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // Corrupt or unsupported template data.
    #[error("unknown hit location: {0}")]
    UnknownLocation(String),
    #[error("unknown terrain: {0}")]
    UnknownTerrain(String),
    #[error("unknown engine type: {0}")]
    UnknownEngineType(String),
    #[error("unknown component: {0}")]
    UnknownComponent(String),
    #[error("unsupported unit mass: {0} tons")]
    UnsupportedMass(u32),
    #[error("invalid hex direction: {0}")]
    InvalidDirection(u8),
    #[error("{location:?} cannot mount {component}: {needed} slots needed, {free} free")]
    SlotCapacityExceeded {
        location: PartLocation,
        component: String,
        needed: u8,
        free: u8,
    },

    // Caller sequencing bugs; these are never valid game events.
    #[error("unit {0} has no movement type recorded for this turn")]
    MovementTypeNotSet(Uuid),
    #[error("unit {0} is not deployed")]
    UnitNotDeployed(Uuid),

    // Lookups against the roster.
    #[error("unknown unit {0}")]
    UnknownUnit(Uuid),
    #[error("unknown player {0}")]
    UnknownPlayer(Uuid),
    #[error("unit {unit_id} has no weapon mounted at {location:?} slot {slot}")]
    UnknownWeapon {
        unit_id: Uuid,
        location: PartLocation,
        slot: u8,
    },
}
