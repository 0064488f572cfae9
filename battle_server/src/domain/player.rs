// Players and the units they own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::units::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    Joining,
    Playing,
    Defeated,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub tint: String,
    pub status: PlayerStatus,
    pub units: Vec<Unit>,
}

impl Player {
    pub fn new(id: Uuid, name: impl Into<String>, tint: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tint: tint.into(),
            status: PlayerStatus::Joining,
            units: Vec::new(),
        }
    }

    pub fn unit(&self, unit_id: Uuid) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn unit_mut(&mut self, unit_id: Uuid) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == unit_id)
    }

    pub fn operational_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_operational())
    }

    pub fn has_operational_units(&self) -> bool {
        self.operational_units().next().is_some()
    }

    /// Units that are still standing, shut down or not.
    pub fn surviving_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| !u.is_destroyed())
    }

    pub fn has_undeployed_units(&self) -> bool {
        self.surviving_units().any(|u| !u.is_deployed())
    }
}
