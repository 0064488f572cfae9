// Per-turn heat bookkeeping for one unit.

use serde::{Deserialize, Serialize};

use crate::domain::units::MovementType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementHeatSource {
    pub movement_type: MovementType,
    pub hexes_moved: u32,
    pub heat: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponHeatSource {
    pub weapon_name: String,
    pub heat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DissipationData {
    pub heat_sinks: u32,
    pub engine_heat_sinks: u32,
    pub dissipation_points: u32,
}

/// Heat generated and dissipated by one unit during one turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeatData {
    pub movement_heat_sources: Vec<MovementHeatSource>,
    pub weapon_heat_sources: Vec<WeaponHeatSource>,
    pub dissipation: DissipationData,
}

impl HeatData {
    pub fn total_movement_heat(&self) -> u32 {
        self.movement_heat_sources.iter().map(|s| s.heat).sum()
    }

    pub fn total_weapon_heat(&self) -> u32 {
        self.weapon_heat_sources.iter().map(|s| s.heat).sum()
    }

    pub fn total_generated(&self) -> u32 {
        self.total_movement_heat() + self.total_weapon_heat()
    }

    pub fn total_dissipated(&self) -> u32 {
        self.dissipation.dissipation_points
    }

    /// Heat level after this turn, never below zero.
    pub fn resolve(&self, previous_heat: u32) -> u32 {
        (previous_heat + self.total_generated()).saturating_sub(self.total_dissipated())
    }
}
