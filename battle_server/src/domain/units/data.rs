// Serializable unit template, as carried by JoinGame.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::rules::RulesProvider;
use crate::domain::units::catalog;
use crate::domain::units::part::{PartLocation, UnitPart};
use crate::domain::units::unit::{Engine, EngineType, Pilot, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorData {
    pub front: u32,
    #[serde(default)]
    pub rear: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    pub id: Uuid,
    pub chassis: String,
    pub model: String,
    pub mass: u32,
    pub walk_mp: u32,
    pub engine_rating: u32,
    pub engine_type: String,
    #[serde(default)]
    pub pilot: Pilot,
    /// Armor keyed by location code (HD, CT, LT, RT, LA, RA, LL, RL).
    pub armor: BTreeMap<String, ArmorData>,
    /// Equipment names keyed by location code, mounted in order.
    #[serde(default)]
    pub equipment: BTreeMap<String, Vec<String>>,
}

impl Unit {
    /// Builds a unit from its template; locations missing from the template get no armor.
    pub fn from_data(data: &UnitData, rules: &dyn RulesProvider) -> Result<Unit, DomainError> {
        let engine_kind: EngineType = data.engine_type.parse()?;
        let structure = rules.structure(data.mass)?;

        let mut armor = BTreeMap::new();
        for (code, values) in &data.armor {
            armor.insert(code.parse::<PartLocation>()?, *values);
        }

        let mut parts: Vec<UnitPart> = PartLocation::ALL
            .into_iter()
            .map(|location| {
                let values = armor.get(&location).copied().unwrap_or_default();
                UnitPart::new(
                    location,
                    values.front,
                    values.rear,
                    structure.for_location(location),
                )
            })
            .collect();

        for (code, names) in &data.equipment {
            let location: PartLocation = code.parse()?;
            let Some(part) = parts.iter_mut().find(|p| p.location == location) else {
                continue;
            };
            for name in names {
                part.mount(catalog::component(name)?)?;
            }
        }

        Ok(Unit::new(
            data.id,
            data.chassis.clone(),
            data.model.clone(),
            data.mass,
            data.walk_mp,
            Engine {
                rating: data.engine_rating,
                kind: engine_kind,
            },
            data.pilot,
            parts,
        ))
    }
}
