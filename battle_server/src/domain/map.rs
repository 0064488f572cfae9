// Battle map: terrain per hex and line of sight.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::hex::HexCoordinates;

// Intervening woods density at which line of sight is blocked.
const LOS_BLOCKING_DENSITY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Clear,
    LightWoods,
    HeavyWoods,
    Rough,
    Water,
}

impl Terrain {
    /// To-hit penalty for firing into or through this terrain.
    pub fn to_hit_modifier(self) -> i32 {
        match self {
            Terrain::LightWoods => 1,
            Terrain::HeavyWoods => 2,
            Terrain::Clear | Terrain::Rough | Terrain::Water => 0,
        }
    }

    /// Extra movement points to enter a hex with this terrain.
    pub fn movement_cost(self) -> u32 {
        match self {
            Terrain::Clear => 0,
            Terrain::LightWoods | Terrain::Rough | Terrain::Water => 1,
            Terrain::HeavyWoods => 2,
        }
    }

    /// Contribution to the intervening density that blocks sight.
    pub fn sight_density(self) -> u32 {
        match self {
            Terrain::LightWoods => 1,
            Terrain::HeavyWoods => 2,
            Terrain::Clear | Terrain::Rough | Terrain::Water => 0,
        }
    }
}

impl FromStr for Terrain {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Terrain::Clear),
            "lightwoods" | "light woods" => Ok(Terrain::LightWoods),
            "heavywoods" | "heavy woods" => Ok(Terrain::HeavyWoods),
            "rough" => Ok(Terrain::Rough),
            "water" => Ok(Terrain::Water),
            _ => Err(DomainError::UnknownTerrain(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hex {
    pub coordinates: HexCoordinates,
    pub terrains: Vec<Terrain>,
}

impl Hex {
    pub fn to_hit_modifier(&self) -> i32 {
        self.terrains.iter().map(|t| t.to_hit_modifier()).sum()
    }

    pub fn movement_cost(&self) -> u32 {
        self.terrains.iter().map(|t| t.movement_cost()).sum()
    }

    pub fn sight_density(&self) -> u32 {
        self.terrains.iter().map(|t| t.sight_density()).sum()
    }
}

/// Serializable hex description with terrain names, as authored in map files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexData {
    pub q: i32,
    pub r: i32,
    #[serde(default)]
    pub terrains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleMap {
    pub width: i32,
    pub height: i32,
    hexes: BTreeMap<HexCoordinates, Hex>,
}

impl BattleMap {
    /// Builds a `width` x `height` map of clear hexes, coordinates starting at 1.
    pub fn clear(width: i32, height: i32) -> Self {
        let mut hexes = BTreeMap::new();
        for q in 1..=width {
            for r in 1..=height {
                let coordinates = HexCoordinates::new(q, r);
                hexes.insert(
                    coordinates,
                    Hex {
                        coordinates,
                        terrains: vec![Terrain::Clear],
                    },
                );
            }
        }
        Self {
            width,
            height,
            hexes,
        }
    }

    /// Builds a map from authored hex data; hexes not listed are clear.
    pub fn from_data(width: i32, height: i32, data: &[HexData]) -> Result<Self, DomainError> {
        let mut map = Self::clear(width, height);
        for hex in data {
            let terrains = hex
                .terrains
                .iter()
                .map(|name| name.parse::<Terrain>())
                .collect::<Result<Vec<_>, _>>()?;
            map.set_terrain(HexCoordinates::new(hex.q, hex.r), terrains);
        }
        Ok(map)
    }

    pub fn set_terrain(&mut self, coordinates: HexCoordinates, terrains: Vec<Terrain>) {
        if let Some(hex) = self.hexes.get_mut(&coordinates) {
            hex.terrains = terrains;
        }
    }

    pub fn hex(&self, coordinates: HexCoordinates) -> Option<&Hex> {
        self.hexes.get(&coordinates)
    }

    pub fn contains(&self, coordinates: HexCoordinates) -> bool {
        self.hexes.contains_key(&coordinates)
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    /// Hexes on the line of sight, in order from `from` to `to`.
    pub fn line_of_sight_path(&self, from: HexCoordinates, to: HexCoordinates) -> Vec<&Hex> {
        from.line_to(to)
            .into_iter()
            .filter_map(|coordinates| self.hex(coordinates))
            .collect()
    }

    /// Sight is blocked when the woods strictly between the two hexes add up to the blocking density.
    pub fn has_line_of_sight(&self, from: HexCoordinates, to: HexCoordinates) -> bool {
        let line = from.line_to(to);
        if line.len() <= 2 {
            return true;
        }
        let density: u32 = line[1..line.len() - 1]
            .iter()
            .filter_map(|coordinates| self.hex(*coordinates))
            .map(Hex::sight_density)
            .sum();
        density < LOS_BLOCKING_DENSITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_terrain_is_rejected() {
        let data = vec![HexData {
            q: 1,
            r: 1,
            terrains: vec!["Lava".to_string()],
        }];
        assert_eq!(
            BattleMap::from_data(3, 3, &data),
            Err(DomainError::UnknownTerrain("Lava".to_string()))
        );
    }

    #[test]
    fn woods_between_hexes_block_sight_at_density_three() {
        let mut map = BattleMap::clear(10, 10);
        let from = HexCoordinates::new(2, 5);
        let to = HexCoordinates::new(2, 1);
        assert!(map.has_line_of_sight(from, to));

        // Straight vertical line: (2,4), (2,3), (2,2) sit between the two hexes.
        map.set_terrain(HexCoordinates::new(2, 4), vec![Terrain::HeavyWoods]);
        assert!(map.has_line_of_sight(from, to));
        map.set_terrain(HexCoordinates::new(2, 3), vec![Terrain::LightWoods]);
        assert!(!map.has_line_of_sight(from, to));
    }

    #[test]
    fn woods_in_end_hexes_do_not_block_sight() {
        let mut map = BattleMap::clear(10, 10);
        let from = HexCoordinates::new(2, 5);
        let to = HexCoordinates::new(2, 3);
        map.set_terrain(from, vec![Terrain::HeavyWoods]);
        map.set_terrain(to, vec![Terrain::HeavyWoods]);
        assert!(map.has_line_of_sight(from, to));
    }

    #[test]
    fn terrain_names_parse_case_insensitively() {
        assert_eq!("Light Woods".parse::<Terrain>(), Ok(Terrain::LightWoods));
        assert_eq!("heavywoods".parse::<Terrain>(), Ok(Terrain::HeavyWoods));
    }
}
