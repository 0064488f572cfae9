// Movement paths: step validation and MP accounting.

use thiserror::Error;

use crate::domain::hex::{HexCoordinates, HexPosition};
use crate::domain::map::BattleMap;
use crate::domain::units::MovementType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("standing still cannot carry a path")]
    PathWhileStandingStill,
    #[error("jump needs a destination")]
    EmptyJump,
    #[error("step {0} is neither a straight one-hex move nor a one-side turn")]
    NotContiguous(usize),
    #[error("hex ({}, {}) is off the map", .0.q, .0.r)]
    OffMap(HexCoordinates),
    #[error("path costs {cost} MP, only {budget} available")]
    OverBudget { cost: u32, budget: u32 },
}

/// Outcome of a movement, independent of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementSummary {
    pub final_position: HexPosition,
    pub hexes_moved: u32,
}

/// Final position and hexes moved for an already accepted path.
pub fn summarize(start: HexPosition, movement: MovementType, path: &[HexPosition]) -> MovementSummary {
    let final_position = path.last().copied().unwrap_or(start);
    let hexes_moved = match movement {
        MovementType::StandingStill => 0,
        MovementType::Jump => start.coordinates.distance_to(final_position.coordinates),
        MovementType::Walk | MovementType::Run => {
            let mut previous = start;
            let mut hexes = 0;
            for step in path {
                if step.coordinates != previous.coordinates {
                    hexes += 1;
                }
                previous = *step;
            }
            hexes
        }
    };
    MovementSummary {
        final_position,
        hexes_moved,
    }
}

/// Checks a path against the map and the movement budget and returns its MP cost.
///
/// Ground movement pays 1 MP per hex entered plus the entered hex's terrain cost,
/// and 1 MP per hex side turned. Jumps pay 1 MP per hex of straight distance and
/// ignore terrain and facing.
pub fn validate_path(
    map: &BattleMap,
    start: HexPosition,
    movement: MovementType,
    path: &[HexPosition],
    budget: u32,
) -> Result<u32, PathError> {
    let cost = match movement {
        MovementType::StandingStill => {
            if !path.is_empty() {
                return Err(PathError::PathWhileStandingStill);
            }
            0
        }
        MovementType::Jump => {
            let destination = path.last().ok_or(PathError::EmptyJump)?;
            if !map.contains(destination.coordinates) {
                return Err(PathError::OffMap(destination.coordinates));
            }
            start.coordinates.distance_to(destination.coordinates)
        }
        MovementType::Walk | MovementType::Run => {
            let mut previous = start;
            let mut cost = 0;
            for (index, step) in path.iter().enumerate() {
                if step.coordinates == previous.coordinates {
                    if previous.facing.sides_between(step.facing) != 1 {
                        return Err(PathError::NotContiguous(index));
                    }
                    cost += 1;
                } else {
                    // A unit steps straight ahead or straight back, keeping its facing.
                    let forward = previous.coordinates.neighbor(previous.facing);
                    let backward = previous.coordinates.neighbor(previous.facing.rotate(3));
                    if previous.facing != step.facing
                        || (step.coordinates != forward && step.coordinates != backward)
                    {
                        return Err(PathError::NotContiguous(index));
                    }
                    let hex = map
                        .hex(step.coordinates)
                        .ok_or(PathError::OffMap(step.coordinates))?;
                    cost += 1 + hex.movement_cost();
                }
                previous = *step;
            }
            cost
        }
    };

    if cost > budget {
        return Err(PathError::OverBudget { cost, budget });
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hex::HexDirection;
    use crate::domain::map::Terrain;

    fn at(q: i32, r: i32, facing: HexDirection) -> HexPosition {
        HexPosition::new(HexCoordinates::new(q, r), facing)
    }

    #[test]
    fn ground_path_pays_for_terrain_and_turns() {
        let mut map = BattleMap::clear(10, 10);
        map.set_terrain(HexCoordinates::new(3, 4), vec![Terrain::HeavyWoods]);
        let start = at(3, 6, HexDirection::Top);
        let path = [
            at(3, 5, HexDirection::Top),
            at(3, 4, HexDirection::Top),
            at(3, 4, HexDirection::TopRight),
        ];

        assert_eq!(validate_path(&map, start, MovementType::Walk, &path, 5), Ok(5));
        assert_eq!(
            validate_path(&map, start, MovementType::Walk, &path, 4),
            Err(PathError::OverBudget { cost: 5, budget: 4 })
        );

        let summary = summarize(start, MovementType::Walk, &path);
        assert_eq!(summary.hexes_moved, 2);
        assert_eq!(summary.final_position, at(3, 4, HexDirection::TopRight));
    }

    #[test]
    fn skipping_hexes_or_sliding_sideways_is_rejected() {
        let map = BattleMap::clear(10, 10);
        let start = at(3, 6, HexDirection::Top);
        let jump_ahead = [at(3, 4, HexDirection::Top)];
        assert_eq!(
            validate_path(&map, start, MovementType::Run, &jump_ahead, 8),
            Err(PathError::NotContiguous(0))
        );
        let spin = [at(3, 6, HexDirection::Bottom)];
        assert_eq!(
            validate_path(&map, start, MovementType::Walk, &spin, 8),
            Err(PathError::NotContiguous(0))
        );
    }

    #[test]
    fn ground_steps_go_straight_ahead_or_straight_back() {
        let map = BattleMap::clear(10, 10);
        let start = at(3, 6, HexDirection::Top);

        let sideways = HexCoordinates::new(3, 6).neighbor(HexDirection::TopRight);
        let slide = [HexPosition::new(sideways, HexDirection::Top)];
        assert_eq!(
            validate_path(&map, start, MovementType::Walk, &slide, 8),
            Err(PathError::NotContiguous(0))
        );

        let behind = HexCoordinates::new(3, 6).neighbor(HexDirection::Bottom);
        let back_up = [HexPosition::new(behind, HexDirection::Top)];
        assert_eq!(validate_path(&map, start, MovementType::Walk, &back_up, 8), Ok(1));
    }

    #[test]
    fn jumps_ignore_terrain_but_not_the_map_edge() {
        let mut map = BattleMap::clear(10, 10);
        map.set_terrain(HexCoordinates::new(3, 4), vec![Terrain::HeavyWoods]);
        let start = at(3, 6, HexDirection::Top);
        let path = [at(3, 3, HexDirection::Bottom)];
        assert_eq!(validate_path(&map, start, MovementType::Jump, &path, 3), Ok(3));
        assert_eq!(summarize(start, MovementType::Jump, &path).hexes_moved, 3);

        let off_map = [at(3, 0, HexDirection::Top)];
        assert_eq!(
            validate_path(&map, start, MovementType::Jump, &off_map, 9),
            Err(PathError::OffMap(HexCoordinates::new(3, 0)))
        );
        assert_eq!(
            validate_path(&map, start, MovementType::Jump, &[], 9),
            Err(PathError::EmptyJump)
        );
    }

    #[test]
    fn standing_still_has_no_path() {
        let map = BattleMap::clear(10, 10);
        let start = at(3, 6, HexDirection::Top);
        assert_eq!(validate_path(&map, start, MovementType::StandingStill, &[], 0), Ok(0));
        assert_eq!(
            validate_path(
                &map,
                start,
                MovementType::StandingStill,
                &[at(3, 5, HexDirection::Top)],
                0
            ),
            Err(PathError::PathWhileStandingStill)
        );
    }
}
