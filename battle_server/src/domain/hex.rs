// Hex grid geometry: flat-topped hexes in odd-q offset coordinates.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
// Tolerance for bearings that land exactly on an arc boundary.
const ARC_EPSILON: f64 = 1e-6;

/// Column/row position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoordinates {
    pub q: i32,
    pub r: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeCoordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl HexCoordinates {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn to_cube(self) -> CubeCoordinates {
        let x = self.q;
        let z = self.r - (self.q - (self.q & 1)) / 2;
        CubeCoordinates { x, y: -x - z, z }
    }

    pub fn from_cube(cube: CubeCoordinates) -> Self {
        Self {
            q: cube.x,
            r: cube.z + (cube.x - (cube.x & 1)) / 2,
        }
    }

    pub fn distance_to(self, other: HexCoordinates) -> u32 {
        let a = self.to_cube();
        let b = other.to_cube();
        let dx = (a.x - b.x).unsigned_abs();
        let dy = (a.y - b.y).unsigned_abs();
        let dz = (a.z - b.z).unsigned_abs();
        dx.max(dy).max(dz)
    }

    pub fn neighbor(self, direction: HexDirection) -> HexCoordinates {
        let cube = self.to_cube();
        let (dx, dy, dz) = direction.cube_offset();
        Self::from_cube(CubeCoordinates {
            x: cube.x + dx,
            y: cube.y + dy,
            z: cube.z + dz,
        })
    }

    /// Every hex crossed by the straight line between the two centers,
    /// both endpoints included.
    pub fn line_to(self, other: HexCoordinates) -> Vec<HexCoordinates> {
        let distance = self.distance_to(other);
        if distance == 0 {
            return vec![self];
        }

        let a = self.to_cube();
        let b = other.to_cube();
        // Nudge the start so lines running along hex edges resolve the same way everywhere.
        let (ax, ay, az) = (
            f64::from(a.x) + 1e-6,
            f64::from(a.y) + 2e-6,
            f64::from(a.z) - 3e-6,
        );
        let (bx, by, bz) = (f64::from(b.x), f64::from(b.y), f64::from(b.z));

        (0..=distance)
            .map(|step| {
                let t = f64::from(step) / f64::from(distance);
                Self::from_cube(cube_round(
                    ax + (bx - ax) * t,
                    ay + (by - ay) * t,
                    az + (bz - az) * t,
                ))
            })
            .collect()
    }

    fn pixel_center(self) -> (f64, f64) {
        let x = 1.5 * f64::from(self.q);
        let y = SQRT_3 * (f64::from(self.r) + 0.5 * f64::from(self.q & 1));
        (x, y)
    }

    /// Clockwise bearing in degrees from this hex to `other`, 0 pointing at the top of the map.
    pub fn bearing_to(self, other: HexCoordinates) -> f64 {
        let (x1, y1) = self.pixel_center();
        let (x2, y2) = other.pixel_center();
        let bearing = (x2 - x1).atan2(y1 - y2).to_degrees();
        bearing.rem_euclid(360.0)
    }
}

fn cube_round(x: f64, y: f64, z: f64) -> CubeCoordinates {
    let (mut rx, mut ry, mut rz) = (x.round(), y.round(), z.round());
    let (dx, dy, dz) = ((rx - x).abs(), (ry - y).abs(), (rz - z).abs());

    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        ry = -rx - rz;
    } else {
        rz = -rx - ry;
    }

    CubeCoordinates {
        x: rx as i32,
        y: ry as i32,
        z: rz as i32,
    }
}

/// The six hex sides, clockwise from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HexDirection {
    Top = 0,
    TopRight = 1,
    BottomRight = 2,
    Bottom = 3,
    BottomLeft = 4,
    TopLeft = 5,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::Top,
        HexDirection::TopRight,
        HexDirection::BottomRight,
        HexDirection::Bottom,
        HexDirection::BottomLeft,
        HexDirection::TopLeft,
    ];

    fn cube_offset(self) -> (i32, i32, i32) {
        match self {
            HexDirection::Top => (0, 1, -1),
            HexDirection::TopRight => (1, 0, -1),
            HexDirection::BottomRight => (1, -1, 0),
            HexDirection::Bottom => (0, -1, 1),
            HexDirection::BottomLeft => (-1, 0, 1),
            HexDirection::TopLeft => (-1, 1, 0),
        }
    }

    pub fn bearing(self) -> f64 {
        f64::from(self as u8) * 60.0
    }

    pub fn rotate(self, steps: i32) -> HexDirection {
        let index = (i32::from(self as u8) + steps).rem_euclid(6);
        Self::ALL[index as usize]
    }

    /// Number of hex sides between two facings (0..=3).
    pub fn sides_between(self, other: HexDirection) -> u8 {
        let diff = (i32::from(self as u8) - i32::from(other as u8)).rem_euclid(6) as u8;
        diff.min(6 - diff)
    }
}

impl TryFrom<u8> for HexDirection {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(DomainError::InvalidDirection(value))
    }
}

impl From<HexDirection> for u8 {
    fn from(direction: HexDirection) -> Self {
        direction as u8
    }
}

/// Relative bearing in degrees of `target` as seen from `origin` facing `facing`.
pub fn relative_bearing(
    origin: HexCoordinates,
    facing: HexDirection,
    target: HexCoordinates,
) -> f64 {
    if origin == target {
        return 0.0;
    }
    (origin.bearing_to(target) - facing.bearing()).rem_euclid(360.0)
}

/// True when `target` lies in the 120 degree forward arc; arc borders count as forward.
pub fn in_forward_arc(origin: HexCoordinates, facing: HexDirection, target: HexCoordinates) -> bool {
    let relative = relative_bearing(origin, facing, target);
    relative <= 60.0 + ARC_EPSILON || relative >= 300.0 - ARC_EPSILON
}

/// Position plus body facing of a unit on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexPosition {
    pub coordinates: HexCoordinates,
    pub facing: HexDirection,
}

impl HexPosition {
    pub const fn new(coordinates: HexCoordinates, facing: HexDirection) -> Self {
        Self {
            coordinates,
            facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_counts_hex_steps() {
        let origin = HexCoordinates::new(2, 2);
        assert_eq!(origin.distance_to(origin), 0);
        assert_eq!(origin.distance_to(HexCoordinates::new(2, 5)), 3);
        assert_eq!(origin.distance_to(HexCoordinates::new(5, 2)), 3);
        for direction in HexDirection::ALL {
            assert_eq!(origin.distance_to(origin.neighbor(direction)), 1);
        }
    }

    #[test]
    fn cube_conversion_round_trips() {
        for q in -3..6 {
            for r in -3..6 {
                let hex = HexCoordinates::new(q, r);
                assert_eq!(HexCoordinates::from_cube(hex.to_cube()), hex);
            }
        }
    }

    #[test]
    fn line_includes_both_ends_and_is_contiguous() {
        let a = HexCoordinates::new(1, 1);
        let b = HexCoordinates::new(5, 3);
        let line = a.line_to(b);
        assert_eq!(line.len() as u32, a.distance_to(b) + 1);
        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
        for pair in line.windows(2) {
            assert_eq!(pair[0].distance_to(pair[1]), 1);
        }
    }

    #[test]
    fn neighbors_have_expected_bearings() {
        let origin = HexCoordinates::new(4, 4);
        for direction in HexDirection::ALL {
            let bearing = origin.bearing_to(origin.neighbor(direction));
            let diff = (bearing - direction.bearing()).abs();
            assert!(diff < 1e-6 || (360.0 - diff) < 1e-6, "{direction:?}: {bearing}");
        }
    }

    #[test]
    fn forward_arc_covers_three_hex_sides() {
        let origin = HexCoordinates::new(4, 4);
        let facing = HexDirection::Top;
        assert!(in_forward_arc(origin, facing, origin.neighbor(HexDirection::Top)));
        assert!(in_forward_arc(origin, facing, origin.neighbor(HexDirection::TopRight)));
        assert!(in_forward_arc(origin, facing, origin.neighbor(HexDirection::TopLeft)));
        assert!(!in_forward_arc(origin, facing, origin.neighbor(HexDirection::Bottom)));
        assert!(!in_forward_arc(origin, facing, origin.neighbor(HexDirection::BottomRight)));
    }

    #[test]
    fn direction_helpers() {
        assert_eq!(HexDirection::Top.rotate(-1), HexDirection::TopLeft);
        assert_eq!(HexDirection::TopLeft.rotate(1), HexDirection::Top);
        assert_eq!(HexDirection::Top.sides_between(HexDirection::Bottom), 3);
        assert_eq!(HexDirection::Top.sides_between(HexDirection::TopLeft), 1);
        assert_eq!(HexDirection::try_from(6), Err(DomainError::InvalidDirection(6)));
    }
}
