//! Coordinate system for the overland and combat maps.
//!
//! Maps are rectangular grids of `width` x `height` cells on `depth` planes.
//! Only the X axis can wrap; moving off the top or bottom edge, or between
//! planes, is never done by stepping.
//!
//! Directions are numbered 1..=8 clockwise starting from North:
//! 1 = N, 2 = NE, 3 = E, 4 = SE, 5 = S, 6 = SW, 7 = W, 8 = NW.

use serde::{Deserialize, Serialize};

/// Number of directions on both square and diamond maps.
pub const DIRECTION_COUNT: i32 = 8;

/// How cells are laid out on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// Plain rows and columns, used by the overland map.
    #[default]
    Square,
    /// Odd rows are shifted half a cell right, used by combat maps.
    Diamond,
}

/// A position on a single plane.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct MapCoords2D {
    pub x: i32,
    pub y: i32,
}

impl MapCoords2D {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for MapCoords2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position on the overland map including its plane.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct MapCoords3D {
    pub x: i32,
    pub y: i32,
    /// Plane (0 = Arcanus, 1 = Myrror).
    pub z: i32,
}

impl MapCoords3D {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Drop the plane.
    #[inline]
    pub const fn to_2d(&self) -> MapCoords2D {
        MapCoords2D::new(self.x, self.y)
    }
}

impl PartialOrd for MapCoords3D {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MapCoords3D {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Plane, then row-major, for deterministic iteration
        (self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
    }
}

impl std::fmt::Display for MapCoords3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Size, wrapping and addressing of a map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub width: i32,
    pub height: i32,
    /// Number of planes.
    pub depth: i32,
    pub wraps_left_to_right: bool,
    pub addressing_mode: AddressingMode,
}

impl CoordinateSystem {
    /// Create a square addressed coordinate system.
    pub fn new(width: i32, height: i32, depth: i32, wraps_left_to_right: bool) -> Self {
        Self {
            width,
            height,
            depth,
            wraps_left_to_right,
            addressing_mode: AddressingMode::Square,
        }
    }

    /// Create a diamond addressed, single plane coordinate system.
    pub fn diamond(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            depth: 1,
            wraps_left_to_right: false,
            addressing_mode: AddressingMode::Diamond,
        }
    }

    /// Total number of cells over all planes.
    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize) * (self.depth.max(0) as usize)
    }

    /// Bring an x coordinate back into range if the map wraps.
    ///
    /// Coordinates on non-wrapping maps are returned as they are.
    pub fn normalise_x(&self, x: i32) -> i32 {
        if self.wraps_left_to_right && self.width > 0 {
            x.rem_euclid(self.width)
        } else {
            x
        }
    }

    /// Whether x, y lie on the map, after wrapping x.
    pub fn is_on_map_2d(&self, x: i32, y: i32) -> bool {
        let x = self.normalise_x(x);
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Whether the coordinates lie on the map, after wrapping x.
    pub fn is_on_map(&self, coords: &MapCoords3D) -> bool {
        coords.z >= 0 && coords.z < self.depth && self.is_on_map_2d(coords.x, coords.y)
    }

    /// Relative offset of one step in a direction from a cell on row `y`.
    ///
    /// Returns `None` for direction numbers outside 1..=8.
    fn direction_offset(&self, direction: i32, y: i32) -> Option<(i32, i32)> {
        let offset = match self.addressing_mode {
            AddressingMode::Square => match direction {
                1 => (0, -1),
                2 => (1, -1),
                3 => (1, 0),
                4 => (1, 1),
                5 => (0, 1),
                6 => (-1, 1),
                7 => (-1, 0),
                8 => (-1, -1),
                _ => return None,
            },
            AddressingMode::Diamond => {
                let odd = y & 1 == 1;
                let right = if odd { 1 } else { 0 };
                let left = if odd { 0 } else { -1 };
                match direction {
                    1 => (0, -2),
                    2 => (right, -1),
                    3 => (1, 0),
                    4 => (right, 1),
                    5 => (0, 2),
                    6 => (left, 1),
                    7 => (-1, 0),
                    8 => (left, -1),
                    _ => return None,
                }
            }
        };
        Some(offset)
    }

    /// Step one cell in `direction`, wrapping x when allowed.
    ///
    /// Returns false and leaves `coords` untouched if the step would leave
    /// the map or the direction is invalid.
    pub fn move_coordinates_2d(&self, coords: &mut MapCoords2D, direction: i32) -> bool {
        let Some((dx, dy)) = self.direction_offset(direction, coords.y) else {
            return false;
        };

        let new_x = self.normalise_x(coords.x + dx);
        let new_y = coords.y + dy;
        if new_x < 0 || new_x >= self.width || new_y < 0 || new_y >= self.height {
            return false;
        }

        coords.x = new_x;
        coords.y = new_y;
        true
    }

    /// As [`Self::move_coordinates_2d`], keeping the plane.
    pub fn move_coordinates(&self, coords: &mut MapCoords3D, direction: i32) -> bool {
        let mut flat = coords.to_2d();
        if !self.move_coordinates_2d(&mut flat, direction) {
            return false;
        }
        coords.x = flat.x;
        coords.y = flat.y;
        true
    }

    /// Horizontal distance between two columns, taking the short way round a
    /// wrapping map.
    pub fn distance_x(&self, x1: i32, x2: i32) -> i32 {
        let d = (x1 - x2).abs();
        if self.wraps_left_to_right {
            let d = d.rem_euclid(self.width);
            d.min(self.width - d)
        } else {
            d
        }
    }

    /// Vertical distance between two rows. Y never wraps.
    pub fn distance_y(&self, y1: i32, y2: i32) -> i32 {
        (y1 - y2).abs()
    }

    /// Signed x offset from `x1` to `x2` along the shorter way round.
    ///
    /// Adding the result to `x1` lands on `x2`, possibly off the map edge
    /// of a wrapping map; line and polygon rasterising rely on this.
    pub fn offset_x(&self, x1: i32, x2: i32) -> i32 {
        let raw = x2 - x1;
        if !self.wraps_left_to_right {
            return raw;
        }
        let d = raw.rem_euclid(self.width);
        if d * 2 > self.width {
            d - self.width
        } else {
            d
        }
    }

    /// Number of single steps needed to walk between two cells on a plane.
    pub fn step_distance(&self, a: &MapCoords2D, b: &MapCoords2D) -> i32 {
        match self.addressing_mode {
            AddressingMode::Square => self.distance_x(a.x, b.x).max(self.distance_y(a.y, b.y)),
            AddressingMode::Diamond => {
                // Doubled-width columns turn each diamond step into a unit
                // Chebyshev step on the rotated axes
                let ax = a.x * 2 + (a.y & 1);
                let bx = b.x * 2 + (b.y & 1);
                let mut dx = (bx - ax).abs();
                if self.wraps_left_to_right {
                    dx = dx.min(self.width * 2 - dx);
                }
                let dy = (b.y - a.y).abs();
                let u = (dx + dy) / 2;
                let v = (dx - dy).abs() / 2;
                u.max(v)
            }
        }
    }

    /// Whether two cells are on the same plane and within `range` steps.
    pub fn are_coordinates_within_range(
        &self,
        a: &MapCoords3D,
        b: &MapCoords3D,
        range: i32,
    ) -> bool {
        a.z == b.z && self.step_distance(&a.to_2d(), &b.to_2d()) <= range
    }

    /// Component-wise equality after wrapping x.
    pub fn coords_equal(&self, a: &MapCoords3D, b: &MapCoords3D) -> bool {
        a.z == b.z && a.y == b.y && self.normalise_x(a.x) == self.normalise_x(b.x)
    }

    /// The direction which steps from `from` to the adjacent cell `to`.
    pub fn direction_towards(&self, from: &MapCoords2D, to: &MapCoords2D) -> Option<i32> {
        (1..=DIRECTION_COUNT).find(|&d| {
            let mut coords = *from;
            self.move_coordinates_2d(&mut coords, d)
                && coords.x == self.normalise_x(to.x)
                && coords.y == to.y
        })
    }

    /// Iterate every cell on every plane, plane first then row-major.
    pub fn all_coords(&self) -> impl Iterator<Item = MapCoords3D> + '_ {
        (0..self.depth).flat_map(move |z| {
            (0..self.height).flat_map(move |y| (0..self.width).map(move |x| MapCoords3D::new(x, y, z)))
        })
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::new(60, 40, 2, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overland() -> CoordinateSystem {
        CoordinateSystem::new(60, 40, 2, true)
    }

    #[test]
    fn test_distance_x_wraps() {
        let sys = overland();
        assert_eq!(sys.distance_x(0, 59), 1);
        assert_eq!(sys.distance_x(59, 0), 1);
        assert_eq!(sys.distance_x(10, 40), 30);
        assert_eq!(sys.distance_x(5, 50), 15);
    }

    #[test]
    fn test_distance_x_no_wrap() {
        let sys = CoordinateSystem::new(60, 40, 2, false);
        assert_eq!(sys.distance_x(0, 59), 59);
    }

    #[test]
    fn test_distance_y_never_wraps() {
        let sys = overland();
        assert_eq!(sys.distance_y(0, 39), 39);
    }

    #[test]
    fn test_move_wraps_on_x() {
        let sys = overland();
        let mut coords = MapCoords3D::new(59, 10, 1);
        assert!(sys.move_coordinates(&mut coords, 3));
        assert_eq!(coords, MapCoords3D::new(0, 10, 1));

        assert!(sys.move_coordinates(&mut coords, 7));
        assert_eq!(coords, MapCoords3D::new(59, 10, 1));
    }

    #[test]
    fn test_move_off_top_fails_without_moving() {
        let sys = overland();
        let mut coords = MapCoords3D::new(20, 0, 0);
        assert!(!sys.move_coordinates(&mut coords, 1));
        assert!(!sys.move_coordinates(&mut coords, 2));
        assert_eq!(coords, MapCoords3D::new(20, 0, 0));
    }

    #[test]
    fn test_move_off_side_without_wrap_fails() {
        let sys = CoordinateSystem::new(10, 10, 1, false);
        let mut coords = MapCoords2D::new(0, 5);
        assert!(!sys.move_coordinates_2d(&mut coords, 7));
        assert_eq!(coords, MapCoords2D::new(0, 5));
    }

    #[test]
    fn test_invalid_direction() {
        let sys = overland();
        let mut coords = MapCoords3D::new(20, 10, 0);
        assert!(!sys.move_coordinates(&mut coords, 0));
        assert!(!sys.move_coordinates(&mut coords, 9));
        assert_eq!(coords, MapCoords3D::new(20, 10, 0));
    }

    #[test]
    fn test_square_directions() {
        let sys = overland();
        let expected = [
            (1, 20, 9),
            (2, 21, 9),
            (3, 21, 10),
            (4, 21, 11),
            (5, 20, 11),
            (6, 19, 11),
            (7, 19, 10),
            (8, 19, 9),
        ];
        for (d, x, y) in expected {
            let mut coords = MapCoords2D::new(20, 10);
            assert!(sys.move_coordinates_2d(&mut coords, d));
            assert_eq!(coords, MapCoords2D::new(x, y), "direction {}", d);
        }
    }

    #[test]
    fn test_diamond_directions_depend_on_row_parity() {
        let sys = CoordinateSystem::diamond(12, 25);

        let mut even = MapCoords2D::new(5, 10);
        assert!(sys.move_coordinates_2d(&mut even, 2));
        assert_eq!(even, MapCoords2D::new(5, 9));

        let mut odd = MapCoords2D::new(5, 11);
        assert!(sys.move_coordinates_2d(&mut odd, 2));
        assert_eq!(odd, MapCoords2D::new(6, 10));

        let mut north = MapCoords2D::new(5, 10);
        assert!(sys.move_coordinates_2d(&mut north, 1));
        assert_eq!(north, MapCoords2D::new(5, 8));

        let mut sw = MapCoords2D::new(5, 10);
        assert!(sys.move_coordinates_2d(&mut sw, 6));
        assert_eq!(sw, MapCoords2D::new(4, 11));
    }

    #[test]
    fn test_diamond_step_distance_matches_moves() {
        let sys = CoordinateSystem::diamond(12, 25);
        let start = MapCoords2D::new(5, 10);
        for d in 1..=DIRECTION_COUNT {
            let mut coords = start;
            assert!(sys.move_coordinates_2d(&mut coords, d));
            assert_eq!(sys.step_distance(&start, &coords), 1, "direction {}", d);
        }
    }

    #[test]
    fn test_step_distance_square_wraps() {
        let sys = overland();
        let a = MapCoords2D::new(1, 5);
        let b = MapCoords2D::new(58, 7);
        assert_eq!(sys.step_distance(&a, &b), 3);
    }

    #[test]
    fn test_offset_x_short_way_round() {
        let sys = overland();
        assert_eq!(sys.offset_x(1, 58), -3);
        assert_eq!(sys.offset_x(58, 1), 3);
        assert_eq!(sys.offset_x(10, 14), 4);
    }

    #[test]
    fn test_coords_equal_normalises_x() {
        let sys = overland();
        assert!(sys.coords_equal(&MapCoords3D::new(-1, 3, 0), &MapCoords3D::new(59, 3, 0)));
        assert!(!sys.coords_equal(&MapCoords3D::new(59, 3, 0), &MapCoords3D::new(59, 3, 1)));
    }

    #[test]
    fn test_direction_towards() {
        let sys = overland();
        let from = MapCoords2D::new(0, 10);
        assert_eq!(sys.direction_towards(&from, &MapCoords2D::new(59, 9)), Some(8));
        assert_eq!(sys.direction_towards(&from, &MapCoords2D::new(3, 10)), None);
    }

    #[test]
    fn test_all_coords_count() {
        let sys = CoordinateSystem::new(4, 3, 2, false);
        assert_eq!(sys.all_coords().count(), sys.cell_count());
        assert_eq!(sys.all_coords().next(), Some(MapCoords3D::new(0, 0, 0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", MapCoords3D::new(3, 7, 1)), "(3, 7, 1)");
    }
}
