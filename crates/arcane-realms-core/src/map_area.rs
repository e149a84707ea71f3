//! Dense grid storage addressed by map coordinates.
//!
//! A [`MapArea2D`] holds one value per cell of a single plane and a
//! [`MapArea3D`] stacks one of those per plane. Areas are created fresh for
//! each calculation; x coordinates are wrapped on the way in so callers can
//! pass coordinates that stepped off the edge of a wrapping map.
//!
//! Boolean areas additionally support the bulk operations used by the zone
//! calculation: lines, polygons and radius (de)selection.

use crate::coords::{AddressingMode, CoordinateSystem, MapCoords2D, MapCoords3D};
use serde::{Deserialize, Serialize};

/// One plane of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapArea2D<T> {
    coordinate_system: CoordinateSystem,
    cells: Vec<T>,
}

impl<T: Clone + Default> MapArea2D<T> {
    /// Create a plane with every cell at `T::default()`.
    pub fn new(coordinate_system: &CoordinateSystem) -> Self {
        Self::filled(coordinate_system, T::default())
    }
}

impl<T: Clone> MapArea2D<T> {
    /// Create a plane with every cell set to `value`.
    pub fn filled(coordinate_system: &CoordinateSystem, value: T) -> Self {
        let size = (coordinate_system.width.max(0) * coordinate_system.height.max(0)) as usize;
        Self {
            coordinate_system: coordinate_system.clone(),
            cells: vec![value; size],
        }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        for cell in self.cells.iter_mut() {
            *cell = value.clone();
        }
    }
}

impl<T> MapArea2D<T> {
    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }

    pub fn width(&self) -> i32 {
        self.coordinate_system.width
    }

    pub fn height(&self) -> i32 {
        self.coordinate_system.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = self.coordinate_system.normalise_x(x);
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some((y * self.width() + x) as usize)
    }

    /// Get the value at x, y. `None` if off the map.
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Get a mutable reference to the value at x, y.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Set the value at x, y. Returns false if the cell is off the map.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Iterate cells row by row as `(coords, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (MapCoords2D, &T)> {
        let width = self.width();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (MapCoords2D::new(i as i32 % width, i as i32 / width), v))
    }
}

impl<T: PartialEq> MapArea2D<T> {
    /// Number of cells holding `value`.
    pub fn count(&self, value: &T) -> usize {
        self.cells.iter().filter(|v| *v == value).count()
    }
}

impl MapArea2D<bool> {
    /// Reset every cell to false.
    pub fn deselect_all(&mut self) {
        self.fill(false);
    }

    /// Set every cell within `radius` steps of x, y to `value`.
    ///
    /// Radius 0 touches only the centre cell; a negative radius does nothing.
    pub fn set_radius(&mut self, x: i32, y: i32, radius: i32, value: bool) {
        if radius < 0 {
            return;
        }
        let centre = MapCoords2D::new(x, y);
        let dy_range = match self.coordinate_system.addressing_mode {
            AddressingMode::Square => radius,
            AddressingMode::Diamond => radius * 2,
        };
        for dy in -dy_range..=dy_range {
            for dx in -radius..=radius {
                let cell = MapCoords2D::new(x + dx, y + dy);
                if self.coordinate_system.step_distance(&centre, &cell) <= radius {
                    self.set(cell.x, cell.y, value);
                }
            }
        }
    }

    /// Set every cell within `radius` of x, y to true.
    pub fn select_radius(&mut self, x: i32, y: i32, radius: i32) {
        self.set_radius(x, y, radius, true);
    }

    /// Set every cell within `radius` of x, y to false.
    pub fn deselect_radius(&mut self, x: i32, y: i32, radius: i32) {
        self.set_radius(x, y, radius, false);
    }

    /// Set each cell at `centre + offset` to `value`, skipping cells off the map.
    pub fn set_offsets(&mut self, centre: &MapCoords2D, offsets: &[MapCoords2D], value: bool) {
        for offset in offsets {
            self.set(centre.x + offset.x, centre.y + offset.y, value);
        }
    }

    /// Rasterise a line between two points.
    ///
    /// On a wrapping map the line takes the short way round. A zero length
    /// line sets the single cell. The line is drawn with a square brush
    /// `thickness` cells across, 0 counting as 1; an even thickness puts the
    /// extra cell to the right of and below the line.
    pub fn set_line(&mut self, from: &MapCoords2D, to: &MapCoords2D, thickness: i32, value: bool) {
        let thickness = thickness.max(1);
        let before = (thickness - 1) / 2;
        let after = thickness / 2;
        let x0 = from.x;
        let y0 = from.y;
        let x1 = x0 + self.coordinate_system.offset_x(from.x, to.x);
        let y1 = to.y;

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            for oy in -before..=after {
                for ox in -before..=after {
                    self.set(x + ox, y + oy, value);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill a polygon, including its edges.
    ///
    /// Vertices are unwrapped relative to the first one so a polygon can
    /// straddle the wrap seam. Collinear vertices set only the edge cells and
    /// an empty vertex list does nothing.
    pub fn set_polygon(&mut self, vertices: &[MapCoords2D], value: bool) {
        let Some(first) = vertices.first() else {
            return;
        };

        let unwrapped: Vec<MapCoords2D> = vertices
            .iter()
            .map(|v| MapCoords2D::new(first.x + self.coordinate_system.offset_x(first.x, v.x), v.y))
            .collect();

        for i in 0..unwrapped.len() {
            let a = unwrapped[i];
            let b = unwrapped[(i + 1) % unwrapped.len()];
            self.set_line(&a, &b, 1, value);
        }

        if unwrapped.len() < 3 {
            return;
        }

        let min_x = unwrapped.iter().map(|v| v.x).min().unwrap_or(first.x);
        let max_x = unwrapped.iter().map(|v| v.x).max().unwrap_or(first.x);
        let min_y = unwrapped.iter().map(|v| v.y).min().unwrap_or(first.y);
        let max_y = unwrapped.iter().map(|v| v.y).max().unwrap_or(first.y);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if point_in_polygon(x, y, &unwrapped) {
                    self.set(x, y, value);
                }
            }
        }
    }

    /// Render the plane as rows of `#` (true) and `.` (false).
    pub fn to_rows(&self) -> Vec<String> {
        let width = self.width().max(0) as usize;
        if width == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|&b| if b { '#' } else { '.' }).collect())
            .collect()
    }
}

/// Even-odd crossing test of a cell centre against a polygon.
fn point_in_polygon(x: i32, y: i32, vertices: &[MapCoords2D]) -> bool {
    let px = x as f64;
    let py = y as f64;
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].x as f64, vertices[i].y as f64);
        let (xj, yj) = (vertices[j].x as f64, vertices[j].y as f64);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// One [`MapArea2D`] per plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapArea3D<T> {
    planes: Vec<MapArea2D<T>>,
}

impl<T: Clone + Default> MapArea3D<T> {
    /// Create a volume with every cell at `T::default()`.
    pub fn new(coordinate_system: &CoordinateSystem) -> Self {
        Self::filled(coordinate_system, T::default())
    }
}

impl<T: Clone> MapArea3D<T> {
    /// Create a volume with every cell set to `value`.
    pub fn filled(coordinate_system: &CoordinateSystem, value: T) -> Self {
        Self {
            planes: (0..coordinate_system.depth.max(0))
                .map(|_| MapArea2D::filled(coordinate_system, value.clone()))
                .collect(),
        }
    }

    /// Set every cell on every plane to `value`.
    pub fn fill(&mut self, value: T) {
        for plane in self.planes.iter_mut() {
            plane.fill(value.clone());
        }
    }
}

impl<T> MapArea3D<T> {
    pub fn depth(&self) -> i32 {
        self.planes.len() as i32
    }

    /// Access a single plane.
    pub fn plane(&self, z: i32) -> Option<&MapArea2D<T>> {
        usize::try_from(z).ok().and_then(|z| self.planes.get(z))
    }

    /// Mutable access to a single plane.
    pub fn plane_mut(&mut self, z: i32) -> Option<&mut MapArea2D<T>> {
        usize::try_from(z).ok().and_then(move |z| self.planes.get_mut(z))
    }

    pub fn get(&self, coords: &MapCoords3D) -> Option<&T> {
        self.plane(coords.z).and_then(|p| p.get(coords.x, coords.y))
    }

    pub fn get_mut(&mut self, coords: &MapCoords3D) -> Option<&mut T> {
        self.plane_mut(coords.z).and_then(|p| p.get_mut(coords.x, coords.y))
    }

    /// Set the value at `coords`. Returns false if the cell is off the map.
    pub fn set(&mut self, coords: &MapCoords3D, value: T) -> bool {
        match self.plane_mut(coords.z) {
            Some(plane) => plane.set(coords.x, coords.y, value),
            None => false,
        }
    }

    /// Iterate every cell as `(coords, value)`, plane by plane.
    pub fn iter(&self) -> impl Iterator<Item = (MapCoords3D, &T)> {
        self.planes.iter().enumerate().flat_map(|(z, plane)| {
            plane
                .iter()
                .map(move |(c, v)| (MapCoords3D::new(c.x, c.y, z as i32), v))
        })
    }
}

impl<T: PartialEq> MapArea3D<T> {
    /// Number of cells on all planes holding `value`.
    pub fn count(&self, value: &T) -> usize {
        self.planes.iter().map(|p| p.count(value)).sum()
    }
}

impl MapArea3D<bool> {
    /// Reset every cell on every plane to false.
    pub fn deselect_all(&mut self) {
        self.fill(false);
    }
}
