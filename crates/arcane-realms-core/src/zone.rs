//! Friendly zone calculation for AI border heuristics.
//!
//! A player's zone is the territory they consider theirs: the area around
//! each of their cities, joined up between cities close enough together,
//! minus water and the cells next to enemy cities. It is worked out from the
//! player's fog of war memory, so it only reflects what they know.

use crate::coords::{CoordinateSystem, MapCoords2D, MapCoords3D};
use crate::database::Database;
use crate::error::Result;
use crate::fog_memory::FogOfWarMemory;
use crate::map_area::MapArea3D;
use crate::settings::default_city_radius;
use crate::types::PlayerId;

/// Cells cleared around each enemy city.
const ENEMY_CITY_BUFFER: i32 = 1;

/// Work out `player_id`'s friendly zone using the standard city radius.
///
/// Cities on the same plane within `separation` cells of each other on both
/// axes are joined by a line, and any three mutually in range have the
/// triangle between them filled.
pub fn calculate_friendly_zone(
    memory: &FogOfWarMemory,
    coordinate_system: &CoordinateSystem,
    player_id: PlayerId,
    separation: i32,
    db: &Database,
) -> Result<MapArea3D<bool>> {
    calculate_friendly_zone_with_city_radius(
        memory,
        coordinate_system,
        player_id,
        separation,
        &default_city_radius(),
        db,
    )
}

/// As [`calculate_friendly_zone`] with a custom set of city radius offsets.
///
/// Fails with `RecordNotFound` if any remembered tile type is missing from
/// the database.
pub fn calculate_friendly_zone_with_city_radius(
    memory: &FogOfWarMemory,
    coordinate_system: &CoordinateSystem,
    player_id: PlayerId,
    separation: i32,
    city_radius: &[MapCoords2D],
    db: &Database,
) -> Result<MapArea3D<bool>> {
    let our_cities: Vec<MapCoords3D> = memory
        .map
        .iter()
        .filter(|(_, cell)| cell.has_own_city(player_id))
        .map(|(coords, _)| coords)
        .collect();

    let mut zone: MapArea3D<bool> = MapArea3D::new(coordinate_system);
    zone.deselect_all();

    for city in &our_cities {
        if let Some(plane) = zone.plane_mut(city.z) {
            plane.set_offsets(&city.to_2d(), city_radius, true);
        }
    }

    let in_range = |a: &MapCoords3D, b: &MapCoords3D| {
        a.z == b.z
            && coordinate_system.distance_x(a.x, b.x) <= separation
            && coordinate_system.distance_y(a.y, b.y) <= separation
    };

    for (i, a) in our_cities.iter().enumerate() {
        for b in &our_cities[i + 1..] {
            if !in_range(a, b) {
                continue;
            }
            if let Some(plane) = zone.plane_mut(a.z) {
                plane.set_line(&a.to_2d(), &b.to_2d(), 1, true);
            }
        }
    }

    // Radii and lines nearly always cover the inside of the triangle anyway
    for (i, a) in our_cities.iter().enumerate() {
        for (j, b) in our_cities.iter().enumerate().skip(i + 1) {
            if !in_range(a, b) {
                continue;
            }
            for c in &our_cities[j + 1..] {
                if in_range(a, c) && in_range(b, c) {
                    if let Some(plane) = zone.plane_mut(a.z) {
                        plane.set_polygon(&[a.to_2d(), b.to_2d(), c.to_2d()], true);
                    }
                }
            }
        }
    }

    for (coords, cell) in memory.map.iter() {
        let water = match cell.tile_type_id() {
            Some(tile_type_id) => db.find_tile_type(tile_type_id)?.is_water(),
            None => false,
        };

        let Some(plane) = zone.plane_mut(coords.z) else {
            continue;
        };
        if cell.has_enemy_city(player_id) {
            plane.deselect_radius(coords.x, coords.y, ENEMY_CITY_BUFFER);
        }
        if water {
            plane.set(coords.x, coords.y, false);
        }
    }

    // An enemy city right next door may have cleared one of our own
    for city in &our_cities {
        zone.set(city, true);
    }

    tracing::debug!(
        player_id,
        cities = our_cities.len(),
        cells = zone.count(&true),
        "Calculated friendly zone"
    );

    Ok(zone)
}
