//! Fog of war memory: one player's partial, possibly stale view of the world.
//!
//! Each player remembers the terrain, cities and units they have seen. Cells
//! they have never seen hold no terrain data and are treated as impassable
//! by the movement logic. Memory is refreshed by [`FogOfWarMemory::reconcile`]
//! whenever the player's visible area changes; everything outside the
//! visible area keeps whatever was last seen there.

use crate::coords::{CoordinateSystem, MapCoords2D, MapCoords3D};
use crate::error::{MovementError, Result};
use crate::map_area::MapArea3D;
use crate::types::{
    CombatSide, MapFeatureId, PlayerId, TileTypeId, UnitId, UnitSpecialOrder, UnitStatus, UnitUrn,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Terrain known at a cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainData {
    pub tile_type_id: Option<TileTypeId>,
    pub map_feature_id: Option<MapFeatureId>,
}

/// City known at a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityData {
    pub city_owner_id: PlayerId,
    /// Population; a razed city is remembered with 0.
    pub city_population: i32,
}

/// Everything remembered about one cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryGridCell {
    pub terrain_data: Option<TerrainData>,
    pub city_data: Option<CityData>,
}

impl MemoryGridCell {
    /// Tile type id, if the terrain here is known.
    pub fn tile_type_id(&self) -> Option<&str> {
        self.terrain_data
            .as_ref()
            .and_then(|t| t.tile_type_id.as_deref())
    }

    pub fn map_feature_id(&self) -> Option<&str> {
        self.terrain_data
            .as_ref()
            .and_then(|t| t.map_feature_id.as_deref())
    }

    /// Whether a living city stands here owned by someone other than `player_id`.
    pub fn has_enemy_city(&self, player_id: PlayerId) -> bool {
        self.city_data
            .as_ref()
            .is_some_and(|c| c.city_owner_id != player_id && c.city_population > 0)
    }

    /// Whether a living city owned by `player_id` stands here.
    pub fn has_own_city(&self, player_id: PlayerId) -> bool {
        self.city_data
            .as_ref()
            .is_some_and(|c| c.city_owner_id == player_id && c.city_population > 0)
    }
}

/// A unit as remembered by a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUnit {
    pub unit_urn: UnitUrn,
    /// Database unit definition id.
    pub unit_id: UnitId,
    pub owning_player_id: PlayerId,
    /// Position on the overland map; `None` while e.g. banished.
    pub unit_location: Option<MapCoords3D>,
    pub status: UnitStatus,
    pub special_order: Option<UnitSpecialOrder>,
    /// Overland moves left this turn, in double movement points.
    pub double_overland_moves_left: i32,
    /// Combat moves left this combat turn, in double movement points.
    pub double_combat_moves_left: i32,
    /// Overland cell of the combat this unit is in, if any.
    pub combat_location: Option<MapCoords3D>,
    /// Position on the combat map.
    pub combat_position: Option<MapCoords2D>,
    pub combat_side: Option<CombatSide>,
}

impl MemoryUnit {
    /// Create a living unit at `location` with no moves used.
    pub fn new(
        unit_urn: UnitUrn,
        unit_id: impl Into<UnitId>,
        owning_player_id: PlayerId,
        location: MapCoords3D,
    ) -> Self {
        Self {
            unit_urn,
            unit_id: unit_id.into(),
            owning_player_id,
            unit_location: Some(location),
            status: UnitStatus::Alive,
            special_order: None,
            double_overland_moves_left: 2,
            double_combat_moves_left: 0,
            combat_location: None,
            combat_position: None,
            combat_side: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == UnitStatus::Alive
    }

    /// Whether this unit is alive and standing at `coords`.
    pub fn is_at(&self, coords: &MapCoords3D) -> bool {
        self.is_alive() && self.unit_location.as_ref() == Some(coords)
    }
}

/// How much a player knows about a cell right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FogOfWarState {
    #[default]
    NeverSeen,
    /// Seen before but not currently in view; memory may be stale.
    HaveSeen,
    CanSee,
}

/// Counts of what a [`FogOfWarMemory::reconcile`] call changed.
///
/// A unit seen again exactly as it was remembered counts as neither added
/// nor removed; one seen again with any field changed counts as added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FogOfWarChanges {
    pub cells_updated: usize,
    pub units_added: usize,
    pub units_removed: usize,
}

/// One player's memory of the overland map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FogOfWarMemory {
    pub map: MapArea3D<MemoryGridCell>,
    pub units: Vec<MemoryUnit>,
    pub fog_of_war: MapArea3D<FogOfWarState>,
}

impl FogOfWarMemory {
    /// Create an empty memory where nothing has been seen yet.
    pub fn new(coordinate_system: &CoordinateSystem) -> Self {
        Self {
            map: MapArea3D::new(coordinate_system),
            units: Vec::new(),
            fog_of_war: MapArea3D::new(coordinate_system),
        }
    }

    /// Create a memory with every cell known to be `tile_type_id`.
    pub fn filled(coordinate_system: &CoordinateSystem, tile_type_id: &str) -> Self {
        let cell = MemoryGridCell {
            terrain_data: Some(TerrainData {
                tile_type_id: Some(tile_type_id.to_string()),
                map_feature_id: None,
            }),
            city_data: None,
        };
        Self {
            map: MapArea3D::filled(coordinate_system, cell),
            units: Vec::new(),
            fog_of_war: MapArea3D::filled(coordinate_system, FogOfWarState::HaveSeen),
        }
    }

    pub fn cell(&self, coords: &MapCoords3D) -> Option<&MemoryGridCell> {
        self.map.get(coords)
    }

    /// Tile type remembered at `coords`, if known.
    pub fn tile_type_at(&self, coords: &MapCoords3D) -> Option<&str> {
        self.map.get(coords).and_then(|c| c.tile_type_id())
    }

    /// Remember the tile type at `coords`, keeping any map feature.
    pub fn set_tile_type(&mut self, coords: &MapCoords3D, tile_type_id: &str) {
        if let Some(cell) = self.map.get_mut(coords) {
            cell.terrain_data
                .get_or_insert_with(TerrainData::default)
                .tile_type_id = Some(tile_type_id.to_string());
        }
    }

    /// Remember the map feature at `coords`, keeping the tile type.
    pub fn set_map_feature(&mut self, coords: &MapCoords3D, map_feature_id: &str) {
        if let Some(cell) = self.map.get_mut(coords) {
            cell.terrain_data
                .get_or_insert_with(TerrainData::default)
                .map_feature_id = Some(map_feature_id.to_string());
        }
    }

    /// Remember a city at `coords`.
    pub fn set_city(&mut self, coords: &MapCoords3D, city_owner_id: PlayerId, city_population: i32) {
        if let Some(cell) = self.map.get_mut(coords) {
            cell.city_data = Some(CityData {
                city_owner_id,
                city_population,
            });
        }
    }

    pub fn add_unit(&mut self, unit: MemoryUnit) {
        self.units.push(unit);
    }

    pub fn find_unit(&self, unit_urn: UnitUrn) -> Result<&MemoryUnit> {
        self.units
            .iter()
            .find(|u| u.unit_urn == unit_urn)
            .ok_or(MovementError::UnitNotFound(unit_urn))
    }

    pub fn find_unit_mut(&mut self, unit_urn: UnitUrn) -> Result<&mut MemoryUnit> {
        self.units
            .iter_mut()
            .find(|u| u.unit_urn == unit_urn)
            .ok_or(MovementError::UnitNotFound(unit_urn))
    }

    /// Living units remembered at `coords`.
    pub fn units_at<'a>(&'a self, coords: &'a MapCoords3D) -> impl Iterator<Item = &'a MemoryUnit> {
        self.units.iter().filter(move |u| u.is_at(coords))
    }

    /// Whether any living unit not owned by `player_id` is remembered at `coords`.
    pub fn has_enemy_units_at(&self, coords: &MapCoords3D, player_id: PlayerId) -> bool {
        self.units_at(coords).any(|u| u.owning_player_id != player_id)
    }

    /// Bring this memory up to date with what `player_id` can currently see.
    ///
    /// Cells in `visible` are copied from `true_map` and marked
    /// [`FogOfWarState::CanSee`]; cells that were in view but no longer are
    /// downgraded to [`FogOfWarState::HaveSeen`]. Remembered units are
    /// forgotten when their remembered cell is visible or when they are seen
    /// somewhere else, then every living unit standing in a visible cell is
    /// remembered afresh. The player's own units are always known.
    pub fn reconcile(
        &mut self,
        player_id: PlayerId,
        true_map: &MapArea3D<MemoryGridCell>,
        true_units: &[MemoryUnit],
        visible: &MapArea3D<bool>,
    ) -> FogOfWarChanges {
        let mut changes = FogOfWarChanges::default();

        for (coords, can_see) in visible.iter() {
            let Some(state) = self.fog_of_war.get_mut(&coords) else {
                continue;
            };

            if *can_see {
                *state = FogOfWarState::CanSee;
                if let (Some(actual), Some(remembered)) =
                    (true_map.get(&coords), self.map.get_mut(&coords))
                {
                    if remembered != actual {
                        *remembered = actual.clone();
                        changes.cells_updated += 1;
                    }
                }
            } else if *state == FogOfWarState::CanSee {
                *state = FogOfWarState::HaveSeen;
            }
        }

        let is_visible = |unit: &MemoryUnit| {
            unit.owning_player_id == player_id
                || unit
                    .unit_location
                    .as_ref()
                    .is_some_and(|loc| visible.get(loc).copied().unwrap_or(false))
        };

        let seen: Vec<&MemoryUnit> = true_units
            .iter()
            .filter(|u| u.is_alive() && is_visible(u))
            .collect();
        let seen_urns: HashSet<UnitUrn> = seen.iter().map(|u| u.unit_urn).collect();

        let (kept, forgotten): (Vec<MemoryUnit>, Vec<MemoryUnit>) = std::mem::take(&mut self.units)
            .into_iter()
            .partition(|u| !seen_urns.contains(&u.unit_urn) && !is_visible(u));
        self.units = kept;

        // A unit seen again exactly as remembered is neither added nor removed
        let forgotten: HashMap<UnitUrn, MemoryUnit> =
            forgotten.into_iter().map(|u| (u.unit_urn, u)).collect();
        changes.units_removed = forgotten
            .keys()
            .filter(|urn| !seen_urns.contains(urn))
            .count();

        for unit in seen {
            if forgotten.get(&unit.unit_urn) != Some(unit) {
                changes.units_added += 1;
            }
            self.units.push(unit.clone());
        }

        tracing::debug!(
            player_id,
            cells_updated = changes.cells_updated,
            units_added = changes.units_added,
            units_removed = changes.units_removed,
            "Reconciled fog of war memory"
        );

        changes
    }
}
