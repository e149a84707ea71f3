//! Movement cost rules for unit stacks.
//!
//! Costs are in double movement points: one full move is 2, so half moves
//! need no floating point. A stack moves at the pace of its slowest member,
//! and can only go where every member can go.

use crate::coords::{CoordinateSystem, MapCoords3D};
use crate::database::Database;
use crate::error::Result;
use crate::fog_memory::FogOfWarMemory;
use crate::map_area::MapArea3D;
use crate::player::PlayerRoster;
use crate::settings::OverlandMapSettings;
use crate::types::{PlayerId, TileTypeId, UnitSkillId};
use crate::unit_stack::{ExpandedUnit, UnitStack};
use std::collections::{HashMap, HashSet};

/// Cost of climbing aboard a transport, regardless of terrain.
pub const DOUBLE_MOVEMENT_TO_BOARD_TRANSPORT: i32 = 2;

/// Cost for a whole stack to enter each tile type.
pub type MovementRates = HashMap<TileTypeId, i32>;

/// Work out the cost for `units` to enter each tile type in the database.
///
/// The cost is the highest cost of any unit. Tile types that any unit cannot
/// enter at all are left out of the result, so flying units never carry
/// ground units over impassable terrain.
pub fn calculate_double_movement_rates_for_unit_stack(
    units: &[ExpandedUnit],
    stack_skills: &HashSet<UnitSkillId>,
    db: &Database,
) -> MovementRates {
    let mut rates = MovementRates::new();
    if units.is_empty() {
        return rates;
    }

    'tile_types: for tile_type in &db.tile_types {
        let mut worst = 0;
        for unit in units {
            match db.double_movement_to_enter_tile_type(&unit.skills, stack_skills, &tile_type.id) {
                Some(cost) => worst = worst.max(cost),
                None => continue 'tile_types,
            }
        }
        rates.insert(tile_type.id.clone(), worst);
    }

    rates
}

/// Movement rates for a stack, using its transports if it is transported.
pub fn unit_stack_movement_rates(stack: &UnitStack, db: &Database) -> MovementRates {
    calculate_double_movement_rates_for_unit_stack(stack.movement_units(), &stack.stack_skills(), db)
}

/// Count the free transport seats in every cell.
///
/// Returns `None` when the stack is transported, since it brings its own
/// seats. Otherwise each cell holds the total capacity of `player_id`'s
/// transports standing there, less one for each of that player's units there
/// which could not stand on the terrain by itself and so must already be
/// aboard. Units in the moving stack are ignored since they are leaving.
/// Cells without transports usually hold 0, and can go negative if
/// remembered passengers outnumber remembered seats.
pub fn calculate_cell_transport_capacity(
    stack: &UnitStack,
    player_id: PlayerId,
    memory: &FogOfWarMemory,
    players: &PlayerRoster,
    coordinate_system: &CoordinateSystem,
    db: &Database,
) -> Result<Option<MapArea3D<i32>>> {
    if stack.is_transported() {
        return Ok(None);
    }

    let mut capacity: MapArea3D<i32> = MapArea3D::new(coordinate_system);

    for unit in memory.units.iter().filter(|u| {
        u.is_alive() && u.owning_player_id == player_id && !stack.contains(u.unit_urn)
    }) {
        let Some(location) = unit.unit_location else {
            continue;
        };
        let Some(tile_type_id) = memory.tile_type_at(&location) else {
            continue;
        };

        let expanded = ExpandedUnit::new(unit, players, db)?;
        let seats = if expanded.is_transport() {
            expanded.transport_capacity as i32
        } else if db
            .double_movement_to_enter_tile_type(&expanded.skills, &expanded.skills, tile_type_id)
            .is_none()
        {
            -1
        } else {
            0
        };

        if seats != 0 {
            if let Some(cell) = capacity.get_mut(&location) {
                *cell += seats;
            }
        }
    }

    Ok(Some(capacity))
}

/// Whether moving into `coords` would start a fight `player_id` knows about.
///
/// That is the case when a living enemy unit is remembered there, or a city
/// with people in it owned by someone else.
pub fn will_moving_here_result_in_an_attack_that_we_know_about(
    coords: &MapCoords3D,
    player_id: PlayerId,
    memory: &FogOfWarMemory,
) -> bool {
    memory.has_enemy_units_at(coords, player_id)
        || memory
            .cell(coords)
            .is_some_and(|cell| cell.has_enemy_city(player_id))
}

/// Everything needed to decide what entering a single cell costs.
#[derive(Clone, Copy, Debug)]
pub struct MovementContext<'a> {
    pub stack: &'a UnitStack,
    pub player_id: PlayerId,
    pub movement_rates: &'a MovementRates,
    pub cell_transport_capacity: Option<&'a MapArea3D<i32>>,
    pub memory: &'a FogOfWarMemory,
    pub settings: &'a OverlandMapSettings,
    pub db: &'a Database,
}

impl MovementContext<'_> {
    /// Cost for the stack to enter `coords`, or `None` if it cannot.
    ///
    /// Cells whose terrain is unknown are never entered. A tile type the
    /// stack cannot cross may still be entered by boarding transports with
    /// enough free seats for the whole stack. Entering peacefully is refused
    /// if it would put more of our units in the cell than the stacking limit
    /// allows; attacking ignores the limit since we won't stay alongside.
    pub fn calculate_double_movement_to_enter_tile(&self, coords: &MapCoords3D) -> Result<Option<i32>> {
        let Some(tile_type_id) = self.memory.tile_type_at(coords) else {
            return Ok(None);
        };
        self.db.find_tile_type(tile_type_id)?;

        if will_moving_here_result_in_an_attack_that_we_know_about(coords, self.player_id, self.memory) {
            return Ok(self.movement_rates.get(tile_type_id).copied());
        }

        let cost = match self.movement_rates.get(tile_type_id) {
            Some(&cost) => cost,
            None => {
                let free_seats = self
                    .cell_transport_capacity
                    .and_then(|c| c.get(coords))
                    .copied()
                    .unwrap_or(0);
                if free_seats > 0 && free_seats as usize >= self.stack.len() {
                    DOUBLE_MOVEMENT_TO_BOARD_TRANSPORT
                } else {
                    return Ok(None);
                }
            }
        };

        let already_here = self
            .memory
            .units_at(coords)
            .filter(|u| u.owning_player_id == self.player_id && !self.stack.contains(u.unit_urn))
            .count();
        if already_here + self.stack.len() > self.settings.max_units_per_map_cell {
            return Ok(None);
        }

        Ok(Some(cost))
    }
}
