//! Turn-scoped queues of units still waiting for movement orders.
//!
//! One [`OverlandMovementQueue`] lives for a player's overland turn and one
//! [`CombatMovementQueue`] for each of their combat turns. Both are rebuilt
//! from the player's memory at the start of the turn and then mutated only
//! through the operations here as the player hands out orders.

use crate::coords::MapCoords3D;
use crate::error::Result;
use crate::fog_memory::{FogOfWarMemory, MemoryUnit};
use crate::types::{PlayerId, UnitSpecialOrder, UnitUrn};
use serde::{Deserialize, Serialize};

/// A move already ordered but not yet carried out.
///
/// In simultaneous turn games moves are resolved together at the end of the
/// turn, so units with a pending move must not be prompted again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMovement {
    pub unit_urns: Vec<UnitUrn>,
    pub move_from: MapCoords3D,
    pub move_to: MapCoords3D,
}

impl PendingMovement {
    pub fn new(unit_urns: Vec<UnitUrn>, move_from: MapCoords3D, move_to: MapCoords3D) -> Self {
        Self {
            unit_urns,
            move_from,
            move_to,
        }
    }

    pub fn contains(&self, unit_urn: UnitUrn) -> bool {
        self.unit_urns.contains(&unit_urn)
    }
}

/// Overland units the player still has to give orders to this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlandMovementQueue {
    units_left_to_move: Vec<UnitUrn>,
    selected: Vec<UnitUrn>,
}

impl OverlandMovementQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the list from the player's memory at the start of a turn.
    ///
    /// Takes every living unit of `player_id` on the map with moves left, no
    /// special order and no pending move. On even turns the list is reversed
    /// so the same units are not always prompted first. Clears the selection.
    pub fn build_units_left_to_move_list(
        &mut self,
        memory: &FogOfWarMemory,
        player_id: PlayerId,
        turn_number: u32,
        pending_movements: &[PendingMovement],
    ) {
        let is_pending = |unit_urn: UnitUrn| pending_movements.iter().any(|p| p.contains(unit_urn));

        self.units_left_to_move = memory
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && u.owning_player_id == player_id
                    && u.double_overland_moves_left > 0
                    && u.special_order.is_none()
                    && u.unit_location.is_some()
                    && !is_pending(u.unit_urn)
            })
            .map(|u| u.unit_urn)
            .collect();

        if turn_number % 2 == 0 {
            self.units_left_to_move.reverse();
        }
        self.selected.clear();

        tracing::debug!(
            player_id,
            turn_number,
            units = self.units_left_to_move.len(),
            "Built overland units left to move list"
        );
    }

    pub fn units_left_to_move(&self) -> &[UnitUrn] {
        &self.units_left_to_move
    }

    /// Units currently presented to the player for orders.
    pub fn selected(&self) -> &[UnitUrn] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.units_left_to_move.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units_left_to_move.len()
    }

    /// Select the unit at the head of the list, plus every other queued
    /// unit standing in the same cell.
    ///
    /// Returns the new selection, empty once every unit has its orders.
    pub fn select_next_unit_to_move(&mut self, memory: &FogOfWarMemory) -> Result<&[UnitUrn]> {
        self.selected.clear();

        let Some(&head) = self.units_left_to_move.first() else {
            tracing::debug!("No units left to move");
            return Ok(&self.selected);
        };

        let location = memory.find_unit(head)?.unit_location;
        self.selected.push(head);

        // Units that died since the list was built are skipped
        if location.is_some() {
            for &unit_urn in &self.units_left_to_move[1..] {
                let same_cell = memory
                    .find_unit(unit_urn)
                    .ok()
                    .is_some_and(|unit| unit.is_alive() && unit.unit_location == location);
                if same_cell {
                    self.selected.push(unit_urn);
                }
            }
        }

        tracing::debug!(
            head,
            selected = self.selected.len(),
            "Selected next units to move"
        );
        Ok(&self.selected)
    }

    /// Take a unit out of the list, e.g. once it has been given an order or
    /// has died. Returns whether it was queued.
    pub fn remove_unit_from_left_to_move(&mut self, unit_urn: UnitUrn) -> bool {
        self.selected.retain(|&u| u != unit_urn);
        let before = self.units_left_to_move.len();
        self.units_left_to_move.retain(|&u| u != unit_urn);
        self.units_left_to_move.len() != before
    }

    /// The selected units need no orders this turn.
    pub fn selected_units_done(&mut self) {
        let selected = std::mem::take(&mut self.selected);
        self.units_left_to_move.retain(|u| !selected.contains(u));
    }

    /// Prompt for the selected units again after everyone else.
    pub fn selected_units_wait(&mut self) {
        let selected = std::mem::take(&mut self.selected);
        self.units_left_to_move.retain(|u| !selected.contains(u));
        self.units_left_to_move.extend(selected);
    }

    /// Put the selected units on patrol.
    ///
    /// Patrol is a standing order, so they are also left out of the list on
    /// later turns until it is cancelled.
    pub fn selected_units_patrol(&mut self, memory: &mut FogOfWarMemory) -> Result<()> {
        for &unit_urn in &self.selected {
            memory.find_unit_mut(unit_urn)?.special_order = Some(UnitSpecialOrder::Patrol);
        }
        self.selected_units_done();
        Ok(())
    }
}

/// What the player should be shown next in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatSelection {
    /// Give this unit its orders.
    Unit(UnitUrn),
    /// Nobody is left to move; the combat turn should be ended.
    EndCombatTurn,
}

/// Combat units the player still has to give orders to this combat turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatMovementQueue {
    combat_location: MapCoords3D,
    units_left_to_move: Vec<UnitUrn>,
    selected: Option<UnitUrn>,
}

impl CombatMovementQueue {
    /// Build the list for the combat at `combat_location`.
    ///
    /// Takes every living unit of `player_id` placed on the combat map there
    /// that has combat moves left.
    pub fn new(memory: &FogOfWarMemory, player_id: PlayerId, combat_location: MapCoords3D) -> Self {
        let in_this_combat = |u: &&MemoryUnit| {
            u.is_alive()
                && u.owning_player_id == player_id
                && u.combat_location == Some(combat_location)
                && u.combat_position.is_some()
                && u.combat_side.is_some()
                && u.double_combat_moves_left > 0
        };

        let units_left_to_move: Vec<UnitUrn> = memory
            .units
            .iter()
            .filter(in_this_combat)
            .map(|u| u.unit_urn)
            .collect();

        tracing::debug!(
            player_id,
            %combat_location,
            units = units_left_to_move.len(),
            "Built combat units left to move list"
        );

        Self {
            combat_location,
            units_left_to_move,
            selected: None,
        }
    }

    pub fn combat_location(&self) -> &MapCoords3D {
        &self.combat_location
    }

    pub fn units_left_to_move(&self) -> &[UnitUrn] {
        &self.units_left_to_move
    }

    pub fn selected(&self) -> Option<UnitUrn> {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.units_left_to_move.is_empty()
    }

    /// Select the unit at the head of the list.
    pub fn select_next_unit_to_move(&mut self) -> CombatSelection {
        self.selected = self.units_left_to_move.first().copied();
        match self.selected {
            Some(unit_urn) => CombatSelection::Unit(unit_urn),
            None => {
                tracing::debug!(combat_location = %self.combat_location, "Ending combat turn");
                CombatSelection::EndCombatTurn
            }
        }
    }

    /// Take a unit out of the list. Returns whether it was queued.
    pub fn remove_unit_from_left_to_move(&mut self, unit_urn: UnitUrn) -> bool {
        if self.selected == Some(unit_urn) {
            self.selected = None;
        }
        let before = self.units_left_to_move.len();
        self.units_left_to_move.retain(|&u| u != unit_urn);
        self.units_left_to_move.len() != before
    }

    /// The selected unit needs no more orders this combat turn.
    pub fn selected_unit_done(&mut self) {
        if let Some(unit_urn) = self.selected.take() {
            self.units_left_to_move.retain(|&u| u != unit_urn);
        }
    }

    /// Prompt for the selected unit again after everyone else.
    pub fn selected_unit_wait(&mut self) {
        if let Some(unit_urn) = self.selected.take() {
            self.units_left_to_move.retain(|&u| u != unit_urn);
            self.units_left_to_move.push(unit_urn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{CoordinateSystem, MapCoords2D};
    use crate::error::MovementError;
    use crate::types::{CombatSide, UnitStatus};

    fn memory_with_units() -> FogOfWarMemory {
        let mut memory = FogOfWarMemory::new(&CoordinateSystem::default());
        memory.add_unit(MemoryUnit::new(1, "UN001", 1, MapCoords3D::new(5, 5, 0)));
        memory.add_unit(MemoryUnit::new(2, "UN001", 1, MapCoords3D::new(8, 3, 0)));
        memory.add_unit(MemoryUnit::new(3, "UN001", 1, MapCoords3D::new(5, 5, 0)));
        memory.add_unit(MemoryUnit::new(4, "UN001", 1, MapCoords3D::new(9, 9, 1)));
        memory
    }

    fn built(memory: &FogOfWarMemory, turn_number: u32) -> OverlandMovementQueue {
        let mut queue = OverlandMovementQueue::new();
        queue.build_units_left_to_move_list(memory, 1, turn_number, &[]);
        queue
    }

    #[test]
    fn test_build_filters_units() {
        let mut memory = memory_with_units();
        memory.add_unit(MemoryUnit::new(10, "UN001", 2, MapCoords3D::new(5, 5, 0)));
        let mut dead = MemoryUnit::new(11, "UN001", 1, MapCoords3D::new(5, 5, 0));
        dead.status = UnitStatus::Dead;
        memory.add_unit(dead);
        let mut tired = MemoryUnit::new(12, "UN001", 1, MapCoords3D::new(5, 5, 0));
        tired.double_overland_moves_left = 0;
        memory.add_unit(tired);
        let mut patrolling = MemoryUnit::new(13, "UN001", 1, MapCoords3D::new(5, 5, 0));
        patrolling.special_order = Some(UnitSpecialOrder::Patrol);
        memory.add_unit(patrolling);
        let mut banished = MemoryUnit::new(14, "UN001", 1, MapCoords3D::new(5, 5, 0));
        banished.unit_location = None;
        memory.add_unit(banished);

        let pending = [PendingMovement::new(
            vec![2],
            MapCoords3D::new(8, 3, 0),
            MapCoords3D::new(9, 3, 0),
        )];
        let mut queue = OverlandMovementQueue::new();
        queue.build_units_left_to_move_list(&memory, 1, 1, &pending);

        assert_eq!(queue.units_left_to_move(), &[1, 3, 4]);
    }

    #[test]
    fn test_even_turns_reversed() {
        let memory = memory_with_units();
        assert_eq!(built(&memory, 3).units_left_to_move(), &[1, 2, 3, 4]);
        assert_eq!(built(&memory, 4).units_left_to_move(), &[4, 3, 2, 1]);
    }

    #[test]
    fn test_select_next_takes_whole_cell() {
        let memory = memory_with_units();
        let mut queue = built(&memory, 1);
        assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[1, 3]);

        queue.selected_units_done();
        assert_eq!(queue.units_left_to_move(), &[2, 4]);
        assert!(queue.selected().is_empty());
        assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[2]);
    }

    #[test]
    fn test_wait_moves_to_tail() {
        let memory = memory_with_units();
        let mut queue = built(&memory, 1);
        queue.select_next_unit_to_move(&memory).unwrap();
        queue.selected_units_wait();
        assert_eq!(queue.units_left_to_move(), &[2, 4, 1, 3]);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_patrol_sets_standing_order() {
        let mut memory = memory_with_units();
        let mut queue = built(&memory, 1);
        queue.select_next_unit_to_move(&memory).unwrap();
        queue.selected_units_patrol(&mut memory).unwrap();

        assert_eq!(queue.units_left_to_move(), &[2, 4]);
        assert_eq!(
            memory.find_unit(3).unwrap().special_order,
            Some(UnitSpecialOrder::Patrol)
        );

        // Still patrolling next turn
        assert_eq!(built(&memory, 2).units_left_to_move(), &[4, 2]);
    }

    #[test]
    fn test_remove_and_empty() {
        let memory = memory_with_units();
        let mut queue = built(&memory, 1);
        queue.select_next_unit_to_move(&memory).unwrap();

        assert!(queue.remove_unit_from_left_to_move(1));
        assert!(!queue.remove_unit_from_left_to_move(1));
        assert_eq!(queue.selected(), &[3]);

        for urn in [2, 3, 4] {
            queue.remove_unit_from_left_to_move(urn);
        }
        assert!(queue.is_empty());
        assert!(queue.select_next_unit_to_move(&memory).unwrap().is_empty());
    }

    #[test]
    fn test_select_unknown_unit_fails() {
        let memory = memory_with_units();
        let mut queue = built(&memory, 1);
        let empty = FogOfWarMemory::new(&CoordinateSystem::default());
        assert!(matches!(
            queue.select_next_unit_to_move(&empty),
            Err(MovementError::UnitNotFound(1))
        ));
    }

    #[test]
    fn test_select_skips_units_lost_since_build() {
        let mut memory = memory_with_units();
        memory.add_unit(MemoryUnit::new(5, "UN001", 1, MapCoords3D::new(5, 5, 0)));
        let mut queue = built(&memory, 1);
        assert_eq!(queue.units_left_to_move(), &[1, 2, 3, 4, 5]);

        // Unit 2 is gone from memory entirely, unit 3 died in the head's cell
        memory.units.retain(|u| u.unit_urn != 2);
        memory.find_unit_mut(3).unwrap().status = UnitStatus::Dead;

        assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[1, 5]);
    }

    fn combat_unit(urn: UnitUrn, owner: PlayerId, location: MapCoords3D, moves: i32) -> MemoryUnit {
        let mut unit = MemoryUnit::new(urn, "UN001", owner, location);
        unit.combat_location = Some(location);
        unit.combat_position = Some(MapCoords2D::new(4, 10));
        unit.combat_side = Some(CombatSide::Attacker);
        unit.double_combat_moves_left = moves;
        unit
    }

    #[test]
    fn test_combat_queue() {
        let here = MapCoords3D::new(20, 10, 0);
        let elsewhere = MapCoords3D::new(30, 10, 0);
        let mut memory = FogOfWarMemory::new(&CoordinateSystem::default());
        memory.add_unit(combat_unit(1, 1, here, 2));
        memory.add_unit(combat_unit(2, 1, here, 0));
        memory.add_unit(combat_unit(3, 2, here, 2));
        memory.add_unit(combat_unit(4, 1, elsewhere, 2));
        memory.add_unit(combat_unit(5, 1, here, 4));
        let mut unplaced = combat_unit(6, 1, here, 2);
        unplaced.combat_position = None;
        memory.add_unit(unplaced);

        let mut queue = CombatMovementQueue::new(&memory, 1, here);
        assert_eq!(queue.units_left_to_move(), &[1, 5]);

        assert_eq!(queue.select_next_unit_to_move(), CombatSelection::Unit(1));
        queue.selected_unit_wait();
        assert_eq!(queue.units_left_to_move(), &[5, 1]);

        assert_eq!(queue.select_next_unit_to_move(), CombatSelection::Unit(5));
        queue.selected_unit_done();
        assert!(queue.remove_unit_from_left_to_move(1));

        assert_eq!(queue.select_next_unit_to_move(), CombatSelection::EndCombatTurn);
        assert_eq!(queue.selected(), None);
    }
}
