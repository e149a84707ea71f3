//! Turn queue tests for Arcane Realms.
//!
//! Plays through whole turns of handing out orders, covering:
//! - Prompt order flipping every other turn
//! - Stacks selected together
//! - Wait, done and patrol
//! - Fog of war updates between turns
//! - Ending a combat turn once nobody is left to move

use arcane_realms_core::{
    CombatMovementQueue, CombatSelection, CombatSide, CoordinateSystem, FogOfWarMemory, MapArea3D,
    MapCoords2D, MapCoords3D, MemoryUnit, OverlandMovementQueue, PendingMovement,
    UnitSpecialOrder,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_memory() -> FogOfWarMemory {
    FogOfWarMemory::filled(&CoordinateSystem::default(), "TT01")
}

/// Memory holding `count` units of player 1, each in its own cell.
fn create_memory_with_army(count: u64) -> FogOfWarMemory {
    let mut memory = create_memory();
    for urn in 1..=count {
        memory.add_unit(MemoryUnit::new(
            urn,
            "UN001",
            1,
            MapCoords3D::new(urn as i32 * 2, 10, 0),
        ));
    }
    memory
}

fn build(memory: &FogOfWarMemory, turn_number: u32) -> OverlandMovementQueue {
    let mut queue = OverlandMovementQueue::new();
    queue.build_units_left_to_move_list(memory, 1, turn_number, &[]);
    queue
}

// =============================================================================
// Building The List
// =============================================================================

#[test]
fn test_even_turn_is_reverse_of_odd_turn() {
    for count in [0, 1, 2, 7, 20] {
        let memory = create_memory_with_army(count);
        for turn in [1, 3, 41] {
            let odd = build(&memory, turn);
            let even = build(&memory, turn + 1);
            let mut reversed = odd.units_left_to_move().to_vec();
            reversed.reverse();
            assert_eq!(even.units_left_to_move(), reversed.as_slice());
        }
    }
}

#[test]
fn test_pending_moves_not_prompted() {
    let memory = create_memory_with_army(4);
    let pending = [PendingMovement::new(
        vec![2, 3],
        MapCoords3D::new(4, 10, 0),
        MapCoords3D::new(5, 10, 0),
    )];
    let mut queue = OverlandMovementQueue::new();
    queue.build_units_left_to_move_list(&memory, 1, 5, &pending);
    assert_eq!(queue.units_left_to_move(), &[1, 4]);
}

#[test]
fn test_rebuild_clears_previous_turn() {
    let mut memory = create_memory_with_army(3);
    let mut queue = build(&memory, 1);
    queue.select_next_unit_to_move(&memory).unwrap();
    queue.selected_units_done();

    memory.find_unit_mut(2).unwrap().double_overland_moves_left = 0;
    queue.build_units_left_to_move_list(&memory, 1, 3, &[]);
    assert_eq!(queue.units_left_to_move(), &[1, 3]);
    assert!(queue.selected().is_empty());
}

// =============================================================================
// Handing Out Orders
// =============================================================================

#[test]
fn test_play_through_a_turn() {
    let mut memory = create_memory_with_army(3);
    // Unit 4 shares a cell with unit 2
    memory.add_unit(MemoryUnit::new(4, "UN001", 1, MapCoords3D::new(4, 10, 0)));

    let mut queue = build(&memory, 1);
    assert_eq!(queue.units_left_to_move(), &[1, 2, 3, 4]);

    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[1]);
    queue.selected_units_wait();

    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[2, 4]);
    queue.selected_units_patrol(&mut memory).unwrap();

    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[3]);
    // Given a move order
    assert!(queue.remove_unit_from_left_to_move(3));

    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[1]);
    queue.selected_units_done();

    assert!(queue.is_empty());
    assert!(queue.select_next_unit_to_move(&memory).unwrap().is_empty());

    // Patrolling units stay out of the list next turn
    let next_turn = build(&memory, 2);
    assert_eq!(next_turn.units_left_to_move(), &[3, 1]);
    assert_eq!(
        memory.find_unit(4).unwrap().special_order,
        Some(UnitSpecialOrder::Patrol)
    );
}

#[test]
fn test_units_lost_from_view_between_turns() {
    let sys = CoordinateSystem::default();
    let mut memory = create_memory_with_army(2);
    let enemy_cell = MapCoords3D::new(30, 10, 0);
    memory.add_unit(MemoryUnit::new(9, "UN001", 2, enemy_cell));

    // Our first unit died during the other players' turns
    let mut true_units: Vec<MemoryUnit> = memory.units.clone();
    true_units.retain(|u| u.unit_urn != 1);

    let mut visible: MapArea3D<bool> = MapArea3D::new(&sys);
    visible.set(&enemy_cell, true);
    let true_map = memory.map.clone();
    memory.reconcile(1, &true_map, &true_units, &visible);

    let queue = build(&memory, 1);
    assert_eq!(queue.units_left_to_move(), &[2]);
}

#[test]
fn test_unit_dies_part_way_through_a_turn() {
    let sys = CoordinateSystem::default();
    let mut memory = create_memory_with_army(3);
    let mut queue = build(&memory, 1);
    assert_eq!(queue.units_left_to_move(), &[1, 2, 3]);

    // Unit 3 is killed before it gets its orders
    let mut true_units: Vec<MemoryUnit> = memory.units.clone();
    true_units.retain(|u| u.unit_urn != 3);
    let visible: MapArea3D<bool> = MapArea3D::new(&sys);
    let true_map = memory.map.clone();
    memory.reconcile(1, &true_map, &true_units, &visible);
    assert!(memory.find_unit(3).is_err());

    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[1]);
    queue.selected_units_done();
    assert_eq!(queue.select_next_unit_to_move(&memory).unwrap(), &[2]);
}

// =============================================================================
// Combat
// =============================================================================

#[test]
fn test_combat_turn_ends_when_everyone_has_moved() {
    let combat_location = MapCoords3D::new(12, 12, 1);
    let mut memory = create_memory();
    for urn in 1..=3 {
        let mut unit = MemoryUnit::new(urn, "UN001", 1, combat_location);
        unit.combat_location = Some(combat_location);
        unit.combat_position = Some(MapCoords2D::new(3, urn as i32 + 8));
        unit.combat_side = Some(CombatSide::Defender);
        unit.double_combat_moves_left = 2;
        memory.add_unit(unit);
    }

    let mut queue = CombatMovementQueue::new(&memory, 1, combat_location);
    let mut ordered = Vec::new();
    loop {
        match queue.select_next_unit_to_move() {
            CombatSelection::Unit(urn) => {
                ordered.push(urn);
                queue.selected_unit_done();
            }
            CombatSelection::EndCombatTurn => break,
        }
    }
    assert_eq!(ordered, vec![1, 2, 3]);
    assert!(queue.is_empty());
    assert_eq!(queue.combat_location(), &combat_location);
}

#[test]
fn test_no_combat_units_ends_turn_immediately() {
    let memory = create_memory_with_army(3);
    let mut queue = CombatMovementQueue::new(&memory, 1, MapCoords3D::new(2, 10, 0));
    assert_eq!(queue.select_next_unit_to_move(), CombatSelection::EndCombatTurn);
}
