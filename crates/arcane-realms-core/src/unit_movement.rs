//! Overland movement search.
//!
//! Works out how far a unit stack would have to travel to reach every cell
//! on every plane of the overland map, and which cell it would come from.
//! The result drives highlighting of reachable cells and turns a "move to"
//! click into a concrete path.
//!
//! The search is Dijkstra over a binary heap keyed on cumulative double
//! movement. A cell is recorded tentatively when first reached and only
//! replaced by a strictly shorter arrival; once popped off the frontier it
//! is final. Impassable cells are final as soon as they are seen, since
//! whether a cell can be entered never depends on where the stack came from.
//! Cells that would start a known fight are recorded but never expanded: the
//! stack has to stop there.

use crate::coords::MapCoords3D;
use crate::database::Database;
use crate::error::Result;
use crate::fog_memory::FogOfWarMemory;
use crate::map_area::MapArea3D;
use crate::movement_rules::{
    calculate_cell_transport_capacity, unit_stack_movement_rates,
    will_moving_here_result_in_an_attack_that_we_know_about, MovementContext, MovementRates,
};
use crate::player::PlayerRoster;
use crate::settings::OverlandMapSettings;
use crate::types::PlayerId;
use crate::unit_stack::UnitStack;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// How a stack got into a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlandMovementType {
    /// The starting cell.
    #[default]
    None,
    /// One step in a compass direction.
    Adjacent,
    /// Straight to a non-adjacent cell, e.g. across planes at a tower.
    Jump,
}

/// Best known way of reaching a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlandMovementCell {
    pub moved_from: Option<MapCoords3D>,
    pub movement_type: OverlandMovementType,
    /// Direction 1..=8 for adjacent moves, 0 otherwise.
    pub direction: i32,
    /// Total cost from the start, in double movement points.
    pub double_movement_distance: i32,
    /// Cost of the final step into this cell.
    pub double_movement_to_enter_tile: i32,
    /// Entering this cell starts a fight, so the stack stops here.
    pub triggers_attack: bool,
}

impl OverlandMovementCell {
    /// Whether a stack with `double_moves_left` can get here this turn.
    ///
    /// A stack with any movement left may always take one more step, so the
    /// cell is reachable if the stack still has moves on arriving next door.
    pub fn can_move_to_in_one_turn(&self, double_moves_left: i32) -> bool {
        self.double_movement_distance - self.double_movement_to_enter_tile < double_moves_left
    }
}

/// What the search knows about one cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementCellState {
    #[default]
    Unvisited,
    /// Reached, but a shorter route may still turn up.
    Tentative(OverlandMovementCell),
    /// Shortest route confirmed.
    Finalized(OverlandMovementCell),
    /// The stack can never enter this cell.
    CannotMoveHere,
}

impl MovementCellState {
    /// The recorded movement, if the cell has been reached.
    pub fn cell(&self) -> Option<&OverlandMovementCell> {
        match self {
            MovementCellState::Tentative(cell) | MovementCellState::Finalized(cell) => Some(cell),
            _ => None,
        }
    }

    /// Whether this cell can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            MovementCellState::Finalized(_) | MovementCellState::CannotMoveHere
        )
    }
}

/// Entry in the frontier heap.
#[derive(Clone, Debug, PartialEq, Eq)]
struct FrontierEntry {
    coords: MapCoords3D,
    double_movement_distance: i32,
    /// Insertion order, so equal distances come out first in first out.
    sequence: u64,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .double_movement_distance
            .cmp(&self.double_movement_distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cells left to check, cheapest first.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coords: MapCoords3D, double_movement_distance: i32) {
        self.heap.push(FrontierEntry {
            coords,
            double_movement_distance,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
    }

    /// Take the cheapest cell and the distance it was queued with.
    pub fn pop(&mut self) -> Option<(MapCoords3D, i32)> {
        self.heap
            .pop()
            .map(|e| (e.coords, e.double_movement_distance))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Finished search results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementDistances {
    pub start: MapCoords3D,
    pub moves: MapArea3D<MovementCellState>,
}

impl MovementDistances {
    /// Movement recorded for `coords`, if the stack can get there at all.
    pub fn cell(&self, coords: &MapCoords3D) -> Option<&OverlandMovementCell> {
        self.moves.get(coords).and_then(MovementCellState::cell)
    }

    /// Whether the stack can never enter `coords`.
    pub fn cannot_move_here(&self, coords: &MapCoords3D) -> bool {
        matches!(self.moves.get(coords), Some(MovementCellState::CannotMoveHere))
    }

    /// Number of cells the stack can reach, including the start.
    pub fn reachable_count(&self) -> usize {
        self.moves.iter().filter(|(_, s)| s.cell().is_some()).count()
    }

    /// Whether a stack with `double_moves_left` can reach `coords` this turn.
    pub fn can_move_to_in_one_turn(&self, coords: &MapCoords3D, double_moves_left: i32) -> bool {
        self.cell(coords)
            .is_some_and(|c| c.can_move_to_in_one_turn(double_moves_left))
    }

    /// Cells walked through from the start to `to`, both included.
    ///
    /// Returns `None` if `to` can't be reached.
    pub fn extract_path(&self, to: &MapCoords3D) -> Option<Vec<MapCoords3D>> {
        let mut path = vec![*to];
        let mut current = self.cell(to)?;
        let limit = self.moves.iter().count();

        while let Some(from) = current.moved_from {
            path.push(from);
            current = self.cell(&from)?;
            // Guard against a corrupt grid looping forever
            if path.len() > limit {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    /// First cell to step into when heading for `to`.
    pub fn next_step_towards(&self, to: &MapCoords3D) -> Option<MapCoords3D> {
        self.extract_path(to).and_then(|path| path.get(1).copied())
    }
}

/// State of one movement search in progress.
pub struct MovementSearch<'a> {
    context: MovementContext<'a>,
    moves: MapArea3D<MovementCellState>,
    frontier: Frontier,
}

impl<'a> MovementSearch<'a> {
    /// Start a search with every cell unvisited and an empty frontier.
    pub fn new(context: MovementContext<'a>) -> Self {
        Self {
            moves: MapArea3D::new(&context.settings.coordinate_system),
            frontier: Frontier::new(),
            context,
        }
    }

    pub fn moves(&self) -> &MapArea3D<MovementCellState> {
        &self.moves
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Put the stack's starting cell in the grid and on the frontier.
    pub fn set_start(&mut self, start: &MapCoords3D) {
        self.moves.set(
            start,
            MovementCellState::Tentative(OverlandMovementCell {
                moved_from: None,
                movement_type: OverlandMovementType::None,
                direction: 0,
                double_movement_distance: 0,
                double_movement_to_enter_tile: 0,
                triggers_attack: false,
            }),
        );
        self.frontier.push(*start, 0);
    }

    /// Consider moving from `from`, already reached at
    /// `from_double_distance`, into `to`.
    ///
    /// Final cells are left alone. A cell the stack can't enter becomes
    /// [`MovementCellState::CannotMoveHere`] and isn't queued. Otherwise the
    /// move is recorded unless an equal or shorter route is already known,
    /// and the cell is queued for expansion unless entering it starts a
    /// known fight.
    pub fn consider_possible_overland_move(
        &mut self,
        from: &MapCoords3D,
        movement_type: OverlandMovementType,
        direction: i32,
        to: &MapCoords3D,
        from_double_distance: i32,
    ) -> Result<()> {
        let existing = match self.moves.get(to) {
            None => return Ok(()),
            Some(state) if state.is_final() => return Ok(()),
            Some(state) => state.cell().map(|c| c.double_movement_distance),
        };

        let Some(double_movement_to_enter_tile) =
            self.context.calculate_double_movement_to_enter_tile(to)?
        else {
            self.moves.set(to, MovementCellState::CannotMoveHere);
            return Ok(());
        };

        let double_movement_distance = from_double_distance + double_movement_to_enter_tile;
        if existing.is_some_and(|d| d <= double_movement_distance) {
            return Ok(());
        }

        let triggers_attack = will_moving_here_result_in_an_attack_that_we_know_about(
            to,
            self.context.player_id,
            self.context.memory,
        );

        self.moves.set(
            to,
            MovementCellState::Tentative(OverlandMovementCell {
                moved_from: Some(*from),
                movement_type,
                direction,
                double_movement_distance,
                double_movement_to_enter_tile,
                triggers_attack,
            }),
        );

        if !triggers_attack {
            self.frontier.push(*to, double_movement_distance);
        }
        Ok(())
    }

    /// Expand one frontier cell. Returns false once the frontier is empty.
    pub fn process_next(&mut self) -> Result<bool> {
        let Some((coords, distance)) = self.frontier.pop() else {
            return Ok(false);
        };

        // Skip entries superseded by a shorter route, or already expanded
        let cell = match self.moves.get(&coords) {
            Some(MovementCellState::Tentative(cell)) if cell.double_movement_distance == distance => {
                cell.clone()
            }
            _ => return Ok(true),
        };
        self.moves.set(&coords, MovementCellState::Finalized(cell));

        let settings = self.context.settings;
        let system = &settings.coordinate_system;
        for direction in 1..=crate::coords::DIRECTION_COUNT {
            let mut to = coords;
            if system.move_coordinates(&mut to, direction) {
                self.consider_possible_overland_move(
                    &coords,
                    OverlandMovementType::Adjacent,
                    direction,
                    &to,
                    distance,
                )?;
            }
        }

        if self.is_tower(&coords)? {
            for plane in 0..system.depth {
                if plane != coords.z {
                    let to = MapCoords3D::new(coords.x, coords.y, plane);
                    self.consider_possible_overland_move(
                        &coords,
                        OverlandMovementType::Jump,
                        0,
                        &to,
                        distance,
                    )?;
                }
            }
        }

        Ok(true)
    }

    /// Whether a remembered tower of wizardry stands at `coords`.
    fn is_tower(&self, coords: &MapCoords3D) -> Result<bool> {
        let feature = self
            .context
            .memory
            .cell(coords)
            .and_then(|c| c.map_feature_id());
        match feature {
            Some(id) => Ok(self.context.db.find_map_feature(id)?.tower_of_wizardry),
            None => Ok(false),
        }
    }

    /// Run until the frontier is empty and hand back the grid.
    ///
    /// Cells left tentative are attack cells, which are never expanded;
    /// nothing can improve on them any more so they become final too.
    pub fn run(mut self) -> Result<MapArea3D<MovementCellState>> {
        while self.process_next()? {}

        let tentative: Vec<MapCoords3D> = self
            .moves
            .iter()
            .filter(|(_, s)| matches!(s, MovementCellState::Tentative(_)))
            .map(|(c, _)| c)
            .collect();
        for coords in tentative {
            if let Some(state) = self.moves.get_mut(&coords) {
                if let MovementCellState::Tentative(cell) = std::mem::take(state) {
                    *state = MovementCellState::Finalized(cell);
                }
            }
        }

        Ok(self.moves)
    }
}

/// Work out how far `stack` must travel from `start` to reach every cell.
pub fn calculate_overland_movement_distances(
    start: &MapCoords3D,
    player_id: PlayerId,
    stack: &UnitStack,
    memory: &FogOfWarMemory,
    players: &PlayerRoster,
    settings: &OverlandMapSettings,
    db: &Database,
) -> Result<MovementDistances> {
    let movement_rates: MovementRates = unit_stack_movement_rates(stack, db);
    let cell_transport_capacity = calculate_cell_transport_capacity(
        stack,
        player_id,
        memory,
        players,
        &settings.coordinate_system,
        db,
    )?;

    tracing::debug!(
        %start,
        player_id,
        units = stack.len(),
        transported = stack.is_transported(),
        "Calculating overland movement distances"
    );

    let context = MovementContext {
        stack,
        player_id,
        movement_rates: &movement_rates,
        cell_transport_capacity: cell_transport_capacity.as_ref(),
        memory,
        settings,
        db,
    };

    let mut search = MovementSearch::new(context);
    search.set_start(start);
    let moves = search.run()?;

    let distances = MovementDistances {
        start: *start,
        moves,
    };
    tracing::debug!(
        reachable = distances.reachable_count(),
        "Overland movement distances calculated"
    );
    Ok(distances)
}
