//! Arcane Realms Core Library
//!
//! Overland movement for a fantasy strategy game played on a grid of two
//! planes that wraps left to right. This crate works out how far a stack of
//! units can travel, keeps each player's fog of war memory of the world,
//! calculates the AI's friendly zone around its cities, and tracks which
//! units still need orders each turn.
//!
//! # Design Principles
//!
//! - **No UI or network dependencies**: This crate is purely game logic
//! - **Player's view only**: Everything is calculated from what the player
//!   remembers, never from the true state of the world
//! - **Double movement points**: One move is worth 2, so half moves stay
//!   integers
//! - **Serializable**: All state can be saved/loaded via serde

// Core modules
pub mod coords;
pub mod error;
pub mod map_area;
pub mod types;

// Game data
pub mod database;
pub mod player;
pub mod settings;

// Fog of war
pub mod fog_memory;

// Units and movement
pub mod movement_rules;
pub mod unit_movement;
pub mod unit_stack;

// AI
pub mod zone;

// Turn handling
pub mod turn_queue;

// Re-exports for convenience
pub use coords::{AddressingMode, CoordinateSystem, MapCoords2D, MapCoords3D, DIRECTION_COUNT};
pub use database::{Database, MapFeature, MovementRateRule, TileType, UnitDefinition};
pub use error::{MovementError, Result};
pub use fog_memory::{
    CityData, FogOfWarChanges, FogOfWarMemory, FogOfWarState, MemoryGridCell, MemoryUnit,
    TerrainData,
};
pub use map_area::{MapArea2D, MapArea3D};
pub use movement_rules::{
    calculate_cell_transport_capacity, calculate_double_movement_rates_for_unit_stack,
    unit_stack_movement_rates, will_moving_here_result_in_an_attack_that_we_know_about,
    MovementContext, MovementRates, DOUBLE_MOVEMENT_TO_BOARD_TRANSPORT,
};
pub use player::{Player, PlayerKind, PlayerRoster};
pub use settings::{OverlandMapSettings, SettingsError};
pub use turn_queue::{CombatMovementQueue, CombatSelection, OverlandMovementQueue, PendingMovement};
pub use types::*;
pub use unit_movement::{
    calculate_overland_movement_distances, MovementCellState, MovementDistances, MovementSearch,
    OverlandMovementCell, OverlandMovementType,
};
pub use unit_stack::{ExpandedUnit, UnitStack};
pub use zone::{calculate_friendly_zone, calculate_friendly_zone_with_city_radius};
