//! Overland map settings for a game session.

use crate::coords::{AddressingMode, CoordinateSystem, MapCoords2D};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Configuration the movement and zone logic reads from the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlandMapSettings {
    /// Size and wrapping of the overland map.
    pub coordinate_system: CoordinateSystem,
    /// Most units one player may have in a single cell.
    pub max_units_per_map_cell: usize,
    /// Cells around a city that belong to it, relative to the city.
    pub city_radius: Vec<MapCoords2D>,
    /// Cities this close together are joined up into one zone.
    pub zone_separation: i32,
}

impl OverlandMapSettings {
    /// Create default settings for the given map.
    pub fn new(coordinate_system: CoordinateSystem) -> Self {
        Self {
            coordinate_system,
            max_units_per_map_cell: 9,
            city_radius: default_city_radius(),
            zone_separation: 6,
        }
    }

    /// Load settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        let sys = &self.coordinate_system;
        if sys.width <= 0 || sys.height <= 0 || sys.depth <= 0 {
            return Err(SettingsError::EmptyMap);
        }
        if sys.addressing_mode != AddressingMode::Square {
            return Err(SettingsError::OverlandMapMustBeSquare);
        }
        if self.max_units_per_map_cell == 0 {
            return Err(SettingsError::NoUnitsPerCell);
        }
        if self.zone_separation < 0 {
            return Err(SettingsError::NegativeZoneSeparation);
        }
        if self.zone_separation * 2 >= sys.width {
            return Err(SettingsError::ZoneSeparationTooLarge);
        }
        Ok(())
    }
}

impl Default for OverlandMapSettings {
    fn default() -> Self {
        Self::new(CoordinateSystem::default())
    }
}

/// The 5x5 square around a city with its four corners cut off.
pub fn default_city_radius() -> Vec<MapCoords2D> {
    let mut radius = Vec::with_capacity(21);
    for dy in -2..=2_i32 {
        for dx in -2..=2_i32 {
            if dx.abs() == 2 && dy.abs() == 2 {
                continue;
            }
            radius.push(MapCoords2D::new(dx, dy));
        }
    }
    radius
}

/// Errors that can occur when validating settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsError {
    EmptyMap,
    OverlandMapMustBeSquare,
    NoUnitsPerCell,
    NegativeZoneSeparation,
    ZoneSeparationTooLarge,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::EmptyMap => write!(f, "Map must have at least one cell"),
            SettingsError::OverlandMapMustBeSquare => {
                write!(f, "Overland map must use square addressing")
            }
            SettingsError::NoUnitsPerCell => write!(f, "At least one unit must fit in a cell"),
            SettingsError::NegativeZoneSeparation => write!(f, "Zone separation cannot be negative"),
            SettingsError::ZoneSeparationTooLarge => {
                write!(f, "Zone separation must be less than half the map width")
            }
        }
    }
}

impl std::error::Error for SettingsError {}
