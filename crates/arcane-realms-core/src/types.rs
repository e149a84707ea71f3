//! Core type aliases and small enums used throughout the crate.

use serde::{Deserialize, Serialize};

/// Player identifier. Monsters and raiders use negative ids.
pub type PlayerId = i32;

/// Unique identifier for a unit instance.
pub type UnitUrn = u64;

/// Tile type identifier in the database, e.g. `"TT01"`.
pub type TileTypeId = String;

/// Unit definition identifier in the database, e.g. `"UN001"`.
pub type UnitId = String;

/// Unit skill identifier in the database, e.g. `"US001"`.
pub type UnitSkillId = String;

/// Map feature identifier in the database, e.g. `"MF01"`.
pub type MapFeatureId = String;

/// Whether a unit is still on the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Alive,
    Dead,
}

/// Standing orders that keep a unit out of the "left to move" list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitSpecialOrder {
    /// Stay put every turn until cancelled.
    Patrol,
    /// Sentry until an enemy comes into view.
    Sentry,
    /// Building a road, melding with a node, etc.
    BuildRoad,
    Meld,
    Purify,
    /// Settling a new city.
    BuildCity,
    /// The unit is being dismissed.
    Dismiss,
}

impl std::fmt::Display for UnitSpecialOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSpecialOrder::Patrol => write!(f, "Patrol"),
            UnitSpecialOrder::Sentry => write!(f, "Sentry"),
            UnitSpecialOrder::BuildRoad => write!(f, "Build Road"),
            UnitSpecialOrder::Meld => write!(f, "Meld"),
            UnitSpecialOrder::Purify => write!(f, "Purify"),
            UnitSpecialOrder::BuildCity => write!(f, "Build City"),
            UnitSpecialOrder::Dismiss => write!(f, "Dismiss"),
        }
    }
}

/// Which side of a combat a unit is fighting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatSide {
    Attacker,
    Defender,
}
