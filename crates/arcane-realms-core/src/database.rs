//! Database of tile types, map features, unit definitions and movement rules.
//!
//! The database is static game content, normally loaded from JSON. Every
//! lookup by id returns [`MovementError::RecordNotFound`] when the id is
//! missing, since that means the content itself is broken.

use crate::error::{MovementError, Result};
use crate::types::{MapFeatureId, TileTypeId, UnitId, UnitSkillId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A kind of terrain, e.g. grassland, ocean or mountains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    pub id: TileTypeId,
    /// `Some(true)` for land, `Some(false)` for water, `None` if neither
    /// applies (e.g. special tiles that zone calculations should ignore).
    #[serde(default)]
    pub land: Option<bool>,
}

impl TileType {
    pub fn new(id: impl Into<TileTypeId>, land: Option<bool>) -> Self {
        Self {
            id: id.into(),
            land,
        }
    }

    /// Whether this is explicitly water.
    pub fn is_water(&self) -> bool {
        self.land == Some(false)
    }
}

/// Something standing on a tile, e.g. a lair or a tower.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFeature {
    pub id: MapFeatureId,
    /// Towers exist on every plane at once, so units can step across planes.
    #[serde(default)]
    pub tower_of_wizardry: bool,
}

impl MapFeature {
    pub fn new(id: impl Into<MapFeatureId>, tower_of_wizardry: bool) -> Self {
        Self {
            id: id.into(),
            tower_of_wizardry,
        }
    }
}

/// Static definition of a kind of unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub id: UnitId,
    /// How many other units this unit can carry; 0 for non-transports.
    #[serde(default)]
    pub transport_capacity: u32,
    /// Skills every unit of this type has, including movement skills.
    #[serde(default)]
    pub skills: Vec<UnitSkillId>,
}

impl UnitDefinition {
    pub fn new(id: impl Into<UnitId>, transport_capacity: u32, skills: &[&str]) -> Self {
        Self {
            id: id.into(),
            transport_capacity,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.transport_capacity > 0
    }
}

/// One row of the movement rate table.
///
/// Rules are checked in order; the first one whose conditions all hold
/// gives the cost. `None` conditions match anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRateRule {
    /// Skill the moving unit must have.
    #[serde(default)]
    pub unit_skill_id: Option<UnitSkillId>,
    /// Tile type being entered.
    #[serde(default)]
    pub tile_type_id: Option<TileTypeId>,
    /// Skill some unit in the moving stack must have, e.g. pathfinding.
    #[serde(default)]
    pub unit_stack_skill_id: Option<UnitSkillId>,
    /// Cost in double movement points.
    pub double_movement: i32,
}

impl MovementRateRule {
    pub fn new(unit_skill_id: Option<&str>, tile_type_id: Option<&str>, double_movement: i32) -> Self {
        Self {
            unit_skill_id: unit_skill_id.map(str::to_string),
            tile_type_id: tile_type_id.map(str::to_string),
            unit_stack_skill_id: None,
            double_movement,
        }
    }

    /// Only applies when some unit in the stack has `skill`.
    pub fn with_stack_skill(mut self, skill: &str) -> Self {
        self.unit_stack_skill_id = Some(skill.to_string());
        self
    }

    fn matches(
        &self,
        unit_skills: &HashSet<UnitSkillId>,
        stack_skills: &HashSet<UnitSkillId>,
        tile_type_id: &str,
    ) -> bool {
        self.unit_skill_id.as_ref().map_or(true, |s| unit_skills.contains(s))
            && self.tile_type_id.as_deref().map_or(true, |t| t == tile_type_id)
            && self
                .unit_stack_skill_id
                .as_ref()
                .map_or(true, |s| stack_skills.contains(s))
    }
}

/// All static content the movement and zone logic needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tile_types: Vec<TileType>,
    #[serde(default)]
    pub map_features: Vec<MapFeature>,
    #[serde(default)]
    pub units: Vec<UnitDefinition>,
    #[serde(default)]
    pub movement_rate_rules: Vec<MovementRateRule>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn find_tile_type(&self, id: &str) -> Result<&TileType> {
        self.tile_types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| MovementError::record_not_found("TileType", id))
    }

    pub fn find_map_feature(&self, id: &str) -> Result<&MapFeature> {
        self.map_features
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| MovementError::record_not_found("MapFeature", id))
    }

    pub fn find_unit(&self, id: &str) -> Result<&UnitDefinition> {
        self.units
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| MovementError::record_not_found("Unit", id))
    }

    /// Cost for a unit with `unit_skills`, moving in a stack with
    /// `stack_skills`, to enter `tile_type_id`.
    ///
    /// Returns `None` if no rule lets the unit in at all.
    pub fn double_movement_to_enter_tile_type(
        &self,
        unit_skills: &HashSet<UnitSkillId>,
        stack_skills: &HashSet<UnitSkillId>,
        tile_type_id: &str,
    ) -> Option<i32> {
        self.movement_rate_rules
            .iter()
            .find(|rule| rule.matches(unit_skills, stack_skills, tile_type_id))
            .map(|rule| rule.double_movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> HashSet<UnitSkillId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn test_db() -> Database {
        let mut db = Database::new();
        db.tile_types.push(TileType::new("TT01", Some(true)));
        db.tile_types.push(TileType::new("TT02", Some(false)));
        db.movement_rate_rules
            .push(MovementRateRule::new(Some("US_WALK"), Some("TT01"), 4).with_stack_skill("US_PATH"));
        db.movement_rate_rules
            .push(MovementRateRule::new(Some("US_FLY"), None, 2));
        db.movement_rate_rules
            .push(MovementRateRule::new(Some("US_WALK"), Some("TT01"), 6));
        db
    }

    #[test]
    fn test_find_tile_type() {
        let db = test_db();
        assert!(db.find_tile_type("TT01").is_ok());
        let err = db.find_tile_type("TT99").unwrap_err();
        assert!(matches!(err, MovementError::RecordNotFound { kind: "TileType", .. }));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let db = test_db();
        let walker = skills(&["US_WALK"]);
        assert_eq!(
            db.double_movement_to_enter_tile_type(&walker, &skills(&["US_WALK"]), "TT01"),
            Some(6)
        );
        assert_eq!(
            db.double_movement_to_enter_tile_type(&walker, &skills(&["US_WALK", "US_PATH"]), "TT01"),
            Some(4)
        );
    }

    #[test]
    fn test_no_rule_means_cannot_enter() {
        let db = test_db();
        let walker = skills(&["US_WALK"]);
        assert_eq!(db.double_movement_to_enter_tile_type(&walker, &walker, "TT02"), None);
    }

    #[test]
    fn test_wildcard_tile_type() {
        let db = test_db();
        let flyer = skills(&["US_FLY"]);
        assert_eq!(db.double_movement_to_enter_tile_type(&flyer, &flyer, "TT02"), Some(2));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "tile_types": [{ "id": "TT01", "land": true }, { "id": "TT99" }],
            "map_features": [{ "id": "MF01", "tower_of_wizardry": true }],
            "units": [{ "id": "UN001", "skills": ["US_WALK"] }],
            "movement_rate_rules": [{ "unit_skill_id": "US_WALK", "double_movement": 2 }]
        }"#;
        let db = Database::from_json(json).unwrap();
        assert_eq!(db.find_tile_type("TT99").unwrap().land, None);
        assert!(db.find_map_feature("MF01").unwrap().tower_of_wizardry);
        assert_eq!(db.find_unit("UN001").unwrap().transport_capacity, 0);
        assert_eq!(db.movement_rate_rules[0].tile_type_id, None);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(Database::from_json("{"), Err(MovementError::Json(_))));
    }
}
