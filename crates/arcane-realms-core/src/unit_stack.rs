//! Unit stacks: groups of units moving together as one order.

use crate::database::Database;
use crate::error::Result;
use crate::fog_memory::{FogOfWarMemory, MemoryUnit};
use crate::player::PlayerRoster;
use crate::types::{PlayerId, UnitSkillId, UnitUrn};
use std::collections::HashSet;

/// A remembered unit together with the database details movement needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedUnit {
    pub unit: MemoryUnit,
    pub transport_capacity: u32,
    pub skills: HashSet<UnitSkillId>,
}

impl ExpandedUnit {
    /// Look up the unit's definition and owner.
    pub fn new(unit: &MemoryUnit, players: &PlayerRoster, db: &Database) -> Result<Self> {
        players.find(unit.owning_player_id)?;
        let definition = db.find_unit(&unit.unit_id)?;
        Ok(Self {
            unit: unit.clone(),
            transport_capacity: definition.transport_capacity,
            skills: definition.skills.iter().cloned().collect(),
        })
    }

    pub fn unit_urn(&self) -> UnitUrn {
        self.unit.unit_urn
    }

    pub fn owning_player_id(&self) -> PlayerId {
        self.unit.owning_player_id
    }

    pub fn is_transport(&self) -> bool {
        self.transport_capacity > 0
    }
}

/// Units selected to move together.
///
/// When every non-transport unit fits inside the transports in the stack,
/// the stack is "transported": the transports do the moving and the rest
/// ride along. Otherwise nobody is treated as embarked and every unit moves
/// under its own power.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitStack {
    /// Units moving under their own power, or passengers when transported.
    units: Vec<ExpandedUnit>,
    /// Non-empty only when the stack is transported.
    transports: Vec<ExpandedUnit>,
}

impl UnitStack {
    /// Split `units` into passengers and transports if they all fit.
    pub fn new(units: Vec<ExpandedUnit>) -> Self {
        let (transports, others): (Vec<_>, Vec<_>) =
            units.iter().cloned().partition(ExpandedUnit::is_transport);

        let capacity: u32 = transports.iter().map(|t| t.transport_capacity).sum();
        if !transports.is_empty() && capacity as usize >= others.len() {
            Self {
                units: others,
                transports,
            }
        } else {
            Self {
                units,
                transports: Vec::new(),
            }
        }
    }

    /// Build a stack from unit urns in a player's memory.
    pub fn from_memory(
        unit_urns: &[UnitUrn],
        memory: &FogOfWarMemory,
        players: &PlayerRoster,
        db: &Database,
    ) -> Result<Self> {
        let units = unit_urns
            .iter()
            .map(|&urn| ExpandedUnit::new(memory.find_unit(urn)?, players, db))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(units))
    }

    /// Whether the transports carry everyone else.
    pub fn is_transported(&self) -> bool {
        !self.transports.is_empty()
    }

    pub fn units(&self) -> &[ExpandedUnit] {
        &self.units
    }

    pub fn transports(&self) -> &[ExpandedUnit] {
        &self.transports
    }

    /// The units whose movement rates decide where the stack can go.
    pub fn movement_units(&self) -> &[ExpandedUnit] {
        if self.is_transported() {
            &self.transports
        } else {
            &self.units
        }
    }

    /// Every unit in the stack, passengers first.
    pub fn all_units(&self) -> impl Iterator<Item = &ExpandedUnit> {
        self.units.iter().chain(self.transports.iter())
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, unit_urn: UnitUrn) -> bool {
        self.all_units().any(|u| u.unit_urn() == unit_urn)
    }

    /// Union of the skills of every unit in the stack.
    pub fn stack_skills(&self) -> HashSet<UnitSkillId> {
        self.all_units()
            .flat_map(|u| u.skills.iter().cloned())
            .collect()
    }

    /// Overland moves the stack has left, limited by its slowest unit.
    pub fn double_overland_moves_left(&self) -> i32 {
        self.movement_units()
            .iter()
            .map(|u| u.unit.double_overland_moves_left)
            .min()
            .unwrap_or(0)
    }
}
