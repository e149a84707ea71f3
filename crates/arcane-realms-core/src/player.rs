//! Player roster.
//!
//! The movement logic only needs players to resolve unit ownership, so the
//! roster holds the public details every client knows about every player.

use crate::error::{MovementError, Result};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// What kind of participant a player is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    #[default]
    Human,
    Ai,
    /// Monsters guarding lairs, nodes and towers.
    Monsters,
    Raiders,
}

/// Public details of a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    pub kind: PlayerKind,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// All players in a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoster {
    players: Vec<Player>,
}

impl PlayerRoster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn add(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Look up a player, failing if they aren't in the session.
    pub fn find(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(MovementError::PlayerNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
