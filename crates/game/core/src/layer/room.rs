use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use sha2::{Digest, Sha256};

use super::theme::Biome;

/// Identifier of a room within its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomId(pub u16);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {}", self.0)
    }
}

/// One enemy to spawn when an encounter starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemySpawn {
    pub variant: String,
    pub level: u32,
    pub elite: bool,
}

/// Enemies waiting in a combat or boss room.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub spawns: Vec<EnemySpawn>,
    /// Percent applied to every spawned stat (100 = unscaled).
    pub stat_multiplier: u32,
}

/// Payload of a treasure room.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Treasure {
    pub currency: u32,
    pub unlock: Option<String>,
}

/// Damage range of a trap room, already scaled to its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trap {
    pub damage_min: u32,
    pub damage_max: u32,
}

/// What a room holds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomContent {
    Empty,
    Combat(Encounter),
    Treasure(Treasure),
    Shop,
    /// Springs once on entry.
    Trap(Trap),
    Boss(Encounter),
}

impl RoomContent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Combat(_) => "combat",
            Self::Treasure(_) => "treasure",
            Self::Shop => "shop",
            Self::Trap(_) => "trap",
            Self::Boss(_) => "boss",
        }
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        match self {
            Self::Combat(encounter) | Self::Boss(encounter) => Some(encounter),
            _ => None,
        }
    }
}

/// A node of the layer graph. Exits are directed edges.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub id: RoomId,
    pub depth: u32,
    pub content: RoomContent,
    pub exits: Vec<RoomId>,
    /// Set by the run once the room's content has been consumed.
    pub cleared: bool,
}

/// A generated dungeon layer. Room ids are indices into `rooms`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layer {
    pub index: u8,
    pub biome: Biome,
    pub heat: u32,
    pub rooms: Vec<Room>,
    pub entrance: RoomId,
    pub boss: RoomId,
    /// Generation attempts spent on this layer, including the successful one.
    pub attempts: u32,
    /// Built by the simplified fallback generator.
    pub fallback: bool,
}

impl Layer {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(usize::from(id.0))
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(usize::from(id.0))
    }

    pub fn exits(&self, id: RoomId) -> &[RoomId] {
        self.room(id)
            .map(|room| room.exits.as_slice())
            .unwrap_or_default()
    }

    pub fn inbound_count(&self, id: RoomId) -> usize {
        self.rooms
            .iter()
            .filter(|room| room.exits.contains(&id))
            .count()
    }

    /// Rooms reachable from `start` (inclusive) following exits.
    pub fn reachable_from(&self, start: RoomId) -> BTreeSet<RoomId> {
        let mut seen = BTreeSet::new();
        let mut frontier = VecDeque::from([start]);
        while let Some(id) = frontier.pop_front() {
            if self.room(id).is_none() || !seen.insert(id) {
                continue;
            }
            frontier.extend(self.exits(id).iter().copied());
        }
        seen
    }

    pub fn combat_room_count(&self) -> usize {
        self.rooms
            .iter()
            .filter(|room| matches!(room.content, RoomContent::Combat(_)))
            .count()
    }

    /// SHA-256 fingerprint of the layer structure and contents.
    ///
    /// Equal digests mean equal layers; used to check generation determinism.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update([self.index]);
        hasher.update(self.biome.to_string().as_bytes());
        hasher.update(self.heat.to_le_bytes());
        hasher.update(self.entrance.0.to_le_bytes());
        hasher.update(self.boss.0.to_le_bytes());

        for room in &self.rooms {
            hasher.update(room.id.0.to_le_bytes());
            hasher.update(room.depth.to_le_bytes());
            hasher.update(room.content.label().as_bytes());
            match &room.content {
                RoomContent::Combat(encounter) | RoomContent::Boss(encounter) => {
                    hasher.update(encounter.stat_multiplier.to_le_bytes());
                    for spawn in &encounter.spawns {
                        hasher.update(spawn.variant.as_bytes());
                        hasher.update(spawn.level.to_le_bytes());
                        hasher.update([u8::from(spawn.elite)]);
                    }
                }
                RoomContent::Treasure(treasure) => {
                    hasher.update(treasure.currency.to_le_bytes());
                    if let Some(unlock) = &treasure.unlock {
                        hasher.update(unlock.as_bytes());
                    }
                }
                RoomContent::Trap(trap) => {
                    hasher.update(trap.damage_min.to_le_bytes());
                    hasher.update(trap.damage_max.to_le_bytes());
                }
                RoomContent::Empty | RoomContent::Shop => {}
            }
            for exit in &room.exits {
                hasher.update(exit.0.to_le_bytes());
            }
        }

        hasher.finalize().into()
    }
}
