use crate::combat::{AbilityRef, Action};
use crate::rng::{SeedDomain, derive_seed};
use crate::state::{Entity, EntityId, Faction, Roster};

/// An ability choice plus its targets, as chosen by a player or an AI.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSelection {
    pub ability: AbilityRef,
    pub targets: Vec<EntityId>,
}

/// Selection submitted for the player-controlled entity.
pub type PlayerActionSelection = ActionSelection;

impl ActionSelection {
    pub fn basic_attack(target: EntityId) -> Self {
        Self {
            ability: AbilityRef::BasicAttack,
            targets: vec![target],
        }
    }

    pub fn ability(id: impl Into<String>, targets: Vec<EntityId>) -> Self {
        Self {
            ability: AbilityRef::Known(id.into()),
            targets,
        }
    }

    /// Uses a consumable from the actor's inventory.
    pub fn item(id: impl Into<String>, targets: Vec<EntityId>) -> Self {
        Self {
            ability: AbilityRef::Item(id.into()),
            targets,
        }
    }

    pub fn into_action(self, actor: EntityId) -> Action {
        Action {
            actor,
            ability: self.ability,
            targets: self.targets,
        }
    }
}

/// Read-only view of a battle handed to decision makers.
#[derive(Clone, Copy, Debug)]
pub struct BattleView<'a> {
    roster: &'a Roster,
    round: u32,
    seed: u64,
    turn: u32,
}

impl<'a> BattleView<'a> {
    pub(crate) fn new(roster: &'a Roster, round: u32, seed: u64, turn: u32) -> Self {
        Self {
            roster,
            round,
            seed,
            turn,
        }
    }

    pub fn roster(&self) -> &'a Roster {
        self.roster
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn entity(&self, id: EntityId) -> Option<&'a Entity> {
        self.roster.get(id)
    }

    /// Living entities opposing `actor`, in registration order.
    pub fn opponents_of(&self, actor: EntityId) -> Vec<&'a Entity> {
        self.living_by_relation(actor, true)
    }

    /// Living entities on `actor`'s side (including the actor), in registration order.
    pub fn allies_of(&self, actor: EntityId) -> Vec<&'a Entity> {
        self.living_by_relation(actor, false)
    }

    fn living_by_relation(&self, actor: EntityId, opposing: bool) -> Vec<&'a Entity> {
        let Some(faction) = self.roster.get(actor).map(|entity| entity.faction) else {
            return Vec::new();
        };
        let wanted: Faction = if opposing { faction.opposing() } else { faction };
        self.roster.living(wanted).collect()
    }

    /// Deterministic seed for a decision by `actor` at the current turn.
    ///
    /// AI providers use this instead of the battle stream so that decisions
    /// never shift the rolls of resolution.
    pub fn decision_seed(&self, actor: EntityId) -> u64 {
        let nonce = (u64::from(self.turn) << 32) | u64::from(actor.0);
        derive_seed(self.seed, SeedDomain::EnemyAi, nonce)
    }
}

/// Decision interface for AI-controlled entities.
///
/// Implementations must return an action that is legal for `actor` in the
/// given view; an illegal choice aborts the battle as an internal error.
pub trait EnemyAi: Send + Sync {
    fn select_action(&self, view: &BattleView<'_>, actor: EntityId) -> ActionSelection;
}
