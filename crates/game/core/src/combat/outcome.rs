use crate::state::{EntityId, StatusKind};

use super::status::StackResolution;

/// A status applied to a target during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusChange {
    pub kind: StatusKind,
    pub resolution: StackResolution,
}

/// Per-target result of an action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOutcome {
    pub target: EntityId,
    pub damage: u32,
    pub healing: u32,
    pub evaded: bool,
    pub critical: bool,
    pub statuses_applied: Vec<StatusChange>,
    pub statuses_removed: Vec<StatusKind>,
    /// The target went from alive to defeated during this action.
    pub defeated: bool,
}

impl TargetOutcome {
    pub fn new(target: EntityId) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }
}

/// Full record of one resolved action, in target resolution order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub actor: EntityId,
    pub ability: String,
    pub resource_spent: u32,
    /// Inventory item used up by the action.
    pub consumed: Option<String>,
    pub targets: Vec<TargetOutcome>,
}

impl ActionOutcome {
    pub fn total_damage(&self) -> u32 {
        self.targets.iter().map(|target| target.damage).sum()
    }

    pub fn defeated(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.targets
            .iter()
            .filter(|target| target.defeated)
            .map(|target| target.target)
    }
}
