//! Status effect engine: stacking on apply, periodic effects on tick.
//!
//! Ticks run once per entity at round start, in the entity's insertion order
//! of effects. Every instance loses one round of duration per tick and is
//! removed when it reaches zero.

use crate::state::{
    Entity, EntityId, StackingPolicy, StatusCategory, StatusEffectInstance, StatusEffects,
    StatusKind,
};

use super::error::StatusError;

/// What happened when a status was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackResolution {
    /// No instance of the kind existed; a new one was added.
    Added,
    /// Another independent instance was added.
    Stacked,
    /// The existing instance's duration was reset.
    Refreshed,
    /// The existing instance was kept and the new one discarded.
    Ignored,
}

/// Result of ticking one entity's statuses.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub entity: EntityId,
    pub damage: u32,
    pub healing: u32,
    /// A stun ticked; the entity loses its next action.
    pub stunned: bool,
    pub expired: Vec<StatusKind>,
    pub defeated: bool,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.damage == 0 && self.healing == 0 && !self.stunned && self.expired.is_empty()
    }
}

/// Applies a status to an entity following the incoming instance's stacking policy.
pub fn apply(
    entity: &mut Entity,
    incoming: StatusEffectInstance,
) -> Result<StackResolution, StatusError> {
    apply_to(&mut entity.statuses, incoming)
}

/// [`apply`] against a bare status set.
///
/// The resolver runs this on a scratch copy during validation so that status
/// faults surface before anything is committed.
pub(crate) fn apply_to(
    statuses: &mut StatusEffects,
    incoming: StatusEffectInstance,
) -> Result<StackResolution, StatusError> {
    let kind = incoming.kind;
    if incoming.remaining == 0 {
        return Err(StatusError::ZeroDuration { kind });
    }

    let resolution = match statuses.find_mut(kind) {
        Some(existing) if existing.stacking != incoming.stacking => {
            return Err(StatusError::PolicyMismatch {
                kind,
                existing: existing.stacking,
                incoming: incoming.stacking,
            });
        }
        Some(existing) => match incoming.stacking {
            StackingPolicy::IgnoreIfPresent => return Ok(StackResolution::Ignored),
            StackingPolicy::Refresh => {
                existing.remaining = incoming.remaining;
                existing.magnitude = existing.magnitude.max(incoming.magnitude);
                return Ok(StackResolution::Refreshed);
            }
            StackingPolicy::Stack => StackResolution::Stacked,
        },
        None => StackResolution::Added,
    };

    statuses
        .push(incoming)
        .map_err(|_| StatusError::Overflow { kind })?;
    Ok(resolution)
}

/// Removes every instance of `kind`, returning how many were removed.
pub fn remove(entity: &mut Entity, kind: StatusKind) -> usize {
    remove_from(&mut entity.statuses, kind)
}

pub(crate) fn remove_from(statuses: &mut StatusEffects, kind: StatusKind) -> usize {
    statuses.drain_where(|effect| effect.kind == kind).len()
}

/// Processes one round of periodic effects and durations for `entity`.
///
/// Health effects stop once the entity reaches zero health within the tick;
/// durations still count down.
pub fn tick(entity: &mut Entity) -> TickReport {
    let mut report = TickReport {
        entity: entity.id,
        damage: 0,
        healing: 0,
        stunned: false,
        expired: Vec::new(),
        defeated: false,
    };

    let Entity {
        statuses, stats, ..
    } = &mut *entity;

    for effect in statuses.iter_mut() {
        match effect.kind.category() {
            StatusCategory::DamageOverTime if !stats.is_depleted() => {
                report.damage += stats.take_damage(effect.magnitude);
            }
            StatusCategory::HealOverTime if !stats.is_depleted() => {
                report.healing += stats.restore(effect.magnitude);
            }
            StatusCategory::Control => report.stunned = true,
            _ => {}
        }
        effect.remaining = effect.remaining.saturating_sub(1);
    }
    report.expired = statuses.drain_where(|effect| effect.remaining == 0);
    report.defeated = stats.is_depleted();

    if report.stunned {
        entity.skip_next_action = true;
    }
    report
}
