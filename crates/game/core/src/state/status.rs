//! Status effect data carried by entities.
//!
//! Statuses are round-based: each instance stores its remaining duration in
//! rounds and is decremented by the status engine at round start. The
//! container here only stores and queries instances; stacking rules and
//! ticking live in [`crate::combat::status`].

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Types of status effects.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    // ========================================================================
    // Stat modifiers (magnitude is a percentage of the base stat)
    // ========================================================================
    AttackUp,
    AttackDown,
    DefenseUp,
    DefenseDown,
    SpeedUp,
    SpeedDown,

    // ========================================================================
    // Periodic effects (magnitude is a flat amount per round)
    // ========================================================================
    Poison,
    Burn,
    Regeneration,

    // ========================================================================
    // Control
    // ========================================================================
    /// The entity loses its next action.
    Stun,
}

/// Coarse grouping used by the status engine when ticking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCategory {
    Buff,
    Debuff,
    DamageOverTime,
    HealOverTime,
    Control,
}

impl StatusKind {
    pub const fn category(self) -> StatusCategory {
        match self {
            Self::AttackUp | Self::DefenseUp | Self::SpeedUp => StatusCategory::Buff,
            Self::AttackDown | Self::DefenseDown | Self::SpeedDown => StatusCategory::Debuff,
            Self::Poison | Self::Burn => StatusCategory::DamageOverTime,
            Self::Regeneration => StatusCategory::HealOverTime,
            Self::Stun => StatusCategory::Control,
        }
    }

    pub const fn is_harmful(self) -> bool {
        matches!(
            self.category(),
            StatusCategory::Debuff | StatusCategory::DamageOverTime | StatusCategory::Control
        )
    }
}

/// How a new instance interacts with an existing instance of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Reset the duration (and keep the larger magnitude) of the existing instance.
    Refresh,
    /// Add an independent instance that ticks on its own.
    Stack,
    /// Discard the new instance if one is already present.
    IgnoreIfPresent,
}

/// A single status effect on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectInstance {
    pub kind: StatusKind,
    pub magnitude: u32,
    /// Rounds left before the instance expires.
    pub remaining: u32,
    pub stacking: StackingPolicy,
    /// Insertion order within the owning entity; ticks run in this order.
    pub sequence: u64,
}

impl StatusEffectInstance {
    pub fn new(kind: StatusKind, magnitude: u32, duration: u32, stacking: StackingPolicy) -> Self {
        Self {
            kind,
            magnitude,
            remaining: duration,
            stacking,
            sequence: 0,
        }
    }
}

/// Active status effects on an entity, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffectInstance, { GameConfig::MAX_STATUS_EFFECTS }>,
    next_sequence: u64,
}

impl StatusEffects {
    /// Creates an empty status effect set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectInstance> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    /// Number of instances of `kind` (greater than one only for stacked effects).
    pub fn count(&self, kind: StatusKind) -> usize {
        self.effects.iter().filter(|effect| effect.kind == kind).count()
    }

    /// Sum of magnitudes across every instance of `kind`.
    pub fn total_magnitude(&self, kind: StatusKind) -> u32 {
        self.effects
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.magnitude)
            .sum()
    }

    pub(crate) fn find_mut(&mut self, kind: StatusKind) -> Option<&mut StatusEffectInstance> {
        self.effects.iter_mut().find(|effect| effect.kind == kind)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffectInstance> {
        self.effects.iter_mut()
    }

    /// Appends an instance, stamping its sequence number.
    ///
    /// Returns the instance back when the container is full.
    pub(crate) fn push(
        &mut self,
        mut instance: StatusEffectInstance,
    ) -> Result<(), StatusEffectInstance> {
        if self.effects.is_full() {
            return Err(instance);
        }
        instance.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.effects.push(instance);
        Ok(())
    }

    /// Removes instances matching `predicate`, returning their kinds in order.
    pub(crate) fn drain_where(
        &mut self,
        mut predicate: impl FnMut(&StatusEffectInstance) -> bool,
    ) -> Vec<StatusKind> {
        let mut removed = Vec::new();
        self.effects.retain(|effect| {
            if predicate(effect) {
                removed.push(effect.kind);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
