//! Meta-progression: the state that survives between runs.
//!
//! Both operations here are pure. [`finalize_run`] folds a finished run into
//! a new state without touching the old one, and [`starting_bonus`] derives
//! the bonus for the next run from unlock and currency totals.

use std::collections::BTreeSet;

use crate::content::PlayerClass;
use crate::run::{RunOutcome, RunSummary};

use super::heat::HeatModifiers;

/// Persistent progression across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MetaProgressionState {
    /// Lifetime currency banked from finished runs.
    pub currency: u64,
    pub unlocks: BTreeSet<String>,
    /// Highest heat with a recorded victory.
    pub highest_heat_cleared: Option<u32>,
    pub runs_finished: u32,
    pub victories: u32,
    /// Every finished run, oldest first. Append-only.
    pub history: Vec<RunRecord>,
}

/// Compact record of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunRecord {
    pub seed: u64,
    pub class: String,
    pub heat: u32,
    pub outcome: RunOutcome,
    pub layers_cleared: u8,
    pub level: u32,
    pub currency_earned: u32,
    /// Unlocks this run added to the permanent set.
    pub unlocks_gained: Vec<String>,
}

impl MetaProgressionState {
    /// Highest heat a new run may select.
    pub fn max_selectable_heat(&self) -> u32 {
        self.highest_heat_cleared
            .map_or(0, |heat| (heat + 1).min(HeatModifiers::MAX_HEAT))
    }

    pub fn is_class_unlocked(&self, class: &PlayerClass) -> bool {
        class
            .requires
            .as_ref()
            .is_none_or(|unlock| self.unlocks.contains(unlock))
    }

    /// The last `count` records, oldest first, for display.
    pub fn recent_history(&self, count: usize) -> &[RunRecord] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }
}

/// Folds a finished run into the meta state.
///
/// Currency only grows, unlocks only accumulate, and the highest cleared heat
/// only moves on a victory. Defeats and rebirths bank what the run earned.
/// Abandoned runs earn nothing and return the state unchanged.
pub fn finalize_run(state: &MetaProgressionState, summary: &RunSummary) -> MetaProgressionState {
    if summary.outcome == RunOutcome::Abandoned {
        return state.clone();
    }

    let unlocks_gained = summary
        .unlocks
        .iter()
        .filter(|unlock| !state.unlocks.contains(*unlock))
        .cloned()
        .collect();

    let mut next = state.clone();
    next.currency = next.currency.saturating_add(u64::from(summary.currency_earned));
    next.unlocks.extend(summary.unlocks.iter().cloned());
    next.runs_finished += 1;

    if summary.outcome == RunOutcome::Victory {
        next.victories += 1;
        next.highest_heat_cleared = Some(
            next.highest_heat_cleared
                .map_or(summary.heat, |heat| heat.max(summary.heat)),
        );
    }

    next.history.push(RunRecord {
        seed: summary.seed,
        class: summary.class.clone(),
        heat: summary.heat,
        outcome: summary.outcome,
        layers_cleared: summary.layers_cleared,
        level: summary.level,
        currency_earned: summary.currency_earned,
        unlocks_gained,
    });
    next
}

/// Bonus applied to the player at the start of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartingBonus {
    pub health_percent: u32,
    pub attack_percent: u32,
    pub defense: u32,
    pub currency: u32,
}

impl StartingBonus {
    pub const MAX_HEALTH_PERCENT: u32 = 20;
    pub const MAX_ATTACK_PERCENT: u32 = 10;
    pub const MAX_DEFENSE: u32 = 3;
    pub const MAX_CURRENCY: u32 = 50;
}

/// Derives the starting bonus from the meta state. Every component is capped.
pub fn starting_bonus(state: &MetaProgressionState) -> StartingBonus {
    let unlocks = state.unlocks.len() as u32;
    StartingBonus {
        health_percent: (unlocks * 2).min(StartingBonus::MAX_HEALTH_PERCENT),
        attack_percent: unlocks.min(StartingBonus::MAX_ATTACK_PERCENT),
        defense: (unlocks / 5).min(StartingBonus::MAX_DEFENSE),
        currency: (state.currency / 20).min(u64::from(StartingBonus::MAX_CURRENCY)) as u32,
    }
}
