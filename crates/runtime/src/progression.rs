//! Meta-progression lifecycle.
//!
//! The manager owns the loaded [`MetaProgressionState`] for the lifetime of
//! the process. It is the only writer: runs are configured from it, and
//! finished runs are folded back into it with the pure core rules and then
//! persisted.

use std::sync::Arc;

use demonbane_core::{
    ContentError, ContentOracle, GameConfig, MetaProgressionState, PlayerClass, RunConfig,
    RunError, RunOutcome, RunStateMachine, RunSummary, StartingBonus, finalize_run,
    starting_bonus,
};

use crate::error::{Result, RuntimeError};
use crate::repository::MetaRepository;

/// Loads, gates, finalizes and persists meta-progression.
pub struct MetaProgressionManager {
    repository: Arc<dyn MetaRepository>,
    content: Arc<dyn ContentOracle>,
    rules: GameConfig,
    state: MetaProgressionState,
}

impl MetaProgressionManager {
    /// Loads the stored snapshot once, starting fresh when none exists.
    pub fn load(
        repository: Arc<dyn MetaRepository>,
        content: Arc<dyn ContentOracle>,
        rules: GameConfig,
    ) -> Result<Self> {
        let state = match repository.load()? {
            Some(state) => {
                tracing::info!(
                    runs = state.runs_finished,
                    currency = state.currency,
                    unlocks = state.unlocks.len(),
                    "meta progression loaded"
                );
                state
            }
            None => {
                tracing::info!("no saved meta progression; starting fresh");
                MetaProgressionState::default()
            }
        };

        Ok(Self {
            repository,
            content,
            rules,
            state,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &MetaProgressionState {
        &self.state
    }

    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn content(&self) -> &Arc<dyn ContentOracle> {
        &self.content
    }

    /// Bonus the next run starts with.
    pub fn starting_bonus(&self) -> StartingBonus {
        starting_bonus(&self.state)
    }

    /// Classes the player may currently pick.
    pub fn unlocked_classes(&self) -> Vec<&PlayerClass> {
        self.content
            .player_classes()
            .into_iter()
            .filter(|class| self.state.is_class_unlocked(class))
            .collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts a run after checking class and heat gating.
    pub fn begin_run(&self, seed: u64, class: &str, heat: u32) -> Result<RunStateMachine> {
        let template = self
            .content
            .player_class(class)
            .ok_or_else(|| RunError::from(ContentError::UnknownClass(class.into())))?;
        if let Some(requires) = &template.requires
            && !self.state.unlocks.contains(requires)
        {
            return Err(RuntimeError::ClassLocked {
                class: class.to_owned(),
                requires: requires.clone(),
            });
        }

        let max = self.state.max_selectable_heat();
        if heat > max {
            return Err(RuntimeError::HeatLocked { heat, max });
        }

        let bonus = self.starting_bonus();
        tracing::debug!(?bonus, "applying starting bonus");
        let config = RunConfig::new(seed, class, heat).with_bonus(bonus);
        Ok(RunStateMachine::start(
            config,
            Arc::clone(&self.content),
            self.rules.clone(),
        )?)
    }

    /// Folds a finished run into the meta state and persists it.
    ///
    /// Abandoned runs change nothing and are not persisted; rebirths are
    /// banked like defeats. Returns whether the state was saved.
    pub fn finalize(&mut self, summary: &RunSummary) -> Result<bool> {
        if summary.outcome == RunOutcome::Abandoned {
            tracing::info!(seed = summary.seed, "run abandoned; meta progression untouched");
            return Ok(false);
        }

        let next = finalize_run(&self.state, summary);
        self.repository.save(&next)?;
        let gained = next.unlocks.len() - self.state.unlocks.len();
        self.state = next;

        tracing::info!(
            seed = summary.seed,
            outcome = %summary.outcome,
            currency = self.state.currency,
            unlocks_gained = gained,
            "run finalized"
        );
        Ok(true)
    }

    /// Persists the current state on request.
    pub fn checkpoint(&self) -> Result<()> {
        self.repository.save(&self.state)?;
        tracing::debug!(runs = self.state.runs_finished, "meta progression checkpoint");
        Ok(())
    }
}
