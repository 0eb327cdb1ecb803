//! Async driver that plays runs end to end.
//!
//! ```text
//! begin_run ─→ Exploring ──enter_room──→ InBattle ──conclude──→ Exploring …
//!                  │                        │
//!                  ├────── rebirth ─────────────→ finish ─→ finalize
//!                  └────── abandon ─────────┴──→ finish
//! ```
//!
//! The session awaits only on the [`PlayerInput`] collaborator. Enemy turns,
//! resolution and layer generation run synchronously inside the core state
//! machine. Rejected player choices are re-prompted up to the configured
//! bound, after which the run is abandoned.

use std::sync::Arc;

use demonbane_core::{
    BattleError, BattleStep, EnemyAi, EntityId, Layer, RunError, RunPhase, RunStateMachine,
    RunSummary, generate_layer,
};
use tokio::sync::broadcast;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, SessionEvent};
use crate::progression::MetaProgressionManager;
use crate::providers::{PlayerInput, RouteChoice, RouteOptions};

/// Plays runs against a meta-progression manager.
pub struct Session<I> {
    manager: MetaProgressionManager,
    input: I,
    ai: Arc<dyn EnemyAi>,
    max_reprompts: u32,
    events: EventBus,
}

impl<I: PlayerInput> Session<I> {
    pub fn new(manager: MetaProgressionManager, input: I, ai: Arc<dyn EnemyAi>) -> Self {
        Self {
            manager,
            input,
            ai,
            max_reprompts: RuntimeConfig::DEFAULT_MAX_REPROMPTS,
            events: EventBus::new(),
        }
    }

    /// Rejected choices tolerated in a row before the run is abandoned.
    pub fn with_max_reprompts(mut self, max_reprompts: u32) -> Self {
        self.max_reprompts = max_reprompts;
        self
    }

    /// Replaces the event bus with one buffering `capacity` events per subscriber.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.events = EventBus::with_capacity(capacity);
        self
    }

    pub fn manager(&self) -> &MetaProgressionManager {
        &self.manager
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Runs
    // ========================================================================

    /// Plays one run to its end and folds it into meta-progression.
    ///
    /// On error the run is abandoned and nothing is credited.
    pub async fn play_run(&mut self, seed: u64, class: &str, heat: u32) -> Result<RunSummary> {
        let mut run = self.manager.begin_run(seed, class, heat)?;
        self.events.publish(SessionEvent::RunStarted {
            seed,
            class: class.to_owned(),
            heat,
        });
        self.publish_layer(run.layer());

        if let Err(err) = self.drive(&mut run).await {
            run.abandon();
            tracing::error!(seed, error = %err, "run aborted");
            return Err(err);
        }

        let summary = run.finish()?;
        self.manager.finalize(&summary)?;
        tracing::info!(
            seed,
            outcome = %summary.outcome,
            layers = summary.layers_cleared,
            level = summary.level,
            "run finished"
        );
        self.events.publish(SessionEvent::RunFinished(summary.clone()));
        Ok(summary)
    }

    /// Plays `count` consecutive runs with seeds `first_seed`, `first_seed + 1`, ...
    ///
    /// Each run starts from the meta state the previous one left behind.
    pub async fn play_runs(
        &mut self,
        first_seed: u64,
        count: u32,
        class: &str,
        heat: u32,
    ) -> Result<Vec<RunSummary>> {
        let mut summaries = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let seed = first_seed.wrapping_add(u64::from(offset));
            summaries.push(self.play_run(seed, class, heat).await?);
        }
        Ok(summaries)
    }

    /// Generates the layer a run with `seed` would enter at `index`, off the
    /// async executor.
    pub async fn preview_layer(&self, seed: u64, index: u8, heat: u32) -> Result<Layer> {
        let content = Arc::clone(self.manager.content());
        let rules = self.manager.rules().clone();
        let layer = tokio::task::spawn_blocking(move || {
            generate_layer(&rules, content.as_ref(), seed, index, heat)
        })
        .await
        .map_err(RuntimeError::WorkerJoin)??;
        Ok(layer)
    }

    // ========================================================================
    // Driving
    // ========================================================================

    async fn drive(&mut self, run: &mut RunStateMachine) -> Result<()> {
        loop {
            match run.phase() {
                RunPhase::Exploring => self.explore(run).await?,
                RunPhase::InBattle => self.fight(run).await?,
                RunPhase::RunComplete | RunPhase::RunEnded(_) => return Ok(()),
            }
        }
    }

    async fn explore(&mut self, run: &mut RunStateMachine) -> Result<()> {
        let mut attempts = 0;
        loop {
            let options = RouteOptions::for_run(run);
            let room = match self.input.choose_route(run.state(), &options).await? {
                RouteChoice::Enter(room) => room,
                RouteChoice::Rebirth => {
                    run.rebirth()?;
                    return Ok(());
                }
                RouteChoice::Abandon => {
                    run.abandon();
                    return Ok(());
                }
            };

            match run.enter_room(room) {
                Ok(event) => {
                    self.events.publish(SessionEvent::Room(event));
                    return Ok(());
                }
                Err(err @ (RunError::NoPath { .. } | RunError::UnknownRoom(_))) => {
                    self.reject(run, &err, &mut attempts)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn fight(&mut self, run: &mut RunStateMachine) -> Result<()> {
        loop {
            match run.advance_battle(self.ai.as_ref()) {
                Ok(BattleStep::AwaitingInput { actor }) => {
                    self.events
                        .publish(SessionEvent::Battle(BattleStep::AwaitingInput { actor }));
                    self.prompt_action(run, actor).await?;
                }
                Ok(step @ BattleStep::Finished(_)) => {
                    self.events.publish(SessionEvent::Battle(step));
                    break;
                }
                Ok(step) => self.events.publish(SessionEvent::Battle(step)),
                Err(RunError::Battle(BattleError::IllegalAiAction { actor, source })) => {
                    tracing::error!(%actor, error = %source, "encounter aborted by the enemy AI");
                    break;
                }
                Err(err @ RunError::Battle(BattleError::StatusFault { .. })) => {
                    tracing::error!(error = %err, "encounter aborted by a status fault");
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }

        let conclusion = run.conclude_battle()?;
        let descended = conclusion.descended_to.is_some();
        self.events.publish(SessionEvent::BattleConcluded(conclusion));
        if descended {
            self.publish_layer(run.layer());
        }
        Ok(())
    }

    async fn prompt_action(&mut self, run: &mut RunStateMachine, actor: EntityId) -> Result<()> {
        let mut attempts = 0;
        loop {
            let selection = {
                let battle = run.battle().ok_or(RunError::InvalidPhase {
                    action: "choose an action",
                    phase: run.phase(),
                })?;
                self.input.choose_action(&battle.view(), actor).await?
            };

            match run.submit_action(selection) {
                Ok(step) => {
                    self.events.publish(SessionEvent::Battle(step));
                    return Ok(());
                }
                Err(err) if err.is_action_unavailable() => {
                    self.reject(run, &err, &mut attempts)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn reject(
        &mut self,
        run: &mut RunStateMachine,
        err: &RunError,
        attempts: &mut u32,
    ) -> Result<()> {
        *attempts += 1;
        self.input.rejected(err);
        tracing::debug!(attempt = *attempts, error = %err, "player choice rejected");

        if *attempts > self.max_reprompts {
            tracing::warn!(attempts = *attempts, "too many rejected choices; abandoning run");
            run.abandon();
            return Err(RuntimeError::TooManyRejections {
                attempts: *attempts,
            });
        }
        Ok(())
    }

    fn publish_layer(&self, layer: &Layer) {
        tracing::debug!(
            layer = layer.index,
            biome = %layer.biome,
            rooms = layer.rooms.len(),
            digest = %hex::encode(&layer.digest()[..8]),
            "entered layer"
        );
        self.events.publish(SessionEvent::LayerEntered {
            index: layer.index,
            biome: layer.biome,
            rooms: layer.rooms.len(),
            fallback: layer.fallback,
        });
    }
}
