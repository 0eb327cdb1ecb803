//! Asynchronous abstraction for sourcing player decisions.
//!
//! Runtime users plug in [`PlayerInput`] implementations so sessions can run
//! with human input, scripted fixtures, or the built-in [`AutoPilot`].
use std::cmp::Reverse;
use std::collections::VecDeque;

use async_trait::async_trait;
use demonbane_core::{
    BattleView, EntityId, PlayerActionSelection, RoomId, RunError, RunState, RunStateMachine,
};

use super::ai::AiContext;
use crate::error::{Result, RuntimeError};

/// Rooms the player may move to from the current room.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Outbound exits of the current room.
    pub forward: Vec<RoomId>,
    /// Previously visited rooms that are not also forward exits.
    pub backtrack: Vec<RoomId>,
}

impl RouteOptions {
    pub fn for_run(run: &RunStateMachine) -> Self {
        let forward = run.available_moves();
        let current = run.state().room;
        let backtrack = run
            .state()
            .visited
            .iter()
            .copied()
            .filter(|room| *room != current && !forward.contains(room))
            .collect();
        Self { forward, backtrack }
    }

    pub fn contains(&self, room: RoomId) -> bool {
        self.forward.contains(&room) || self.backtrack.contains(&room)
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backtrack.is_empty()
    }
}

/// A route decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteChoice {
    Enter(RoomId),
    /// End the run voluntarily; currency and unlocks earned so far are kept.
    Rebirth,
    /// Quit the run. Nothing carries over.
    Abandon,
}

/// Source of player decisions.
///
/// A rejected choice is reported through [`rejected`](Self::rejected) and the
/// same prompt is repeated; the session bounds how often.
#[async_trait]
pub trait PlayerInput: Send {
    /// Choose the next room while exploring.
    async fn choose_route(&mut self, run: &RunState, options: &RouteOptions)
    -> Result<RouteChoice>;

    /// Choose an action for the player-controlled `actor`.
    async fn choose_action(
        &mut self,
        view: &BattleView<'_>,
        actor: EntityId,
    ) -> Result<PlayerActionSelection>;

    /// The last choice was rejected.
    fn rejected(&mut self, _error: &RunError) {}
}

// ============================================================================
// AutoPilot
// ============================================================================

/// Deterministic player policy used by the headless simulator.
///
/// Routes toward the boss, backtracking from dead ends; in explorer mode it
/// first visits every unvisited exit it passes. In battle it heals when
/// wounded, with an ability if one is ready and otherwise with a carried
/// item, and else uses its strongest ready attack on the weakest enemy.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoPilot {
    explore: bool,
}

impl AutoPilot {
    /// Health percentage below which a ready heal is used.
    pub const HEAL_BELOW_PERCENT: u32 = 40;

    pub fn new() -> Self {
        Self::default()
    }

    /// An autopilot that visits side rooms before heading to the boss.
    pub fn explorer() -> Self {
        Self { explore: true }
    }

    pub fn route(&self, run: &RunState, options: &RouteOptions) -> RouteChoice {
        let layer = &run.layer;
        let leads_to_boss = |room: RoomId| layer.reachable_from(room).contains(&layer.boss);

        if self.explore
            && let Some(room) = options
                .forward
                .iter()
                .copied()
                .find(|room| !run.visited.contains(room))
        {
            return RouteChoice::Enter(room);
        }

        if let Some(room) = options.forward.iter().copied().find(|room| leads_to_boss(*room)) {
            return RouteChoice::Enter(room);
        }

        // Dead end: return to the deepest visited room still connected to the boss.
        options
            .backtrack
            .iter()
            .copied()
            .filter(|room| leads_to_boss(*room))
            .max_by_key(|room| {
                let depth = layer.room(*room).map_or(0, |room| room.depth);
                (depth, Reverse(*room))
            })
            .map_or(RouteChoice::Abandon, RouteChoice::Enter)
    }

    pub fn action(&self, view: &BattleView<'_>, actor: EntityId) -> PlayerActionSelection {
        let Some(ctx) = AiContext::new(view, actor) else {
            return PlayerActionSelection::basic_attack(actor);
        };

        if ctx.health_percent() < Self::HEAL_BELOW_PERCENT
            && let Some(selection) = ctx
                .healing_abilities()
                .first()
                .and_then(|ability| ctx.select(ability, None))
                .or_else(|| ctx.healing_item())
        {
            return selection;
        }

        ctx.strongest_offensive()
            .and_then(|ability| ctx.select(ability, None))
            .unwrap_or_else(|| ctx.basic_attack(None))
    }
}

#[async_trait]
impl PlayerInput for AutoPilot {
    async fn choose_route(
        &mut self,
        run: &RunState,
        options: &RouteOptions,
    ) -> Result<RouteChoice> {
        Ok(self.route(run, options))
    }

    async fn choose_action(
        &mut self,
        view: &BattleView<'_>,
        actor: EntityId,
    ) -> Result<PlayerActionSelection> {
        Ok(self.action(view, actor))
    }
}

// ============================================================================
// ScriptedInput
// ============================================================================

/// Replays queued decisions, then hands over to an optional fallback.
///
/// Without a fallback an exhausted script fails with
/// [`RuntimeError::InputClosed`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    routes: VecDeque<RouteChoice>,
    actions: VecDeque<PlayerActionSelection>,
    fallback: Option<AutoPilot>,
    rejections: u32,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, choice: RouteChoice) -> Self {
        self.routes.push_back(choice);
        self
    }

    pub fn action(mut self, selection: PlayerActionSelection) -> Self {
        self.actions.push_back(selection);
        self
    }

    pub fn with_fallback(mut self, fallback: AutoPilot) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Number of choices rejected so far.
    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    pub fn is_exhausted(&self) -> bool {
        self.routes.is_empty() && self.actions.is_empty()
    }
}

#[async_trait]
impl PlayerInput for ScriptedInput {
    async fn choose_route(
        &mut self,
        run: &RunState,
        options: &RouteOptions,
    ) -> Result<RouteChoice> {
        match (self.routes.pop_front(), self.fallback) {
            (Some(choice), _) => Ok(choice),
            (None, Some(pilot)) => Ok(pilot.route(run, options)),
            (None, None) => Err(RuntimeError::InputClosed),
        }
    }

    async fn choose_action(
        &mut self,
        view: &BattleView<'_>,
        actor: EntityId,
    ) -> Result<PlayerActionSelection> {
        match (self.actions.pop_front(), self.fallback) {
            (Some(selection), _) => Ok(selection),
            (None, Some(pilot)) => Ok(pilot.action(view, actor)),
            (None, None) => Err(RuntimeError::InputClosed),
        }
    }

    fn rejected(&mut self, error: &RunError) {
        self.rejections += 1;
        tracing::debug!(rejections = self.rejections, %error, "scripted choice rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demonbane_content::bundled_catalog;
    use demonbane_core::{GameConfig, RunConfig};
    use std::sync::Arc;

    fn run(seed: u64) -> RunStateMachine {
        let content = Arc::new(bundled_catalog().unwrap());
        RunStateMachine::start(
            RunConfig::new(seed, "crusader", 0),
            content,
            GameConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn route_options_start_with_the_entrance_exits() {
        let run = run(4);
        let options = RouteOptions::for_run(&run);
        assert_eq!(options.forward, run.available_moves());
        assert!(options.backtrack.is_empty());
        assert!(!options.is_empty());
    }

    #[test]
    fn autopilot_heads_for_the_boss() {
        let run = run(4);
        let options = RouteOptions::for_run(&run);
        let layer = run.layer();
        match AutoPilot::new().route(run.state(), &options) {
            RouteChoice::Enter(room) => {
                assert!(options.forward.contains(&room));
                assert!(layer.reachable_from(room).contains(&layer.boss));
            }
            other => panic!("entrance always reaches the boss, got {other:?}"),
        }
    }

    #[test]
    fn autopilot_abandons_without_options() {
        let run = run(4);
        let options = RouteOptions::default();
        assert_eq!(
            AutoPilot::explorer().route(run.state(), &options),
            RouteChoice::Abandon
        );
    }

    #[tokio::test]
    async fn script_replays_then_falls_back() {
        let run = run(4);
        let options = RouteOptions::for_run(&run);
        let mut input = ScriptedInput::new()
            .route(RouteChoice::Abandon)
            .with_fallback(AutoPilot::new());

        assert_eq!(
            input.choose_route(run.state(), &options).await.unwrap(),
            RouteChoice::Abandon
        );
        assert!(input.is_exhausted());
        assert_eq!(
            input.choose_route(run.state(), &options).await.unwrap(),
            AutoPilot::new().route(run.state(), &options)
        );

        input.rejected(&RunError::BattleInProgress);
        assert_eq!(input.rejections(), 1);
    }
}
