//! Pattern-driven enemy AI.

use std::sync::Arc;

use demonbane_core::{
    ActionSelection, AiPattern, BattleView, ContentOracle, EnemyAi, EntityId, EntityKind,
    RngStream,
};

use super::context::AiContext;

/// Enemy AI that follows the [`AiPattern`] of each enemy's variant.
///
/// Every decision draws from its own stream seeded by
/// [`BattleView::decision_seed`], so AI choices never shift the rolls of the
/// battle itself and replays reproduce them exactly.
///
/// - **Aggressive**: strongest ready attack against the weakest opponent
/// - **Tactical**: a ready ability 70% of the time, otherwise a basic attack
///   on a random opponent; heals allies below half health first
/// - **Berserker**: basic attacks until below half health, then the
///   strongest ready attack
#[derive(Clone)]
pub struct PatternAi {
    content: Arc<dyn ContentOracle>,
}

impl PatternAi {
    /// Chance in percent that a tactical enemy uses an ability when one is ready.
    pub const TACTICAL_ABILITY_CHANCE: u32 = 70;
    /// Health percentage below which berserkers and tactical healers react.
    pub const WOUNDED_PERCENT: u32 = 50;

    pub fn new(content: Arc<dyn ContentOracle>) -> Self {
        Self { content }
    }

    fn pattern_of(&self, kind: &EntityKind) -> AiPattern {
        match kind {
            EntityKind::Enemy { variant, .. } => self
                .content
                .enemy_variant(variant)
                .map(|variant| variant.ai)
                .unwrap_or_default(),
            EntityKind::Player { .. } => AiPattern::default(),
        }
    }

    fn aggressive(ctx: &AiContext<'_>) -> ActionSelection {
        ctx.strongest_offensive()
            .and_then(|ability| ctx.select(ability, None))
            .unwrap_or_else(|| ctx.basic_attack(None))
    }

    fn tactical(ctx: &AiContext<'_>, rng: &mut RngStream) -> ActionSelection {
        let usable = ctx.usable_abilities();
        if !usable.is_empty() && rng.chance(Self::TACTICAL_ABILITY_CHANCE) {
            let wounded = ctx
                .most_wounded_ally()
                .and_then(|id| ctx.view().entity(id))
                .is_some_and(|ally| {
                    u64::from(ally.current_health()) * 100
                        < u64::from(ally.max_health()) * u64::from(Self::WOUNDED_PERCENT)
                });
            if wounded
                && let Some(selection) = ctx
                    .healing_abilities()
                    .first()
                    .and_then(|ability| ctx.select(ability, None))
            {
                return selection;
            }

            let candidates: Vec<_> = usable
                .into_iter()
                .filter(|ability| !super::context::is_healing(ability))
                .collect();
            if let Some(index) = rng.pick(candidates.len()) {
                let target = ctx.random_opponent(rng);
                if let Some(selection) = ctx.select(candidates[index], target) {
                    return selection;
                }
            }
        }

        let target = ctx.random_opponent(rng);
        ctx.basic_attack(target)
    }

    fn berserker(ctx: &AiContext<'_>) -> ActionSelection {
        if ctx.health_percent() < Self::WOUNDED_PERCENT {
            Self::aggressive(ctx)
        } else {
            ctx.basic_attack(None)
        }
    }
}

impl EnemyAi for PatternAi {
    fn select_action(&self, view: &BattleView<'_>, actor: EntityId) -> ActionSelection {
        let Some(ctx) = AiContext::new(view, actor) else {
            tracing::warn!(%actor, "AI asked to act for an unknown entity");
            return ActionSelection::basic_attack(actor);
        };

        let pattern = self.pattern_of(&ctx.actor().kind);
        let mut rng = RngStream::new(view.decision_seed(actor));
        let selection = match pattern {
            AiPattern::Aggressive => Self::aggressive(&ctx),
            AiPattern::Tactical => Self::tactical(&ctx, &mut rng),
            AiPattern::Berserker => Self::berserker(&ctx),
        };

        tracing::trace!(%actor, %pattern, ability = ?selection.ability, "AI decision");
        selection
    }
}
