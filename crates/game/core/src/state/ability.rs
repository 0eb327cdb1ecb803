//! Ability templates and per-entity ability slots.
//!
//! An [`Ability`] is immutable content shared between every entity that knows
//! it; the per-entity mutable part (cooldown) lives in [`AbilitySlot`].

use std::sync::{Arc, OnceLock};

use super::status::{StackingPolicy, StatusEffectInstance, StatusKind};

/// Which entities an ability may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelector {
    /// The actor itself; no target list is required.
    SelfOnly,
    /// Exactly one living opponent.
    SingleEnemy,
    /// Exactly one living entity of the actor's faction (may be the actor).
    SingleAlly,
    /// Every living opponent, in registration order.
    AllEnemies,
}

impl TargetSelector {
    pub const fn targets_opponents(self) -> bool {
        matches!(self, Self::SingleEnemy | Self::AllEnemies)
    }
}

/// Amount formula for healing effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formula {
    /// `floor(attack × power / 100)` using the actor's effective attack.
    Scaled,
    /// Constant amount.
    Flat(u32),
}

impl Formula {
    pub fn evaluate(self, attack: u32, power: u32) -> u32 {
        match self {
            Self::Scaled => (u64::from(attack) * u64::from(power) / 100) as u32,
            Self::Flat(amount) => amount,
        }
    }
}

/// Template for a status an ability applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusSpec {
    pub kind: StatusKind,
    pub magnitude: u32,
    pub duration: u32,
    pub stacking: StackingPolicy,
}

impl StatusSpec {
    /// A fresh instance with the full duration.
    pub fn instance(&self) -> StatusEffectInstance {
        StatusEffectInstance::new(self.kind, self.magnitude, self.duration, self.stacking)
    }
}

/// One step of an ability's resolution. Effects apply in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSpec {
    /// Standard damage: `attack × power / 100 − defense`.
    Damage,
    Heal(Formula),
    ApplyStatus(StatusSpec),
    /// Removes every instance of the given kind from the target.
    RemoveStatus(StatusKind),
}

/// Randomized outcome profile. Abilities without one resolve deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollProfile {
    /// Base hit chance in percent before the target's dodge is subtracted.
    pub accuracy: u32,
    /// Added to the actor's crit chance.
    pub crit_bonus: u32,
    /// Chance in percent that status effects land.
    pub status_chance: u32,
}

/// Immutable ability definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub selector: TargetSelector,
    /// Damage / scaled-heal power as a percentage of attack.
    pub power: u32,
    /// Resource cost paid on use.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: u32,
    /// Rounds before the ability is usable again (0 = no cooldown).
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,
    pub effects: Vec<EffectSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rolls: Option<RollProfile>,
}

impl Ability {
    pub const BASIC_ATTACK_ID: &'static str = "basic_attack";

    /// Shared basic attack: single enemy, power 100, no cost or cooldown.
    pub fn basic_attack() -> Arc<Ability> {
        static BASIC_ATTACK: OnceLock<Arc<Ability>> = OnceLock::new();
        BASIC_ATTACK
            .get_or_init(|| {
                Arc::new(Ability {
                    id: Self::BASIC_ATTACK_ID.to_owned(),
                    name: "Attack".to_owned(),
                    selector: TargetSelector::SingleEnemy,
                    power: 100,
                    cost: 0,
                    cooldown: 0,
                    effects: vec![EffectSpec::Damage],
                    rolls: Some(RollProfile {
                        accuracy: 100,
                        crit_bonus: 0,
                        status_chance: 0,
                    }),
                })
            })
            .clone()
    }

    pub fn deals_damage(&self) -> bool {
        self.effects.iter().any(|effect| matches!(effect, EffectSpec::Damage))
    }

    /// Offensive abilities target opponents and deal damage; their damage
    /// never drops below 1.
    pub fn is_offensive(&self) -> bool {
        self.selector.targets_opponents() && self.deals_damage()
    }
}

/// An ability known by an entity together with its cooldown counter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySlot {
    pub ability: Arc<Ability>,
    pub cooldown_remaining: u32,
}

impl AbilitySlot {
    pub fn new(ability: Arc<Ability>) -> Self {
        Self {
            ability,
            cooldown_remaining: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.ability.id
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.ability.cooldown;
    }

    pub fn tick_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}
