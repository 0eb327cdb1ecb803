use crate::content::Rarity;

/// How a battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Won,
    Lost,
    Aborted,
}

/// A looted item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDrop {
    pub item: String,
    pub rarity: Rarity,
}

/// Final record of a battle. Rewards are zero unless the battle was won.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleResult {
    pub outcome: BattleOutcome,
    pub experience: u32,
    pub currency: u32,
    pub drops: Vec<ItemDrop>,
    /// Meta unlocks granted by defeated bosses.
    pub unlocks: Vec<String>,
    pub enemies_defeated: u32,
    pub rounds: u32,
    pub turns: u32,
}

impl BattleResult {
    pub(crate) fn without_rewards(outcome: BattleOutcome, rounds: u32, turns: u32) -> Self {
        Self {
            outcome,
            experience: 0,
            currency: 0,
            drops: Vec::new(),
            unlocks: Vec::new(),
            enemies_defeated: 0,
            rounds,
            turns,
        }
    }

    pub fn is_victory(&self) -> bool {
        self.outcome == BattleOutcome::Won
    }
}
