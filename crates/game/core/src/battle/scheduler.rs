use crate::state::{EntityId, Roster};

/// Result of asking the queue for the next actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Next(EntityId),
    RoundComplete,
}

/// Turn order for one round.
///
/// Built at round start from living entities sorted by effective speed,
/// descending. The sort is stable, so equal speeds keep registration order.
/// Entities defeated mid-round are skipped when their slot comes up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnQueue {
    round: u32,
    order: Vec<EntityId>,
    cursor: usize,
}

impl TurnQueue {
    pub fn build(round: u32, roster: &Roster) -> Self {
        let mut living: Vec<(EntityId, u32)> = roster
            .iter()
            .filter(|entity| entity.is_alive())
            .map(|entity| (entity.id, entity.effective_speed()))
            .collect();
        living.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            round,
            order: living.into_iter().map(|(id, _)| id).collect(),
            cursor: 0,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Actors that have not had their slot yet this round.
    pub fn remaining(&self) -> &[EntityId] {
        &self.order[self.cursor..]
    }

    pub fn advance(&mut self, is_alive: impl Fn(EntityId) -> bool) -> Advance {
        while let Some(&next) = self.order.get(self.cursor) {
            self.cursor += 1;
            if is_alive(next) {
                return Advance::Next(next);
            }
        }
        Advance::RoundComplete
    }
}
