//! Events published by a [`Session`](crate::Session) for presentation layers.
//!
//! Delivery is best-effort over a tokio broadcast channel: slow subscribers
//! may lag and miss events, and publishing without subscribers is a no-op.

use demonbane_core::{BattleConclusion, BattleStep, Biome, RoomEvent, RunSummary};
use tokio::sync::broadcast;

/// Observable progress of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    RunStarted {
        seed: u64,
        class: String,
        heat: u32,
    },
    LayerEntered {
        index: u8,
        biome: Biome,
        rooms: usize,
        fallback: bool,
    },
    Room(RoomEvent),
    Battle(BattleStep),
    BattleConcluded(BattleConclusion),
    RunFinished(RunSummary),
}

/// Broadcast fan-out for [`SessionEvent`]s.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!("no session event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
