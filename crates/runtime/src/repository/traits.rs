//! Repository contract for the state that outlives a run.

use demonbane_core::MetaProgressionState;

use super::error::Result;

/// Storage for the meta-progression snapshot.
///
/// There is a single snapshot per save slot; every save replaces it.
pub trait MetaRepository: Send + Sync {
    /// Load the stored snapshot, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<MetaProgressionState>>;

    /// Replace the stored snapshot.
    fn save(&self, state: &MetaProgressionState) -> Result<()>;

    /// Remove the stored snapshot, if any.
    fn clear(&self) -> Result<()>;

    /// Check if a snapshot exists
    fn exists(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}
