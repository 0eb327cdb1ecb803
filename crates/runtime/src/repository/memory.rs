//! In-memory MetaRepository implementation for tests and ephemeral sessions.

use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use demonbane_core::MetaProgressionState;

use super::error::{RepositoryError, Result};
use super::traits::MetaRepository;

/// In-memory implementation of MetaRepository.
///
/// Counts saves so callers can verify when persistence happened.
#[derive(Default)]
pub struct InMemoryMetaRepository {
    state: RwLock<Option<MetaProgressionState>>,
    saves: AtomicUsize,
}

impl InMemoryMetaRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with an existing snapshot.
    pub fn with_state(state: MetaProgressionState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl MetaRepository for InMemoryMetaRepository {
    fn load(&self) -> Result<Option<MetaProgressionState>> {
        let state = self
            .state
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(state.clone())
    }

    fn save(&self, state: &MetaProgressionState) -> Result<()> {
        let mut slot = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *slot = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .state
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.state
            .read()
            .map(|state| state.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_replaces_snapshot() {
        let repo = InMemoryMetaRepository::new();
        assert!(!repo.exists());
        assert_eq!(repo.load().unwrap(), None);

        let mut state = MetaProgressionState::default();
        repo.save(&state).unwrap();
        state.currency = 10;
        repo.save(&state).unwrap();

        assert_eq!(repo.load().unwrap(), Some(state));
        assert_eq!(repo.save_count(), 2);

        repo.clear().unwrap();
        assert!(!repo.exists());
    }
}
