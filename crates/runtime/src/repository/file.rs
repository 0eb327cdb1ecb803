//! File-based MetaRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use demonbane_core::MetaProgressionState;

use super::codec;
use super::error::{RepositoryError, Result};
use super::traits::MetaRepository;

/// File-based implementation of MetaRepository.
///
/// The snapshot lives in `meta.bin` under the base directory. Saves write a
/// temporary file first and rename it over the previous snapshot, so a crash
/// mid-save leaves the old snapshot intact.
pub struct FileMetaRepository {
    base_dir: PathBuf,
}

impl FileMetaRepository {
    pub const FILE_NAME: &'static str = "meta.bin";

    /// Create a new file-based repository, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.base_dir.join(Self::FILE_NAME)
    }
}

impl MetaRepository for FileMetaRepository {
    fn load(&self) -> Result<Option<MetaProgressionState>> {
        let path = self.snapshot_path();

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        let state = codec::decode(&bytes)?;

        tracing::debug!(
            runs = state.runs_finished,
            currency = state.currency,
            "Loaded meta state from {}",
            path.display()
        );

        Ok(Some(state))
    }

    fn save(&self, state: &MetaProgressionState) -> Result<()> {
        let path = self.snapshot_path();
        let temp_path = path.with_extension("bin.tmp");

        let bytes = codec::encode(state)?;
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved meta state to {}", path.display());

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.snapshot_path();

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted meta state at {}", path.display());
        }

        Ok(())
    }

    fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileMetaRepository::new(dir.path().join("saves")).unwrap();
        assert_eq!(repo.load().unwrap(), None);

        let mut state = MetaProgressionState::default();
        state.unlocks.insert("boss:flame_overlord".into());
        state.currency = 77;
        repo.save(&state).unwrap();

        assert!(repo.exists());
        assert!(!repo.snapshot_path().with_extension("bin.tmp").exists());

        let reopened = FileMetaRepository::new(dir.path().join("saves")).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(state));
    }

    #[test]
    fn corrupted_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileMetaRepository::new(dir.path()).unwrap();
        fs::write(repo.snapshot_path(), b"garbage").unwrap();
        assert!(matches!(
            repo.load(),
            Err(RepositoryError::CorruptedData(_))
        ));
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileMetaRepository::new(dir.path()).unwrap();
        repo.save(&MetaProgressionState::default()).unwrap();
        repo.clear().unwrap();
        assert!(!repo.exists());
        repo.clear().unwrap();
    }
}
