//! Repository layer for data that survives a run.
//!
//! Only the meta-progression snapshot is persisted. Run state is transient
//! and discarded when the run ends. Static content comes from
//! `demonbane-content`, not from repositories.

pub mod codec;
mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileMetaRepository;
pub use memory::InMemoryMetaRepository;
pub use traits::MetaRepository;
