//! Persistence seam for the roster.
//!
//! The policy engine never touches storage; the presentation layer loads a
//! [`Roster`] through an [`AttendanceStore`], mutates it, and saves it back.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::backup::BackupError;
use crate::roster::Roster;
use std::path::PathBuf;

/// Storage abstraction so commands can be exercised without touching disk.
pub trait AttendanceStore {
    fn load(&self) -> Result<Roster, StoreError>;
    fn save(&self, roster: &Roster) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid attendance document: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: BackupError,
    },
    #[error(transparent)]
    Encode(#[from] BackupError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
