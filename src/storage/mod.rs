pub mod local;

pub use local::JsonFileStore;

use crate::types::Board;

/// Abstract board store. The sync engine never touches storage directly;
/// it consumes and produces snapshots, and the caller decides when to
/// persist them through an implementation of this trait.
pub trait BoardStore: Send + Sync {
    /// Load the persisted board. `Ok(None)` means nothing has been saved
    /// yet (first launch).
    fn load(&self) -> Result<Option<Board>, StoreError>;

    /// Persist a full board snapshot.
    fn save(&self, board: &Board) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored board is not valid: {0}")]
    InvalidBoard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
