/// JSON-file board store.
///
/// Writes are atomic: the snapshot goes to a `.tmp` sibling first, then a
/// rename swaps it into place, so a crash mid-write never leaves a
/// half-written board behind.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{BoardStore, StoreError};
use crate::types::Board;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BoardStore for JsonFileStore {
    fn load(&self) -> Result<Option<Board>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let board = serde_json::from_str::<Board>(&content)
            .map_err(|e| StoreError::InvalidBoard(e.to_string()))?;
        log::debug!(
            "[boardsync.storage] loaded {} cards from {}",
            board.card_count(),
            self.path.display()
        );
        Ok(Some(board))
    }

    fn save(&self, board: &Board) -> Result<(), StoreError> {
        let content = serde_json::to_string(board)
            .map_err(|e| StoreError::InvalidBoard(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        log::debug!(
            "[boardsync.storage] saved {} cards to {}",
            board.card_count(),
            self.path.display()
        );
        Ok(())
    }
}
