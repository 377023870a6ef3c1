pub mod apply;
pub mod diff;

use crate::codec::channel::{self, CodecError, Decoded, Encoded};
use crate::types::Board;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("payload is not a recognized patch or board")]
    UnrecognizedPayload,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Owner of the synchronization baseline: the board as of the last
/// successful export or import.
///
/// The baseline is the sole reference point for diff computation and must
/// only advance on confirmed success, so a failed or user-cancelled
/// exchange recomputes the same diff on retry. Losing the baseline (a fresh
/// engine over a populated board) degrades the next export to a full-board
/// description; correctness is unaffected.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    baseline: Board,
}

impl SyncEngine {
    /// Resume with a remembered baseline.
    pub fn new(baseline: Board) -> Self {
        SyncEngine { baseline }
    }

    /// Seed the baseline at first load, before any divergence exists.
    pub fn first_run(board: &Board) -> Self {
        SyncEngine {
            baseline: board.clone(),
        }
    }

    pub fn baseline(&self) -> &Board {
        &self.baseline
    }

    /// Compute the patch set since the baseline and encode it for the
    /// channel. Pure: the baseline does not advance until the caller
    /// confirms delivery via [`confirm_export`](Self::confirm_export).
    pub fn export(&self, current: &Board) -> Result<Encoded, SyncError> {
        let patch = diff::compute_diff(current, &self.baseline);
        Ok(channel::encode_patch(&patch)?)
    }

    /// Mark an export as delivered: the peer now has everything in
    /// `current`, so it becomes the new baseline.
    pub fn confirm_export(&mut self, current: &Board) {
        self.baseline = current.clone();
    }

    /// Decode an inbound payload and merge it into `current`. A patch is
    /// applied on top of the current board; a full board replaces it. On
    /// success the baseline advances to the merged result, which is
    /// returned for the caller to adopt and persist. On failure nothing
    /// moves.
    pub fn import(&mut self, current: &Board, text: &str) -> Result<Board, SyncError> {
        let merged = match channel::decode(text) {
            Decoded::Patch(patch) => apply::apply_patch(current, &patch),
            Decoded::Board(board) => board,
            Decoded::Invalid => return Err(SyncError::UnrecognizedPayload),
        };
        self.baseline = merged.clone();
        log::debug!(
            "[boardsync.sync] import merged, {} cards on board",
            merged.card_count()
        );
        Ok(merged)
    }
}
