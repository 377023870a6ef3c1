//! Offline synchronization core for a single-user task board.
//!
//! The board lives on devices that cannot share a live connection; state
//! moves between them through a one-shot text channel (a QR code or pasted
//! text) or a passphrase-encrypted file archive. This crate owns the pure
//! parts of that problem: computing a minimal patch between two board
//! snapshots, merging a patch into a possibly-diverged board, classifying
//! and (de)serializing channel payloads against the visual-channel size
//! limit, and the encrypted archive format. Rendering, scanning and storage
//! policy belong to the caller; boards are passed in and out by value.

pub mod codec;
pub mod storage;
pub mod sync;
pub mod types;

pub use codec::archive::{backup, backup_file_name, restore, ArchiveError};
pub use codec::channel::{decode, encode_board, encode_patch, CodecError, Decoded, Encoded, QR_MAX_CHARS};
pub use storage::{BoardStore, JsonFileStore, StoreError};
pub use sync::apply::apply_patch;
pub use sync::diff::{compute_diff, CardPatch, PatchSet};
pub use sync::{SyncEngine, SyncError};
pub use types::{Board, Card, Category, Comment, Lane};
