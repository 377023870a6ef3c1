use crate::sync::diff::PatchSet;
/// Text codec for the one-shot visual channel.
///
/// Payloads travel as JSON through a QR code or a pasted text box. The
/// channel has a hard ceiling: the largest commonly supported
/// error-corrected QR symbol holds roughly 2950 characters. Encoding never
/// fails on size — an oversize payload still yields text for copy/paste —
/// but the caller is told so it can refuse to render a scannable code and
/// steer the user to the file archive instead.
use crate::types::Board;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Conservative capacity of the visual channel, in characters.
pub const QR_MAX_CHARS: usize = 2950;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A serialized channel payload plus its size verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub text: String,
    /// True when the text exceeds the visual-channel capacity. The payload
    /// is still usable over a copy/paste or file channel.
    pub oversize: bool,
}

impl Encoded {
    pub fn fits_channel(&self) -> bool {
        !self.oversize
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Encoded, CodecError> {
    let text = serde_json::to_string(value)?;
    let oversize = text.chars().count() > QR_MAX_CHARS;
    if oversize {
        log::warn!(
            "[boardsync.codec] payload is {} chars, over the {} channel limit",
            text.chars().count(),
            QR_MAX_CHARS
        );
    }
    Ok(Encoded { text, oversize })
}

/// Serialize a patch set for the channel.
pub fn encode_patch(patch: &PatchSet) -> Result<Encoded, CodecError> {
    encode(patch)
}

/// Serialize a full board for the channel (the degraded no-baseline path).
pub fn encode_board(board: &Board) -> Result<Encoded, CodecError> {
    encode(board)
}

/// Classification of an inbound payload. Malformed input is a value, not a
/// panic or an error type: the caller reports it and moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Patch(PatchSet),
    Board(Board),
    Invalid,
}

/// Decode a channel payload, distinguishing the three shapes structurally:
/// an object carrying both `updatedCards` and `deletedCardIds` is a patch
/// set; an array of lane-shaped objects, or an object wrapping one under
/// `lanes`, is a full board; anything else is invalid.
pub fn decode(text: &str) -> Decoded {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Decoded::Invalid;
    };

    match &value {
        Value::Object(map) if map.contains_key("updatedCards") && map.contains_key("deletedCardIds") => {
            match serde_json::from_value::<PatchSet>(value) {
                Ok(patch) => Decoded::Patch(patch),
                Err(e) => {
                    log::warn!("[boardsync.codec] patch-shaped payload failed to parse: {}", e);
                    Decoded::Invalid
                }
            }
        }
        Value::Object(map) if map.contains_key("lanes") => decode_board(map["lanes"].clone()),
        Value::Array(_) => decode_board(value),
        _ => Decoded::Invalid,
    }
}

fn decode_board(value: Value) -> Decoded {
    let Value::Array(items) = &value else {
        return Decoded::Invalid;
    };
    // Every element must be lane-shaped; a bare array of something else is
    // not a board.
    if !items
        .iter()
        .all(|item| item.get("id").is_some() && item.get("cards").is_some())
    {
        return Decoded::Invalid;
    }
    match serde_json::from_value::<Board>(value) {
        Ok(board) => Decoded::Board(board),
        Err(e) => {
            log::warn!("[boardsync.codec] board-shaped payload failed to parse: {}", e);
            Decoded::Invalid
        }
    }
}
