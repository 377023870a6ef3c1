use crate::types::{ts, Board, Card, Category, Comment};
/// Card-level diff between the current board and the synchronization
/// baseline.
///
/// Flattens both boards into id -> (card, lane) maps and emits one change
/// record per card whose tracked fields differ, carrying only the fields
/// that changed. Lane membership is emitted as a dedicated `laneId` field
/// whenever it changes, even if nothing else did — that is how moves travel
/// over the channel. Cards present only in the baseline land in the
/// deletion list.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The wire/transport artifact: built fresh for each export, consumed
/// immediately on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    pub updated_cards: Vec<CardPatch>,
    pub deleted_card_ids: Vec<String>,
}

impl PatchSet {
    pub fn is_empty(&self) -> bool {
        self.updated_cards.is_empty() && self.deleted_card_ids.is_empty()
    }
}

/// A per-card change record. Every field except `id` is optional; absent
/// means "unchanged on the sending side". Values are absolute, not deltas,
/// so applying a record twice is harmless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Membership hint from foreign producers; the diff engine itself only
    /// emits `lane_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ts::lenient_opt"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ts::lenient_opt"
    )]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ts::lenient_opt"
    )]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_minimized: Option<bool>,
}

impl CardPatch {
    /// A record describing a card the receiver has never seen: every
    /// tracked field present.
    fn full(card: &Card, lane_id: &str) -> Self {
        CardPatch {
            id: card.id.clone(),
            lane_id: Some(lane_id.to_string()),
            title: Some(card.title.clone()),
            description: Some(card.description.clone()),
            category: Some(card.category.clone()),
            status: None,
            priority: Some(card.priority),
            tags: Some(card.tags.clone()),
            comments: Some(card.comments.clone()),
            due_date: Some(card.due_date),
            created_date: Some(card.created_date),
            updated_date: Some(card.updated_date),
            is_minimized: Some(card.is_minimized),
        }
    }

    /// A record carrying only the fields that differ from `base`. Returns
    /// None when nothing tracked changed.
    fn delta(card: &Card, lane_id: &str, base: &Card, base_lane: &str) -> Option<Self> {
        let mut patch = CardPatch {
            id: card.id.clone(),
            ..CardPatch::default()
        };
        let mut changed = false;

        if lane_id != base_lane {
            patch.lane_id = Some(lane_id.to_string());
            changed = true;
        }
        if card.title != base.title {
            patch.title = Some(card.title.clone());
            changed = true;
        }
        if card.description != base.description {
            patch.description = Some(card.description.clone());
            changed = true;
        }
        if card.category != base.category {
            patch.category = Some(card.category.clone());
            changed = true;
        }
        if card.priority != base.priority {
            patch.priority = Some(card.priority);
            changed = true;
        }
        if card.tags != base.tags {
            patch.tags = Some(card.tags.clone());
            changed = true;
        }
        if card.comments != base.comments {
            patch.comments = Some(card.comments.clone());
            changed = true;
        }
        if card.due_date != base.due_date {
            patch.due_date = Some(card.due_date);
            changed = true;
        }
        if card.created_date != base.created_date {
            patch.created_date = Some(card.created_date);
            changed = true;
        }
        if card.updated_date != base.updated_date {
            patch.updated_date = Some(card.updated_date);
            changed = true;
        }
        if card.is_minimized != base.is_minimized {
            patch.is_minimized = Some(card.is_minimized);
            changed = true;
        }

        changed.then_some(patch)
    }
}

/// Build a map of card id -> (card, containing lane id) from a board.
fn flatten(board: &Board) -> HashMap<&str, (&Card, &str)> {
    let mut map = HashMap::new();
    for lane in &board.lanes {
        for card in &lane.cards {
            map.insert(card.id.as_str(), (card, lane.id.as_str()));
        }
    }
    map
}

/// Compute the minimal patch set describing how `current` differs from
/// `baseline`. Diffing a board against itself yields an empty patch set.
pub fn compute_diff(current: &Board, baseline: &Board) -> PatchSet {
    let base_map = flatten(baseline);
    let cur_map = flatten(current);

    let mut patch = PatchSet::default();

    // Updated and newly created cards, in board order for determinism.
    for lane in &current.lanes {
        for card in &lane.cards {
            match base_map.get(card.id.as_str()) {
                None => patch.updated_cards.push(CardPatch::full(card, &lane.id)),
                Some((base, base_lane)) => {
                    if let Some(rec) = CardPatch::delta(card, &lane.id, base, base_lane) {
                        patch.updated_cards.push(rec);
                    }
                }
            }
        }
    }

    // Cards present only in the baseline were deleted.
    for lane in &baseline.lanes {
        for card in &lane.cards {
            if !cur_map.contains_key(card.id.as_str()) {
                patch.deleted_card_ids.push(card.id.clone());
            }
        }
    }

    log::debug!(
        "[boardsync.diff] {} updated, {} deleted",
        patch.updated_cards.len(),
        patch.deleted_card_ids.len()
    );
    patch
}
