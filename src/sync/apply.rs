use super::diff::{CardPatch, PatchSet};
/// Merge an inbound patch set into the current board.
///
/// Order is fixed to make the result independent of patch ordering:
/// deletions first, then change records. The whole merge builds a new board
/// and returns it; the caller's snapshot is never touched, so a failed or
/// cancelled import leaves everything as it was.
use crate::types::{Board, Card};

/// Apply a patch set to a board, producing the merged board.
///
/// A change record whose target lane does not exist on this board is
/// dropped: it must not abort the merge or disturb any existing copy of
/// that card. Records encode absolute field values, so applying the same
/// patch twice yields the same board as applying it once.
pub fn apply_patch(current: &Board, patch: &PatchSet) -> Board {
    let mut board = current.clone();

    for id in &patch.deleted_card_ids {
        if board.remove_card(id).is_some() {
            log::debug!("[boardsync.apply] deleted card {}", id);
        }
    }

    for rec in &patch.updated_cards {
        let existing_lane = board
            .find_card(&rec.id)
            .map(|(lane, _)| lane.id.clone());

        // Membership resolution: the record's laneId, else its status hint,
        // else wherever the card already lives, else the intake lane.
        let target = rec
            .lane_id
            .clone()
            .or_else(|| rec.status.clone())
            .or(existing_lane)
            .or_else(|| board.intake_lane_id().map(str::to_string));

        let Some(target) = target else {
            log::warn!("[boardsync.apply] no lane for card {}, record dropped", rec.id);
            continue;
        };
        if board.lane(&target).is_none() {
            // Dangling reference: resolve per-record, never globally.
            log::warn!(
                "[boardsync.apply] card {} names unknown lane '{}', record dropped",
                rec.id,
                target
            );
            continue;
        }

        let existing = board.remove_card(&rec.id);
        let merged = merge_card(existing, rec, &target);
        if let Some(lane) = board.lane_mut(&target) {
            lane.cards.push(merged);
        }
    }

    board
}

/// Three-tier per-card merge: creation defaults, overlaid by the existing
/// card's values, overlaid by the fields the record explicitly carries.
/// The merged card's `status` always equals the lane it lands in.
pub fn merge_card(existing: Option<Card>, rec: &CardPatch, lane_id: &str) -> Card {
    let base = existing.unwrap_or_else(|| Card::new(rec.id.clone(), ""));
    Card {
        id: base.id,
        title: rec.title.clone().unwrap_or(base.title),
        description: rec.description.clone().unwrap_or(base.description),
        category: rec.category.clone().unwrap_or(base.category),
        status: lane_id.to_string(),
        priority: rec.priority.map(|p| p.clamp(1, 5)).unwrap_or(base.priority),
        tags: rec.tags.clone().unwrap_or(base.tags),
        comments: rec.comments.clone().unwrap_or(base.comments),
        due_date: rec.due_date.unwrap_or(base.due_date),
        created_date: rec.created_date.unwrap_or(base.created_date),
        updated_date: rec.updated_date.unwrap_or(base.updated_date),
        is_minimized: rec.is_minimized.unwrap_or(base.is_minimized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::diff::compute_diff;
    use crate::types::{Lane, LANE_BACKLOG, LANE_IN_PROGRESS, LANE_ON_HOLD};
    use chrono::{Duration, Utc};

    fn make_card(id: &str, title: &str, priority: u8) -> Card {
        let mut card = Card::new(id, title);
        card.priority = priority;
        card
    }

    fn make_board(lanes: Vec<(&str, Vec<Card>)>) -> Board {
        Board {
            lanes: lanes
                .into_iter()
                .map(|(id, mut cards)| {
                    for c in &mut cards {
                        c.status = id.to_string();
                    }
                    Lane {
                        id: id.to_string(),
                        title: id.to_string(),
                        cards,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn test_apply_empty_patch_is_noop() {
        let board = make_board(vec![(LANE_BACKLOG, vec![make_card("1", "Task", 2)])]);
        let merged = apply_patch(&board, &PatchSet::default());
        assert_eq!(merged, board);
    }

    #[test]
    fn test_apply_deletion_removes_from_whatever_lane() {
        let board = make_board(vec![
            (LANE_BACKLOG, vec![]),
            (LANE_ON_HOLD, vec![make_card("1", "Task", 1)]),
        ]);
        let patch = PatchSet {
            updated_cards: vec![],
            deleted_card_ids: vec!["1".to_string()],
        };
        let merged = apply_patch(&board, &patch);
        assert!(merged.find_card("1").is_none());
    }

    #[test]
    fn test_apply_move_relocates_without_touching_fields() {
        let mut card = make_card("1", "Task", 4);
        card.tags.insert("keep".to_string());
        let board = make_board(vec![
            (LANE_BACKLOG, vec![card]),
            (LANE_IN_PROGRESS, vec![]),
        ]);
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "1".to_string(),
                lane_id: Some(LANE_IN_PROGRESS.to_string()),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec![],
        };
        let merged = apply_patch(&board, &patch);
        let (lane, moved) = merged.find_card("1").unwrap();
        assert_eq!(lane.id, LANE_IN_PROGRESS);
        assert_eq!(moved.status, LANE_IN_PROGRESS);
        assert_eq!(moved.title, "Task");
        assert_eq!(moved.priority, 4);
        assert!(moved.tags.contains("keep"));
    }

    #[test]
    fn test_apply_creates_unknown_card_with_defaults() {
        let board = make_board(vec![(LANE_BACKLOG, vec![])]);
        let before = Utc::now();
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "new".to_string(),
                title: Some("From peer".to_string()),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec![],
        };
        let merged = apply_patch(&board, &patch);
        let (lane, card) = merged.find_card("new").unwrap();
        // No membership known: lands in the intake lane.
        assert_eq!(lane.id, LANE_BACKLOG);
        assert_eq!(card.title, "From peer");
        assert_eq!(card.description, "");
        assert_eq!(card.priority, 1);
        assert!(card.tags.is_empty());
        assert!(card.comments.is_empty());
        assert!(card.created_date >= before);
    }

    #[test]
    fn test_apply_dangling_lane_record_is_dropped() {
        let board = make_board(vec![(LANE_BACKLOG, vec![make_card("1", "Task", 1)])]);
        let patch = PatchSet {
            updated_cards: vec![
                CardPatch {
                    id: "1".to_string(),
                    lane_id: Some("Does Not Exist".to_string()),
                    title: Some("changed".to_string()),
                    ..CardPatch::default()
                },
                CardPatch {
                    id: "2".to_string(),
                    title: Some("fine".to_string()),
                    ..CardPatch::default()
                },
            ],
            deleted_card_ids: vec![],
        };
        let merged = apply_patch(&board, &patch);
        // The dangling record must not remove or alter the existing card,
        // and must not abort the rest of the merge.
        let (lane, card) = merged.find_card("1").unwrap();
        assert_eq!(lane.id, LANE_BACKLOG);
        assert_eq!(card.title, "Task");
        assert!(merged.find_card("2").is_some());
    }

    #[test]
    fn test_apply_status_hint_used_when_lane_id_absent() {
        let board = make_board(vec![
            (LANE_BACKLOG, vec![make_card("1", "Task", 1)]),
            (LANE_ON_HOLD, vec![]),
        ]);
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "1".to_string(),
                status: Some(LANE_ON_HOLD.to_string()),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec![],
        };
        let merged = apply_patch(&board, &patch);
        assert_eq!(merged.find_card("1").unwrap().0.id, LANE_ON_HOLD);
    }

    #[test]
    fn test_apply_twice_equals_apply_once() {
        let board = make_board(vec![
            (LANE_BACKLOG, vec![make_card("1", "Task", 1)]),
            (LANE_IN_PROGRESS, vec![]),
        ]);
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "1".to_string(),
                lane_id: Some(LANE_IN_PROGRESS.to_string()),
                priority: Some(3),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec![],
        };
        let once = apply_patch(&board, &patch);
        let twice = apply_patch(&once, &patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_clamps_out_of_range_priority() {
        let board = make_board(vec![(LANE_BACKLOG, vec![make_card("1", "Task", 1)])]);
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "1".to_string(),
                priority: Some(9),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec![],
        };
        let merged = apply_patch(&board, &patch);
        assert_eq!(merged.find_card("1").unwrap().1.priority, 5);
    }

    #[test]
    fn test_round_trip_diff_then_apply_reproduces_current() {
        let base_card = make_card("1", "Original", 1);
        let mut other = make_card("2", "Steady", 2);
        other.tags.insert("t".to_string());
        let baseline = make_board(vec![
            (LANE_BACKLOG, vec![base_card.clone(), other.clone()]),
            (LANE_IN_PROGRESS, vec![]),
            (LANE_ON_HOLD, vec![make_card("3", "Doomed", 3)]),
        ]);

        // Edits: move card 1 with a title and date change, delete card 3,
        // add card 4.
        let mut edited = base_card;
        edited.title = "Renamed".to_string();
        edited.due_date = Utc::now() + Duration::days(7);
        edited.updated_date = Utc::now() + Duration::seconds(5);
        edited.status = LANE_IN_PROGRESS.to_string();
        let mut added = make_card("4", "Brand new", 5);
        added.comments.push(crate::types::Comment {
            id: "c1".to_string(),
            text: "hello".to_string(),
            commenter: "me".to_string(),
            timestamp: Utc::now(),
        });
        let current = make_board(vec![
            (LANE_BACKLOG, vec![other]),
            (LANE_IN_PROGRESS, vec![edited, added]),
            (LANE_ON_HOLD, vec![]),
        ]);

        let patch = compute_diff(&current, &baseline);
        let merged = apply_patch(&baseline, &patch);

        assert_eq!(merged.card_count(), current.card_count());
        for lane in &current.lanes {
            for card in &lane.cards {
                let (got_lane, got) = merged.find_card(&card.id).unwrap();
                assert_eq!(got_lane.id, lane.id, "card {} lane", card.id);
                assert_eq!(got, card, "card {} fields", card.id);
            }
        }
        assert!(merged.find_card("3").is_none());
    }

    #[test]
    fn test_delete_and_update_of_same_id_is_deterministic() {
        // Deletions run first, so a patch that both deletes and updates a
        // card ends with the card recreated from the record.
        let board = make_board(vec![(LANE_BACKLOG, vec![make_card("1", "Old", 2)])]);
        let patch = PatchSet {
            updated_cards: vec![CardPatch {
                id: "1".to_string(),
                title: Some("Recreated".to_string()),
                ..CardPatch::default()
            }],
            deleted_card_ids: vec!["1".to_string()],
        };
        let merged = apply_patch(&board, &patch);
        let (_, card) = merged.find_card("1").unwrap();
        assert_eq!(card.title, "Recreated");
        // The old copy is gone: defaults, not the old field values.
        assert_eq!(card.priority, 1);
    }
}
