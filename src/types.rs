use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The fixed set of lanes on a standard board. Synchronization never creates
/// or destroys lanes; only card membership changes.
pub const LANE_BACKLOG: &str = "Backlog";
pub const LANE_IN_PROGRESS: &str = "In Progress";
pub const LANE_ON_HOLD: &str = "On Hold";
pub const LANE_COMPLETE: &str = "Complete";
pub const LANE_ARCHIVED: &str = "Archived";

/// Card category. Closed set; unknown inbound strings fold to `Other` so a
/// payload from a newer peer never fails to decode on this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Personal,
    WorkChs,
    WorkCargill,
    WorkRba,
    WorkOther,
    Church,
    OtherAglow,
    Politics,
    Urgent,
    Chat,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::WorkChs => "Work: CHS",
            Category::WorkCargill => "Work: Cargill",
            Category::WorkRba => "Work: RBA",
            Category::WorkOther => "Work: Other",
            Category::Church => "Church",
            Category::OtherAglow => "Other: Aglow",
            Category::Politics => "Politics",
            Category::Urgent => "Urgent",
            Category::Chat => "CHAT",
            Category::Other => "Other",
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Personal" => Category::Personal,
            "Work: CHS" => Category::WorkChs,
            "Work: Cargill" => Category::WorkCargill,
            "Work: RBA" => Category::WorkRba,
            "Work: Other" => Category::WorkOther,
            "Church" => Category::Church,
            "Other: Aglow" => Category::OtherAglow,
            "Politics" => Category::Politics,
            "Urgent" => Category::Urgent,
            "CHAT" => Category::Chat,
            _ => Category::Other,
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Personal
    }
}

/// A comment on a card. Carried opaquely by the sync engine: diffed as a
/// whole list by value, never merged element-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub commenter: String,
    #[serde(default = "Utc::now", deserialize_with = "ts::lenient")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    /// Lane membership. Always equals the id of the lane holding the card.
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default = "Utc::now", deserialize_with = "ts::lenient")]
    pub due_date: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "ts::lenient")]
    pub created_date: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "ts::lenient")]
    pub updated_date: DateTime<Utc>,
    #[serde(default)]
    pub is_minimized: bool,
}

fn default_priority() -> u8 {
    1
}

impl Card {
    /// A fresh card with creation defaults: empty text fields, priority 1,
    /// empty tag/comment collections, all timestamps now, intake status.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Card {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: Category::default(),
            status: LANE_BACKLOG.to_string(),
            priority: 1,
            tags: BTreeSet::new(),
            comments: Vec::new(),
            due_date: now,
            created_date: now,
            updated_date: now,
            is_minimized: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Lane {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Lane {
            title: id.clone(),
            id,
            cards: Vec::new(),
        }
    }
}

/// The full board state: an ordered sequence of lanes. Serializes as the
/// bare lane array, matching the full-board wire payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub lanes: Vec<Lane>,
}

impl Board {
    /// The standard five-lane board used at first launch.
    pub fn standard() -> Self {
        Board {
            lanes: [
                LANE_BACKLOG,
                LANE_IN_PROGRESS,
                LANE_ON_HOLD,
                LANE_COMPLETE,
                LANE_ARCHIVED,
            ]
            .into_iter()
            .map(Lane::new)
            .collect(),
        }
    }

    pub fn lane(&self, lane_id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == lane_id)
    }

    pub fn lane_mut(&mut self, lane_id: &str) -> Option<&mut Lane> {
        self.lanes.iter_mut().find(|l| l.id == lane_id)
    }

    /// The lane new cards land in: the first lane on the board.
    pub fn intake_lane_id(&self) -> Option<&str> {
        self.lanes.first().map(|l| l.id.as_str())
    }

    pub fn find_card(&self, card_id: &str) -> Option<(&Lane, &Card)> {
        self.lanes.iter().find_map(|lane| {
            lane.cards
                .iter()
                .find(|c| c.id == card_id)
                .map(|c| (lane, c))
        })
    }

    /// Position of a card as (lane index, card index).
    pub(crate) fn locate(&self, card_id: &str) -> Option<(usize, usize)> {
        self.lanes.iter().enumerate().find_map(|(li, lane)| {
            lane.cards
                .iter()
                .position(|c| c.id == card_id)
                .map(|ci| (li, ci))
        })
    }

    /// Remove a card from whichever lane holds it.
    pub fn remove_card(&mut self, card_id: &str) -> Option<Card> {
        let (li, ci) = self.locate(card_id)?;
        Some(self.lanes[li].cards.remove(ci))
    }

    /// Insert a new card at the front of the intake lane.
    pub fn add_card(&mut self, mut card: Card) {
        if let Some(lane) = self.lanes.first_mut() {
            card.status = lane.id.clone();
            lane.cards.insert(0, card);
        }
    }

    /// Bulk insert at the front of the intake lane, preserving order.
    pub fn add_cards(&mut self, cards: Vec<Card>) {
        for card in cards.into_iter().rev() {
            self.add_card(card);
        }
    }

    /// Move a card to another lane, keeping `status` in agreement. Landing
    /// in Complete or Archived minimizes the card; In Progress maximizes it.
    /// Returns false if the card or the target lane does not exist.
    pub fn move_card(&mut self, card_id: &str, lane_id: &str) -> bool {
        if self.lane(lane_id).is_none() {
            return false;
        }
        let Some(mut card) = self.remove_card(card_id) else {
            return false;
        };
        card.status = lane_id.to_string();
        match lane_id {
            LANE_COMPLETE | LANE_ARCHIVED => card.is_minimized = true,
            LANE_IN_PROGRESS => card.is_minimized = false,
            _ => {}
        }
        card.updated_date = Utc::now();
        if let Some(lane) = self.lane_mut(lane_id) {
            lane.cards.push(card);
        }
        true
    }

    pub fn card_count(&self) -> usize {
        self.lanes.iter().map(|l| l.cards.len()).sum()
    }
}

static ID_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Generate a new card id (9 hex chars). An atomic counter combined with a
/// nanosecond timestamp, hashed via SHA-256 for uniform distribution.
pub fn generate_card_id() -> String {
    use sha2::{Digest, Sha256};
    let seq = ID_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(ts.to_le_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..5])[..9].to_string()
}

/// Lenient timestamp decoding. Payloads produced by older peers carry dates
/// as strings and may omit or garble them; a bad date must not fail the
/// whole decode, it falls back to the current time.
pub(crate) mod ts {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    fn parse(raw: &serde_json::Value) -> Option<DateTime<Utc>> {
        raw.as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    /// Missing, null or unparseable -> now.
    pub fn lenient<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(d)?;
        Ok(raw.as_ref().and_then(parse).unwrap_or_else(Utc::now))
    }

    /// Missing or null -> None (field untouched by the patch); present but
    /// unparseable -> now.
    pub fn lenient_opt<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(d)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => Some(parse(&v).unwrap_or_else(Utc::now)),
        })
    }
}
