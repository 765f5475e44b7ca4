use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel id carried by the drag placeholder. Never stored.
pub const PLACEHOLDER_ID: &str = "__drag_placeholder__";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRecordId(String);

impl ActionRecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, never reused id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_ID.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionRecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionIdOption {
    pub id: &'static str,
    pub label: &'static str,
}

const ITEM_ACTION_IDS: &[ActionIdOption] = &[
    ActionIdOption {
        id: "play",
        label: "Play",
    },
    ActionIdOption {
        id: "pause",
        label: "Pause",
    },
    ActionIdOption {
        id: "seek",
        label: "Seek",
    },
    ActionIdOption {
        id: "mute",
        label: "Mute",
    },
];

const PLAYLIST_ACTION_IDS: &[ActionIdOption] = &[
    ActionIdOption {
        id: "start",
        label: "Start playlist",
    },
    ActionIdOption {
        id: "stop",
        label: "Stop playlist",
    },
    ActionIdOption {
        id: "next",
        label: "Next item",
    },
    ActionIdOption {
        id: "shuffle",
        label: "Shuffle",
    },
];

/// The namespace an action belongs to. Each editor hosts exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    ItemActionNode,
    PlaylistActionNode,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::ItemActionNode => "ItemActionNode",
            NodeType::PlaylistActionNode => "PlaylistActionNode",
        }
    }

    pub fn action_id_options(self) -> &'static [ActionIdOption] {
        match self {
            NodeType::ItemActionNode => ITEM_ACTION_IDS,
            NodeType::PlaylistActionNode => PLAYLIST_ACTION_IDS,
        }
    }

    pub fn default_action_id(self) -> &'static str {
        self.action_id_options()
            .first()
            .map(|option| option.id)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierOption {
    pub id: String,
    pub label: String,
}

impl QualifierOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("incoming", "Incoming"),
            Self::new("outgoing", "Outgoing"),
            Self::new("scheduled", "Scheduled"),
        ]
    }
}

/// One structured tag. Serializes to the persisted shape
/// `{id, word, qualifier, equation, actionNodeType, actionId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: ActionRecordId,
    pub word: String,
    pub qualifier: String,
    #[serde(default)]
    pub equation: String,
    pub action_node_type: NodeType,
    pub action_id: String,
}

impl ActionRecord {
    pub fn new(word: impl Into<String>, qualifier: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: ActionRecordId::generate(),
            word: word.into(),
            qualifier: qualifier.into(),
            equation: String::new(),
            action_node_type: node_type,
            action_id: node_type.default_action_id().to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ActionRecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_equation(mut self, equation: impl Into<String>) -> Self {
        self.equation = equation.into();
        self
    }

    pub fn with_action_id(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = action_id.into();
        self
    }

    /// The transient stand-in shown at the drop location while `self` is dragged.
    pub fn placeholder_for(dragged: &ActionRecord) -> Self {
        Self {
            id: ActionRecordId::placeholder(),
            ..dragged.clone()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_placeholder()
    }

    pub fn equation_is_valid(&self) -> bool {
        is_valid_equation(&self.equation)
    }
}

/// `""`, or one of `=`, `<`, `>` optionally followed by a decimal number
/// without a redundant leading zero.
pub fn is_valid_equation(equation: &str) -> bool {
    let mut chars = equation.chars();
    let Some(op) = chars.next() else {
        return true;
    };
    if !matches!(op, '=' | '<' | '>') {
        return false;
    }
    let number = chars.as_str();
    number.is_empty() || is_decimal(number)
}

fn is_decimal(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int.len() > 1 && int.starts_with('0') {
        return false;
    }
    match frac {
        None => true,
        Some(frac) => !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Ordered list of records. Position is rendering and document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<ActionRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<ActionRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            store.push(record);
        }
        store
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &ActionRecordId) -> Option<&ActionRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn get_mut(&mut self, id: &ActionRecordId) -> Option<&mut ActionRecord> {
        self.records.iter_mut().find(|record| &record.id == id)
    }

    pub fn position(&self, id: &ActionRecordId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    pub fn contains(&self, id: &ActionRecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ActionRecordId> {
        self.records.iter().map(|record| &record.id)
    }

    /// Appends unless the id is already present or is the placeholder sentinel.
    pub fn push(&mut self, record: ActionRecord) -> bool {
        let index = self.records.len();
        self.insert(index, record)
    }

    /// Inserts at `index` (clamped to the end). Duplicate ids and the
    /// placeholder sentinel are rejected.
    pub fn insert(&mut self, index: usize, record: ActionRecord) -> bool {
        if record.is_placeholder() || self.contains(&record.id) {
            return false;
        }
        let index = index.min(self.records.len());
        self.records.insert(index, record);
        true
    }

    pub fn remove(&mut self, id: &ActionRecordId) -> Option<ActionRecord> {
        let ix = self.position(id)?;
        Some(self.records.remove(ix))
    }

    /// Moves the record at `from` to `to` (clamped). Returns the destination
    /// index when the order actually changed.
    pub fn reorder(&mut self, from: usize, to: usize) -> Option<usize> {
        if from >= self.records.len() {
            return None;
        }
        let to = to.min(self.records.len() - 1);
        if from == to {
            return None;
        }
        let record = self.records.remove(from);
        self.records.insert(to, record);
        Some(to)
    }

    pub fn replace_all(&mut self, records: Vec<ActionRecord>) {
        *self = Self::new(records);
    }

    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, word: &str) -> ActionRecord {
        ActionRecord::new(word, "incoming", NodeType::ItemActionNode).with_id(id)
    }

    fn ids(store: &RecordStore) -> Vec<&str> {
        store.ids().map(|id| id.as_str()).collect()
    }

    #[test]
    fn equation_grammar() {
        for valid in ["", "=", "=1", "<0.5", ">100", "=0", ">12.75"] {
            assert!(is_valid_equation(valid), "{valid:?} should be valid");
        }
        for invalid in ["=01", "abc", "=1.2.3", "1", "=1.", "=.5", "<-1", "= 1"] {
            assert!(!is_valid_equation(invalid), "{invalid:?} should be invalid");
        }
    }

    #[test]
    fn new_record_takes_first_action_id_of_its_type() {
        let item = ActionRecord::new("go", "incoming", NodeType::ItemActionNode);
        let playlist = ActionRecord::new("go", "incoming", NodeType::PlaylistActionNode);
        assert_eq!(item.action_id, "play");
        assert_eq!(playlist.action_id, "start");
        assert_ne!(item.id, playlist.id);
    }

    #[test]
    fn reorder_moves_record_and_reports_destination() {
        let mut store = RecordStore::new(vec![
            record("a", "A"),
            record("b", "B"),
            record("c", "C"),
        ]);
        assert_eq!(store.reorder(0, 2), Some(2));
        assert_eq!(ids(&store), vec!["b", "c", "a"]);
        assert_eq!(store.reorder(2, 99), None);
        assert_eq!(store.reorder(7, 0), None);
        assert_eq!(store.reorder(2, 0), Some(0));
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_rejects_duplicates_and_placeholders() {
        let mut store = RecordStore::new(vec![record("a", "A")]);
        assert!(!store.push(record("a", "again")));
        assert!(!store.push(ActionRecord::placeholder_for(&record("z", "Z"))));
        assert!(store.insert(0, record("b", "B")));
        assert_eq!(ids(&store), vec!["b", "a"]);
    }
}
