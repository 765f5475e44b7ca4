use serde::{Deserialize, Serialize};

use crate::document::{Document, InlineUnit, Node, Point};
use crate::record::ActionRecordId;

/// A word the host offers for autocompletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAction {
    pub word: String,
    #[serde(default)]
    pub hint: String,
}

impl RegisteredAction {
    pub fn new(word: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            hint: hint.into(),
        }
    }
}

/// Overlay anchor in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coords {
    pub x: f32,
    pub y: f32,
}

impl Coords {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionPhase {
    Idle,
    Browsing,
    Filtering,
    InlineEditing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionState {
    pub visible: bool,
    /// Keeps the menu open during inline editing even with no matches.
    pub force_visible: bool,
    pub query: String,
    pub items: Vec<RegisteredAction>,
    pub selected_index: Option<usize>,
    pub editing_node_id: Option<ActionRecordId>,
    pub coords: Option<Coords>,
}

/// What the caret position means for the suggestion menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaretContext {
    /// Touching a drag placeholder; suggestions must not react.
    NearPlaceholder,
    /// Text run back to the nearest action boundary or whitespace.
    Query(String),
}

pub fn caret_context(doc: &Document, caret: Point) -> CaretContext {
    let Some(paragraph) = doc.paragraph(caret.block) else {
        return CaretContext::Query(String::new());
    };

    if is_placeholder(paragraph.unit_before(caret.offset))
        || is_placeholder(paragraph.unit_after(caret.offset))
    {
        return CaretContext::NearPlaceholder;
    }

    let mut reversed = Vec::new();
    let mut offset = caret.offset;
    while let Some(InlineUnit::Char(ch)) = paragraph.unit_before(offset) {
        if ch.is_whitespace() {
            break;
        }
        reversed.push(ch);
        offset -= 1;
    }
    CaretContext::Query(reversed.into_iter().rev().collect())
}

fn is_placeholder(unit: Option<InlineUnit<'_>>) -> bool {
    matches!(unit, Some(InlineUnit::Atom(Node::Placeholder(_))))
}

/// Drives the autocomplete overlay.
#[derive(Debug, Default)]
pub struct SuggestionController {
    registered: Vec<RegisteredAction>,
    state: SuggestionState,
    inline_original_word: Option<String>,
}

impl SuggestionController {
    pub fn new(registered: Vec<RegisteredAction>) -> Self {
        Self {
            registered,
            state: SuggestionState::default(),
            inline_original_word: None,
        }
    }

    pub fn registered(&self) -> &[RegisteredAction] {
        &self.registered
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    pub fn phase(&self) -> SuggestionPhase {
        if self.state.editing_node_id.is_some() {
            SuggestionPhase::InlineEditing
        } else if !self.state.visible {
            SuggestionPhase::Idle
        } else if self.state.query.is_empty() {
            SuggestionPhase::Browsing
        } else {
            SuggestionPhase::Filtering
        }
    }

    pub fn is_inline_editing(&self) -> bool {
        self.state.editing_node_id.is_some()
    }

    /// Case-insensitive substring match on `word`; an empty query matches all.
    pub fn filter(&self, query: &str) -> Vec<RegisteredAction> {
        let needle = query.to_lowercase();
        self.registered
            .iter()
            .filter(|action| action.word.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn hint_for(&self, word: &str) -> Option<&str> {
        self.registered
            .iter()
            .find(|action| action.word == word)
            .map(|action| action.hint.as_str())
            .filter(|hint| !hint.is_empty())
    }

    /// Fresh browsing session showing every registered action.
    pub fn open_browsing(&mut self, coords: Option<Coords>) {
        let items = self.registered.clone();
        self.inline_original_word = None;
        self.state = SuggestionState {
            visible: !items.is_empty(),
            force_visible: false,
            query: String::new(),
            items,
            selected_index: None,
            editing_node_id: None,
            coords,
        };
    }

    /// Recomputes the candidate list for a query typed in the document.
    ///
    /// An empty query keeps an open menu in browsing mode and leaves a closed
    /// one closed. The query is retained even when nothing matches.
    pub fn set_query(&mut self, query: String, coords: Option<Coords>) {
        if query != self.state.query {
            self.state.selected_index = None;
        }
        if coords.is_some() {
            self.state.coords = coords;
        }
        if query.is_empty() {
            if self.state.visible {
                self.state.items = self.registered.clone();
                self.state.visible = !self.state.items.is_empty() || self.state.force_visible;
            }
            self.state.query = query;
            return;
        }
        self.state.items = self.filter(&query);
        self.state.visible = !self.state.items.is_empty() || self.state.force_visible;
        self.state.query = query;
        if self
            .state
            .selected_index
            .is_some_and(|ix| ix >= self.state.items.len())
        {
            self.state.selected_index = None;
        }
    }

    pub fn move_down(&mut self) -> bool {
        self.cycle(true)
    }

    pub fn move_up(&mut self) -> bool {
        self.cycle(false)
    }

    fn cycle(&mut self, forward: bool) -> bool {
        let len = self.state.items.len();
        if !self.state.visible || len == 0 {
            return false;
        }
        let next = match (self.state.selected_index, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(ix), true) => (ix + 1) % len,
            (Some(ix), false) => (ix + len - 1) % len,
        };
        self.state.selected_index = Some(next);
        true
    }

    pub fn select_index(&mut self, ix: usize) -> bool {
        if ix >= self.state.items.len() {
            return false;
        }
        self.state.selected_index = Some(ix);
        true
    }

    /// The highlighted item, only while the menu is showing.
    pub fn selected_item(&self) -> Option<&RegisteredAction> {
        if !self.state.visible {
            return None;
        }
        self.state
            .selected_index
            .and_then(|ix| self.state.items.get(ix))
    }

    pub fn hide(&mut self) {
        self.state = SuggestionState::default();
        self.inline_original_word = None;
    }

    pub fn begin_inline_edit(&mut self, id: ActionRecordId, word: &str, coords: Option<Coords>) {
        let items = self.filter(word);
        self.inline_original_word = Some(word.to_string());
        self.state = SuggestionState {
            visible: true,
            force_visible: true,
            query: word.to_string(),
            items,
            selected_index: None,
            editing_node_id: Some(id),
            coords,
        };
    }

    pub fn update_inline_query(&mut self, query: String) {
        if !self.is_inline_editing() {
            return;
        }
        self.set_query(query, None);
    }

    /// Ends inline editing, yielding the node id and the word to commit.
    pub fn finish_inline_edit(&mut self) -> Option<(ActionRecordId, String)> {
        let id = self.state.editing_node_id.clone()?;
        let word = match self.selected_item() {
            Some(item) => item.word.clone(),
            None => self.state.query.trim().to_string(),
        };
        self.hide();
        Some((id, word))
    }

    /// Abandons inline editing, yielding the node id and its original word.
    pub fn cancel_inline_edit(&mut self) -> Option<(ActionRecordId, String)> {
        let id = self.state.editing_node_id.clone()?;
        let original = self.inline_original_word.clone().unwrap_or_default();
        self.hide();
        Some((id, original))
    }
}
