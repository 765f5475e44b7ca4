//! What a rendered action node may read and call.

use crate::record::{ActionIdOption, ActionRecord, ActionRecordId, QualifierOption};
use crate::suggestion::Coords;

/// Read model for one inline action widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionNodeView {
    pub id: ActionRecordId,
    /// Position in the rendered list, placeholder included.
    pub index: usize,
    pub word: String,
    pub qualifier: String,
    pub qualifier_options: Vec<QualifierOption>,
    pub action_id: String,
    pub action_id_options: &'static [ActionIdOption],
    pub equation: String,
    pub equation_valid: bool,
    pub hint: Option<String>,
    pub read_only: bool,
    pub placeholder: bool,
    pub editing: bool,
}

impl ActionNodeView {
    pub fn qualifier_label(&self) -> &str {
        self.qualifier_options
            .iter()
            .find(|option| option.id == self.qualifier)
            .map(|option| option.label.as_str())
            .unwrap_or(self.qualifier.as_str())
    }

    pub fn action_id_label(&self) -> &str {
        self.action_id_options
            .iter()
            .find(|option| option.id == self.action_id)
            .map(|option| option.label)
            .unwrap_or(self.action_id.as_str())
    }

    pub(crate) fn from_record(record: &ActionRecord, index: usize) -> Self {
        Self {
            id: record.id.clone(),
            index,
            word: record.word.clone(),
            qualifier: record.qualifier.clone(),
            qualifier_options: Vec::new(),
            action_id: record.action_id.clone(),
            action_id_options: record.action_node_type.action_id_options(),
            equation: record.equation.clone(),
            equation_valid: record.equation_is_valid(),
            hint: None,
            read_only: false,
            placeholder: record.is_placeholder(),
            editing: false,
        }
    }
}

/// The calls a node widget makes. Every method is a silent no-op on
/// unknown ids and on read-only editors.
pub trait ActionNodeApi {
    fn node_views(&self) -> Vec<ActionNodeView>;
    fn update_word(&mut self, id: &ActionRecordId, word: &str) -> bool;
    fn update_qualifier(&mut self, id: &ActionRecordId, qualifier: &str) -> bool;
    fn update_action_id(&mut self, id: &ActionRecordId, action_id: &str) -> bool;
    fn update_equation(&mut self, id: &ActionRecordId, equation: &str) -> bool;
    fn remove_action(&mut self, id: &ActionRecordId) -> bool;
    fn begin_inline_edit(&mut self, id: &ActionRecordId, coords: Option<Coords>) -> bool;
    fn set_inline_query(&mut self, query: &str) -> bool;
    fn commit_inline_edit(&mut self) -> bool;
    fn cancel_inline_edit(&mut self) -> bool;
}
