//! Notifications from an editor back to its host.

use std::fmt;
use std::rc::Rc;

use crate::dnd::{DragItem, EditorId};
use crate::record::{ActionRecord, ActionRecordId};

/// A same-editor reorder that was committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReorder {
    pub id: ActionRecordId,
    pub from: usize,
    pub to: usize,
}

/// One optional callback per mutation kind. Unset callbacks are skipped.
#[derive(Clone, Default)]
pub struct ActionEditorCallbacks {
    on_action_created: Option<Rc<dyn Fn(&ActionRecord)>>,
    on_action_deleted: Option<Rc<dyn Fn(&ActionRecordId)>>,
    on_qualifier_changed: Option<Rc<dyn Fn(&ActionRecordId, &str)>>,
    on_action_word_changed: Option<Rc<dyn Fn(&ActionRecordId, &str)>>,
    on_action_equation_changed: Option<Rc<dyn Fn(&ActionRecordId, &str)>>,
    on_action_id_changed: Option<Rc<dyn Fn(&ActionRecordId, &str)>>,
    on_action_reordered: Option<Rc<dyn Fn(&ActionReorder)>>,
    on_action_drop: Option<Rc<dyn Fn(&DragItem, &EditorId, usize)>>,
}

impl fmt::Debug for ActionEditorCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEditorCallbacks")
            .field("on_action_created", &self.on_action_created.is_some())
            .field("on_action_deleted", &self.on_action_deleted.is_some())
            .field("on_qualifier_changed", &self.on_qualifier_changed.is_some())
            .field("on_action_word_changed", &self.on_action_word_changed.is_some())
            .field(
                "on_action_equation_changed",
                &self.on_action_equation_changed.is_some(),
            )
            .field("on_action_id_changed", &self.on_action_id_changed.is_some())
            .field("on_action_reordered", &self.on_action_reordered.is_some())
            .field("on_action_drop", &self.on_action_drop.is_some())
            .finish()
    }
}

impl ActionEditorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_action_created(mut self, f: impl Fn(&ActionRecord) + 'static) -> Self {
        self.on_action_created = Some(Rc::new(f));
        self
    }

    pub fn on_action_deleted(mut self, f: impl Fn(&ActionRecordId) + 'static) -> Self {
        self.on_action_deleted = Some(Rc::new(f));
        self
    }

    pub fn on_qualifier_changed(mut self, f: impl Fn(&ActionRecordId, &str) + 'static) -> Self {
        self.on_qualifier_changed = Some(Rc::new(f));
        self
    }

    pub fn on_action_word_changed(mut self, f: impl Fn(&ActionRecordId, &str) + 'static) -> Self {
        self.on_action_word_changed = Some(Rc::new(f));
        self
    }

    pub fn on_action_equation_changed(
        mut self,
        f: impl Fn(&ActionRecordId, &str) + 'static,
    ) -> Self {
        self.on_action_equation_changed = Some(Rc::new(f));
        self
    }

    pub fn on_action_id_changed(mut self, f: impl Fn(&ActionRecordId, &str) + 'static) -> Self {
        self.on_action_id_changed = Some(Rc::new(f));
        self
    }

    pub fn on_action_reordered(mut self, f: impl Fn(&ActionReorder) + 'static) -> Self {
        self.on_action_reordered = Some(Rc::new(f));
        self
    }

    /// Cross-editor drop: the item, the target editor, and the target index.
    pub fn on_action_drop(mut self, f: impl Fn(&DragItem, &EditorId, usize) + 'static) -> Self {
        self.on_action_drop = Some(Rc::new(f));
        self
    }

    pub(crate) fn action_created(&self, record: &ActionRecord) {
        if let Some(f) = self.on_action_created.as_ref() {
            f(record);
        }
    }

    pub(crate) fn action_deleted(&self, id: &ActionRecordId) {
        if let Some(f) = self.on_action_deleted.as_ref() {
            f(id);
        }
    }

    pub(crate) fn qualifier_changed(&self, id: &ActionRecordId, qualifier: &str) {
        if let Some(f) = self.on_qualifier_changed.as_ref() {
            f(id, qualifier);
        }
    }

    pub(crate) fn word_changed(&self, id: &ActionRecordId, word: &str) {
        if let Some(f) = self.on_action_word_changed.as_ref() {
            f(id, word);
        }
    }

    pub(crate) fn equation_changed(&self, id: &ActionRecordId, equation: &str) {
        if let Some(f) = self.on_action_equation_changed.as_ref() {
            f(id, equation);
        }
    }

    pub(crate) fn action_id_changed(&self, id: &ActionRecordId, action_id: &str) {
        if let Some(f) = self.on_action_id_changed.as_ref() {
            f(id, action_id);
        }
    }

    pub(crate) fn reordered(&self, reorder: &ActionReorder) {
        if let Some(f) = self.on_action_reordered.as_ref() {
            f(reorder);
        }
    }

    pub(crate) fn dropped(&self, item: &DragItem, target: &EditorId, index: usize) {
        if let Some(f) = self.on_action_drop.as_ref() {
            f(item, target, index);
        }
    }
}
