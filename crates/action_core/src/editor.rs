use std::ops::Range;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::config::{ActionEditorConfig, ConfigError};
use crate::dnd::{DndCoordinator, DragItem, DropOutcome, EditorId, NodeBox, RenderedEntry};
use crate::document::{Document, Node, Point, Selection};
use crate::engine::{ApplyError, Engine};
use crate::host::{ActionEditorCallbacks, ActionReorder};
use crate::ops::{Op, Transaction};
use crate::record::{ActionRecord, ActionRecordId, NodeType, RecordStore};
use crate::renderer::{ActionNodeApi, ActionNodeView};
use crate::scanner::{self, UntrackedSegment};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::suggestion::{
    CaretContext, Coords, RegisteredAction, SuggestionController, SuggestionPhase,
    SuggestionState, caret_context,
};
use crate::sync::{self, ReentrancyGuard};
use crate::value::ActionList;

const INPUT_SOURCE: &str = "input";
const CONVERT_SOURCE: &str = "action:convert";

/// Deferred work owned by one editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTask {
    SyncContent,
    BlurSettle { query: String, converted: bool },
    ReleaseReentrancyGuard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Escape,
    Backspace,
    Delete,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    /// The editor did nothing; the caller applies the key's default
    /// (a literal space for [`Key::Space`]).
    PassThrough,
}

/// One inline action editor: record store, document, suggestions and drag
/// state for a single host-configured instance.
pub struct ActionEditor {
    config: ActionEditorConfig,
    callbacks: ActionEditorCallbacks,
    store: RecordStore,
    engine: Engine,
    suggestions: SuggestionController,
    dnd: DndCoordinator,
    scheduler: Scheduler<EditorTask>,
    guard: ReentrancyGuard,
    pending_sync: Option<TaskHandle>,
    pending_blur: Option<TaskHandle>,
    caret_coords: Option<Coords>,
    converted: bool,
}

impl ActionEditor {
    pub fn new(
        config: ActionEditorConfig,
        callbacks: ActionEditorCallbacks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = RecordStore::new(config.initial_actions.clone());
        let dnd = DndCoordinator::new(config.editor_id.clone(), config.node_type);
        let engine = Engine::new(sync::project(&dnd.rendered(store.records())));
        let suggestions = SuggestionController::new(config.registered_actions.clone());
        debug!(
            editor = %config.editor_id,
            node_type = config.node_type.as_str(),
            records = store.len(),
            "action editor created"
        );
        Ok(Self {
            config,
            callbacks,
            store,
            engine,
            suggestions,
            dnd,
            scheduler: Scheduler::new(),
            guard: ReentrancyGuard::default(),
            pending_sync: None,
            pending_blur: None,
            caret_coords: None,
            converted: false,
        })
    }

    pub fn config(&self) -> &ActionEditorConfig {
        &self.config
    }

    pub fn editor_id(&self) -> &EditorId {
        &self.config.editor_id
    }

    pub fn node_type(&self) -> NodeType {
        self.config.node_type
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[ActionRecord] {
        self.store.records()
    }

    pub fn document(&self) -> &Document {
        self.engine.doc()
    }

    pub fn selection(&self) -> &Selection {
        self.engine.selection()
    }

    pub fn caret(&self) -> Option<Point> {
        self.engine.caret()
    }

    pub fn is_focused(&self) -> bool {
        self.engine.is_focused()
    }

    pub fn is_destroyed(&self) -> bool {
        self.engine.is_destroyed()
    }

    pub fn registered_actions(&self) -> &[RegisteredAction] {
        self.suggestions.registered()
    }

    pub fn suggestion_state(&self) -> &SuggestionState {
        self.suggestions.state()
    }

    pub fn suggestion_phase(&self) -> SuggestionPhase {
        self.suggestions.phase()
    }

    pub fn dragged_over_index(&self) -> Option<usize> {
        self.dnd.dragged_over_index()
    }

    pub fn is_reentrancy_guarded(&self) -> bool {
        self.guard.is_engaged()
    }

    pub fn pending_task_count(&self) -> usize {
        self.scheduler.pending_len()
    }

    pub fn next_task_delay(&self) -> Option<Duration> {
        self.scheduler.next_delay()
    }

    pub fn has_pending_sync(&self) -> bool {
        self.pending_sync
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    /// Records plus the drag placeholder, in rendering order.
    pub fn rendered(&self) -> Vec<RenderedEntry> {
        self.dnd.rendered(self.store.records())
    }

    pub fn untracked_segments(&self) -> Vec<UntrackedSegment> {
        scanner::untracked_segments(self.engine.doc(), &self.store)
    }

    pub fn action_list(&self) -> ActionList {
        ActionList::from_store(&self.store)
    }

    pub fn node_views(&self) -> Vec<ActionNodeView> {
        let editing = self.suggestions.state().editing_node_id.as_ref();
        self.rendered()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let record = entry.record();
                let mut view = ActionNodeView::from_record(record, index);
                view.qualifier_options = self.config.qualifier_options.clone();
                view.hint = self.suggestions.hint_for(&record.word).map(str::to_string);
                view.read_only = self.config.read_only;
                view.editing = !view.placeholder && editing == Some(&record.id);
                view
            })
            .collect()
    }

    fn mutation_allowed(&self) -> bool {
        !self.config.read_only && !self.engine.is_destroyed()
    }

    // Mutation API

    /// Appends a record. An empty qualifier selects the configured default.
    pub fn add_action(&mut self, word: &str, qualifier: &str) -> Option<ActionRecordId> {
        if !self.mutation_allowed() {
            return None;
        }
        let word = word.trim();
        if word.is_empty() {
            trace!(editor = %self.config.editor_id, "ignored add with empty word");
            return None;
        }
        let record = self.new_record(word, qualifier);
        let id = record.id.clone();
        let index = self.store.len();
        self.insert_record(index, record).then_some(id)
    }

    pub fn update_word(&mut self, id: &ActionRecordId, word: &str) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let word = word.trim();
        if word.is_empty() {
            return false;
        }
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        if record.word == word {
            return false;
        }
        record.word = word.to_string();
        self.callbacks.word_changed(id, word);
        self.model_changed();
        true
    }

    pub fn update_qualifier(&mut self, id: &ActionRecordId, qualifier: &str) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        if !self
            .config
            .qualifier_options
            .iter()
            .any(|option| option.id == qualifier)
        {
            trace!(editor = %self.config.editor_id, qualifier, "ignored unknown qualifier");
            return false;
        }
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        if record.qualifier == qualifier {
            return false;
        }
        record.qualifier = qualifier.to_string();
        self.callbacks.qualifier_changed(id, qualifier);
        self.model_changed();
        true
    }

    pub fn update_action_id(&mut self, id: &ActionRecordId, action_id: &str) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        if !self
            .config
            .node_type
            .action_id_options()
            .iter()
            .any(|option| option.id == action_id)
        {
            trace!(editor = %self.config.editor_id, action_id, "ignored unknown action id");
            return false;
        }
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        if record.action_id == action_id {
            return false;
        }
        record.action_id = action_id.to_string();
        self.callbacks.action_id_changed(id, action_id);
        self.model_changed();
        true
    }

    /// Stores the raw value. Validity only affects how the node is drawn.
    pub fn update_equation(&mut self, id: &ActionRecordId, equation: &str) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        if record.equation == equation {
            return false;
        }
        record.equation = equation.to_string();
        if !record.equation_is_valid() {
            trace!(%id, equation, "stored invalid equation");
        }
        self.callbacks.equation_changed(id, equation);
        self.model_changed();
        true
    }

    pub fn remove_action(&mut self, id: &ActionRecordId) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        if self.store.remove(id).is_none() {
            return false;
        }
        self.forget_inline_edit(id);
        self.callbacks.action_deleted(id);
        self.model_changed();
        true
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let Some(to) = self.store.reorder(from, to) else {
            return false;
        };
        let Some(record) = self.store.records().get(to) else {
            return false;
        };
        let reorder = ActionReorder {
            id: record.id.clone(),
            from,
            to,
        };
        debug!(editor = %self.config.editor_id, from, to, "reordered action");
        self.callbacks.reordered(&reorder);
        self.model_changed();
        true
    }

    /// Host push: replaces the working store without notifying back.
    pub fn set_actions(&mut self, records: Vec<ActionRecord>) {
        if self.engine.is_destroyed() {
            return;
        }
        let node_type = self.config.node_type;
        let records = records
            .into_iter()
            .filter(|record| {
                let keep = record.action_node_type == node_type;
                if !keep {
                    warn!(id = %record.id, "dropping pushed action of foreign type");
                }
                keep
            })
            .collect();
        self.store.replace_all(records);
        if let Some(id) = self.suggestions.state().editing_node_id.clone() {
            if !self.store.contains(&id) {
                self.suggestions.hide();
            }
        }
        self.schedule_sync();
    }

    fn new_record(&self, word: &str, qualifier: &str) -> ActionRecord {
        let qualifier = if qualifier.trim().is_empty() {
            self.config.default_qualifier.as_str()
        } else {
            qualifier
        };
        ActionRecord::new(word, qualifier, self.config.node_type)
    }

    fn insert_record(&mut self, index: usize, record: ActionRecord) -> bool {
        if !self.store.insert(index, record.clone()) {
            debug!(id = %record.id, "action already tracked");
            return false;
        }
        self.callbacks.action_created(&record);
        self.model_changed();
        true
    }

    fn forget_inline_edit(&mut self, id: &ActionRecordId) {
        if self.suggestions.state().editing_node_id.as_ref() == Some(id) {
            self.suggestions.hide();
        }
    }

    /// Every internal model mutation engages the guard and queues a sync.
    fn model_changed(&mut self) {
        if let Some(previous) = self.guard.engage() {
            self.scheduler.cancel(previous);
        }
        let release = self.scheduler.schedule(
            self.config.timing.reentrancy_cooldown(),
            EditorTask::ReleaseReentrancyGuard,
        );
        self.guard.set_release_task(release);
        self.schedule_sync();
    }

    // Synchronization

    fn schedule_sync(&mut self) {
        if self.has_pending_sync() {
            return;
        }
        self.pending_sync = self
            .scheduler
            .schedule(self.config.timing.frame(), EditorTask::SyncContent);
    }

    /// Runs a pending or forced sync immediately. Returns whether the
    /// document content was replaced.
    pub fn sync_now(&mut self) -> bool {
        if let Some(handle) = self.pending_sync.take() {
            self.scheduler.cancel(handle);
        }
        self.run_sync()
    }

    fn run_sync(&mut self) -> bool {
        self.pending_sync = None;
        if self.engine.is_destroyed() {
            return false;
        }
        let projected = sync::project(&self.rendered());
        if !sync::needs_replace(self.engine.doc(), &projected) {
            trace!(editor = %self.config.editor_id, "document already matches records");
            return false;
        }
        let caret = match self.engine.caret() {
            Some(caret) => {
                sync::point_after_atoms(&projected, sync::atoms_before(self.engine.doc(), caret))
            }
            None => projected.end_point(),
        };
        let tx = sync::replace_transaction(projected, Selection::collapsed(caret));
        match self.engine.apply(tx) {
            Ok(Some(_)) => {
                debug!(
                    editor = %self.config.editor_id,
                    records = self.store.len(),
                    "replaced document content"
                );
                self.refresh_suggestions();
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(editor = %self.config.editor_id, %err, "content replacement failed");
                false
            }
        }
    }

    /// Applies a document transaction. Untagged transactions that change
    /// content feed deletions back into the store.
    pub fn apply_transaction(&mut self, tx: Transaction) -> Result<bool, ApplyError> {
        if self.config.read_only && !tx.is_sync_replace() {
            return Ok(false);
        }
        let Some(applied) = self.engine.apply(tx)? else {
            return Ok(false);
        };
        if !applied.doc_changed {
            self.refresh_suggestions();
            return Ok(false);
        }
        if applied.is_sync_replace() {
            return Ok(true);
        }

        let deleted = sync::detect_deletions(&applied, self.engine.doc(), &self.store);
        for id in &deleted {
            self.store.remove(id);
            self.forget_inline_edit(id);
            debug!(editor = %self.config.editor_id, %id, "action deleted from document");
            self.callbacks.action_deleted(id);
        }
        if !deleted.is_empty() {
            self.model_changed();
        }
        self.refresh_suggestions();
        Ok(true)
    }

    fn apply_user(&mut self, tx: Transaction) -> bool {
        match self.apply_transaction(tx) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(editor = %self.config.editor_id, %err, "edit rejected");
                false
            }
        }
    }

    // Text input and caret

    pub fn insert_text(&mut self, text: &str) -> bool {
        if !self.mutation_allowed() || text.is_empty() {
            return false;
        }
        if self.suggestions.is_inline_editing() {
            let query = format!("{}{}", self.suggestions.state().query, text);
            return self.set_inline_query(&query);
        }
        self.converted = false;
        let (mut ops, at) = self.delete_selection_ops();
        ops.push(Op::InsertText {
            at,
            text: text.to_string(),
        });
        self.apply_user(Transaction::new(ops).source(INPUT_SOURCE))
    }

    /// Ops removing a same-block range selection, and where the caret lands.
    /// A selection spanning blocks collapses to its start.
    fn delete_selection_ops(&self) -> (Vec<Op>, Point) {
        let (start, end) = self.engine.selection().ordered();
        if start == end || start.block != end.block {
            return (Vec::new(), start);
        }
        (
            vec![Op::RemoveRange {
                block: start.block,
                range: start.offset..end.offset,
            }],
            start,
        )
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.engine.set_selection(selection);
        self.refresh_suggestions();
    }

    pub fn set_caret(&mut self, point: Point) {
        self.set_selection(Selection::collapsed(point));
    }

    /// Selects the node itself, as a click on the widget does.
    pub fn select_node(&mut self, id: &ActionRecordId) -> bool {
        let Some(after) = self.engine.doc().point_after_action(id) else {
            return false;
        };
        let before = Point::new(after.block, after.offset.saturating_sub(1));
        self.engine.set_selection(Selection::new(before, after));
        self.suggestions.hide();
        true
    }

    pub fn set_caret_coords(&mut self, coords: Option<Coords>) {
        self.caret_coords = coords;
    }

    pub fn set_composing(&mut self, composing: bool) {
        self.engine.set_composing(composing);
        if !composing {
            self.refresh_suggestions();
        }
    }

    fn refresh_suggestions(&mut self) {
        if self.config.read_only
            || self.engine.is_destroyed()
            || self.engine.is_composing()
            || self.suggestions.is_inline_editing()
        {
            return;
        }
        let Some(caret) = self.engine.caret() else {
            self.suggestions.hide();
            return;
        };
        match caret_context(self.engine.doc(), caret) {
            CaretContext::NearPlaceholder => {}
            CaretContext::Query(query) => self.suggestions.set_query(query, self.caret_coords),
        }
    }

    fn move_caret(&mut self, key: Key) {
        let selection = *self.engine.selection();
        let (start, end) = selection.ordered();
        let line_len = self
            .engine
            .doc()
            .paragraph(selection.focus.block)
            .map(|p| p.inline_len())
            .unwrap_or(0);
        let target = match key {
            Key::ArrowLeft if !selection.is_collapsed() => start,
            Key::ArrowRight if !selection.is_collapsed() => end,
            Key::ArrowLeft => Point::new(start.block, start.offset.saturating_sub(1)),
            Key::ArrowRight => Point::new(end.block, (end.offset + 1).min(line_len)),
            Key::Home => Point::new(selection.focus.block, 0),
            Key::End => Point::new(selection.focus.block, line_len),
            _ => return,
        };
        self.set_caret(target);
    }

    fn delete_adjacent(&mut self, forward: bool) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        self.converted = false;
        let selection = *self.engine.selection();
        let (ops, _) = self.delete_selection_ops();
        if !ops.is_empty() {
            return self.apply_user(Transaction::new(ops).source(INPUT_SOURCE));
        }
        let Some(caret) = selection.caret() else {
            return false;
        };
        let len = self
            .engine
            .doc()
            .paragraph(caret.block)
            .map(|p| p.inline_len())
            .unwrap_or(0);
        let range: Range<usize> = if forward {
            if caret.offset >= len {
                return false;
            }
            caret.offset..caret.offset + 1
        } else {
            if caret.offset == 0 {
                return false;
            }
            caret.offset - 1..caret.offset
        };
        self.apply_user(
            Transaction::new(vec![Op::RemoveRange {
                block: caret.block,
                range,
            }])
            .source(INPUT_SOURCE),
        )
    }

    // Keyboard

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if self.engine.is_destroyed() {
            return KeyOutcome::PassThrough;
        }
        if self.suggestions.is_inline_editing() {
            return self.handle_inline_key(key);
        }
        match key {
            Key::ArrowDown | Key::ArrowUp => {
                let moved = if key == Key::ArrowDown {
                    self.suggestions.move_down()
                } else {
                    self.suggestions.move_up()
                };
                if moved {
                    KeyOutcome::Consumed
                } else {
                    KeyOutcome::PassThrough
                }
            }
            Key::Enter => {
                if self.config.read_only {
                    return KeyOutcome::PassThrough;
                }
                if let Some(item) = self.suggestions.selected_item().cloned() {
                    self.handle_select(&item);
                    return KeyOutcome::Consumed;
                }
                if self.implicit_create() {
                    KeyOutcome::Consumed
                } else {
                    KeyOutcome::PassThrough
                }
            }
            Key::Space => {
                if self.config.read_only || self.suggestions.selected_item().is_some() {
                    return KeyOutcome::PassThrough;
                }
                if self.implicit_create() {
                    KeyOutcome::Consumed
                } else {
                    KeyOutcome::PassThrough
                }
            }
            Key::Escape => {
                self.dismiss();
                KeyOutcome::Consumed
            }
            Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End => {
                self.move_caret(key);
                KeyOutcome::Consumed
            }
            Key::Backspace => {
                self.delete_adjacent(false);
                KeyOutcome::Consumed
            }
            Key::Delete => {
                self.delete_adjacent(true);
                KeyOutcome::Consumed
            }
        }
    }

    fn handle_inline_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Enter => {
                self.commit_inline_edit();
            }
            Key::Escape => {
                self.cancel_inline_edit();
            }
            Key::ArrowDown => {
                self.suggestions.move_down();
            }
            Key::ArrowUp => {
                self.suggestions.move_up();
            }
            Key::Backspace => {
                let mut query = self.suggestions.state().query.clone();
                query.pop();
                self.set_inline_query(&query);
            }
            Key::Space => return KeyOutcome::PassThrough,
            Key::ArrowLeft | Key::ArrowRight | Key::Home | Key::End | Key::Delete => {}
        }
        KeyOutcome::Consumed
    }

    /// Escape: close the menu and leave the editor without creating anything.
    fn dismiss(&mut self) {
        self.suggestions.hide();
        if let Some(handle) = self.pending_blur.take() {
            self.scheduler.cancel(handle);
        }
        self.engine.set_focused(false);
    }

    // Suggestions and creation

    pub fn select_suggestion(&mut self, ix: usize) -> bool {
        if !self.suggestions.select_index(ix) {
            return false;
        }
        match self.suggestions.selected_item().cloned() {
            Some(item) => self.handle_select(&item),
            None => false,
        }
    }

    /// Commits a chosen suggestion: rewrites the word under inline edit, or
    /// turns the query at the caret into a new record.
    pub fn handle_select(&mut self, item: &RegisteredAction) -> bool {
        if self.suggestions.is_inline_editing() {
            self.suggestions.update_inline_query(item.word.clone());
            return self.commit_inline_edit();
        }
        if !self.mutation_allowed() {
            return false;
        }
        // Only the query under the caret becomes the action; the rest of
        // the run stays as typed.
        let replace = self.engine.caret().and_then(|caret| {
            let query_len = match caret_context(self.engine.doc(), caret) {
                CaretContext::Query(query) => query.chars().count(),
                CaretContext::NearPlaceholder => 0,
            };
            (query_len > 0).then(|| (caret.block, caret.offset - query_len..caret.offset))
        });
        let index = self.caret_record_index();
        let created = self.create_at(index, &item.word, replace);
        self.suggestions.hide();
        created
    }

    /// Converts untracked text into a record. Returns whether one was created.
    pub fn implicit_create(&mut self) -> bool {
        let fallback = self.suggestions.state().query.clone();
        self.implicit_create_with(&fallback)
    }

    fn implicit_create_with(&mut self, fallback_query: &str) -> bool {
        if !self.mutation_allowed() || self.suggestions.is_inline_editing() {
            return false;
        }
        if self.guard.is_engaged() {
            trace!(editor = %self.config.editor_id, "implicit creation suppressed while settling");
            return false;
        }
        let segment = self
            .segment_at_caret()
            .or_else(|| scanner::last_untracked_segment(self.engine.doc(), &self.store));
        match segment {
            Some(segment) => self.create_at(
                segment.insert_index,
                &segment.text,
                Some((segment.block, segment.start..segment.end)),
            ),
            None => {
                let word = fallback_query.trim();
                if word.is_empty() {
                    return false;
                }
                let index = self.caret_record_index();
                self.create_at(index, word, None)
            }
        }
    }

    fn segment_at_caret(&self) -> Option<UntrackedSegment> {
        let caret = self.engine.caret()?;
        self.untracked_segments()
            .into_iter()
            .find(|segment| segment.contains(caret))
    }

    fn caret_record_index(&self) -> usize {
        let point = self.engine.selection().ordered().0;
        self.engine
            .doc()
            .actions_before(point, |id| self.store.contains(id))
    }

    /// Inserts a new record at `index` and swaps the raw text in `replace`
    /// (or the caret when there is none) for its node.
    fn create_at(
        &mut self,
        index: usize,
        word: &str,
        replace: Option<(usize, Range<usize>)>,
    ) -> bool {
        let record = self.new_record(word, "");
        if !self.store.insert(index, record.clone()) {
            return false;
        }
        debug!(
            editor = %self.config.editor_id,
            id = %record.id,
            word,
            index,
            "created action from text"
        );
        self.callbacks.action_created(&record);

        let node = Node::action(record);
        let ops = match replace {
            Some((block, range)) => {
                let at = Point::new(block, range.start);
                vec![Op::RemoveRange { block, range }, Op::InsertNode { at, node }]
            }
            None => {
                let at = self
                    .engine
                    .caret()
                    .unwrap_or_else(|| self.engine.doc().end_point());
                vec![Op::InsertNode { at, node }]
            }
        };
        if let Err(err) = self
            .engine
            .apply(Transaction::new(ops).source(CONVERT_SOURCE))
        {
            warn!(editor = %self.config.editor_id, %err, "could not place new action node");
        }

        self.suggestions.hide();
        self.converted = true;
        self.model_changed();
        true
    }

    // Focus

    pub fn focus(&mut self) {
        if self.engine.is_destroyed() {
            return;
        }
        self.engine.set_focused(true);
        if let Some(handle) = self.pending_blur.take() {
            self.scheduler.cancel(handle);
            trace!(editor = %self.config.editor_id, "focus returned before blur settled");
        }
        if self.config.read_only
            || self.suggestions.is_inline_editing()
            || self.engine.is_composing()
            || !self.engine.selection().is_collapsed()
        {
            return;
        }
        if !self.suggestions.state().visible {
            self.suggestions.open_browsing(self.caret_coords);
        }
        self.refresh_suggestions();
    }

    /// Focus left the editor. Hiding and implicit creation settle after the
    /// blur delay so that clicks on the menu or a node control land first.
    pub fn blur(&mut self) {
        if self.engine.is_destroyed() {
            return;
        }
        self.engine.set_focused(false);
        if let Some(handle) = self.pending_blur.take() {
            self.scheduler.cancel(handle);
        }
        let task = EditorTask::BlurSettle {
            query: self.suggestions.state().query.clone(),
            converted: self.converted,
        };
        self.pending_blur = self
            .scheduler
            .schedule(self.config.timing.blur_delay(), task);
    }

    fn settle_blur(&mut self, query: &str, converted: bool) {
        self.pending_blur = None;
        if self.engine.is_focused() {
            return;
        }
        if self.suggestions.is_inline_editing() {
            self.commit_inline_edit();
            return;
        }
        self.suggestions.hide();
        if converted || self.config.read_only {
            return;
        }
        self.implicit_create_with(query);
    }

    /// A click landed outside the editor and its overlay.
    pub fn click_outside(&mut self) -> bool {
        if self.suggestions.is_inline_editing() {
            return self.commit_inline_edit();
        }
        self.suggestions.hide();
        false
    }

    // Inline editing

    pub fn begin_inline_edit(&mut self, id: &ActionRecordId, coords: Option<Coords>) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let Some(record) = self.store.get(id) else {
            return false;
        };
        let word = record.word.clone();
        self.suggestions
            .begin_inline_edit(id.clone(), &word, coords.or(self.caret_coords));
        true
    }

    pub fn set_inline_query(&mut self, query: &str) -> bool {
        if !self.suggestions.is_inline_editing() {
            return false;
        }
        self.suggestions.update_inline_query(query.to_string());
        true
    }

    /// Writes the edited word back. Returns whether the record changed.
    pub fn commit_inline_edit(&mut self) -> bool {
        let Some((id, word)) = self.suggestions.finish_inline_edit() else {
            return false;
        };
        self.update_word(&id, &word)
    }

    /// Leaves inline editing; the record keeps its original word.
    pub fn cancel_inline_edit(&mut self) -> bool {
        self.suggestions.cancel_inline_edit().is_some()
    }

    // Drag and drop

    pub fn drag_item(&self, id: &ActionRecordId) -> Option<DragItem> {
        if !self.mutation_allowed() {
            return None;
        }
        let index = self.store.position(id)?;
        let record = self.store.records().get(index)?.clone();
        Some(DragItem {
            record,
            origin_editor_id: self.config.editor_id.clone(),
            original_index: index,
        })
    }

    pub fn drag_hover(&mut self, item: &DragItem, layout: &[NodeBox], x: f32, y: f32) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let changed = self.dnd.hover(item, layout, x, y, self.store.len());
        if changed {
            self.schedule_sync();
        }
        changed
    }

    pub fn drag_hover_index(&mut self, item: &DragItem, index: usize) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        let changed = self.dnd.hover_at(item, index, self.store.len());
        if changed {
            self.schedule_sync();
        }
        changed
    }

    pub fn drag_leave(&mut self) -> bool {
        let changed = self.dnd.leave();
        if changed {
            self.schedule_sync();
        }
        changed
    }

    /// The drag ended anywhere, for any reason. `outcome` is what the drop
    /// target reported, if the drag landed on one. An action this editor
    /// handed to another editor leaves its store here.
    pub fn drag_end(&mut self, outcome: Option<&DropOutcome>) -> bool {
        let mut changed = self.dnd.end();
        if changed {
            self.schedule_sync();
        }
        if let Some(DropOutcome::Transfer {
            item,
            target_editor_id,
            ..
        }) = outcome
        {
            if item.origin_editor_id == self.config.editor_id
                && *target_editor_id != self.config.editor_id
            {
                debug!(
                    editor = %self.config.editor_id,
                    id = %item.record.id,
                    target = %target_editor_id,
                    "action moved to another editor"
                );
                changed |= self.remove_action(&item.record.id);
            }
        }
        changed
    }

    pub fn drop(&mut self, item: &DragItem) -> DropOutcome {
        if !self.mutation_allowed() {
            self.drag_leave();
            return DropOutcome::Rejected;
        }
        let outcome = self.dnd.drop(item, self.store.len());
        self.schedule_sync();
        match &outcome {
            DropOutcome::Rejected => {
                debug!(
                    editor = %self.config.editor_id,
                    id = %item.record.id,
                    "rejected drop of foreign action type"
                );
            }
            DropOutcome::Reorder { from, to } => {
                let tracked = self
                    .store
                    .records()
                    .get(*from)
                    .is_some_and(|record| record.id == item.record.id);
                if tracked {
                    self.reorder(*from, *to);
                } else {
                    warn!(id = %item.record.id, from, "dropped action moved during drag");
                }
            }
            DropOutcome::Transfer {
                item,
                target_editor_id,
                target_index,
            } => {
                debug!(
                    editor = %self.config.editor_id,
                    id = %item.record.id,
                    origin = %item.origin_editor_id,
                    target_index,
                    "cross-editor drop"
                );
                self.callbacks.dropped(item, target_editor_id, *target_index);
            }
        }
        outcome
    }

    /// Target side of a cross-editor move.
    pub fn accept_transfer(&mut self, item: &DragItem, index: usize) -> bool {
        if !self.mutation_allowed() {
            return false;
        }
        if item.record.action_node_type != self.config.node_type {
            debug!(id = %item.record.id, "refused transfer of foreign action type");
            return false;
        }
        self.insert_record(index, item.record.clone())
    }

    // Scheduling and lifetime

    /// Advances the editor clock, running every task that comes due.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let deadline = self.scheduler.now() + elapsed;
        let mut ran = 0;
        while let Some((handle, task)) = self.scheduler.pop_due(deadline) {
            trace!(editor = %self.config.editor_id, ?handle, ?task, "running task");
            self.run_task(task);
            ran += 1;
        }
        self.scheduler.advance_to(deadline);
        ran
    }

    fn run_task(&mut self, task: EditorTask) {
        match task {
            EditorTask::SyncContent => {
                self.run_sync();
            }
            EditorTask::BlurSettle { query, converted } => self.settle_blur(&query, converted),
            EditorTask::ReleaseReentrancyGuard => self.guard.release(),
        }
    }

    /// Tears the editor down. Pending tasks are cancelled and every later
    /// call is a no-op.
    pub fn destroy(&mut self) {
        if self.engine.is_destroyed() {
            return;
        }
        let cancelled = self.scheduler.close();
        debug!(editor = %self.config.editor_id, cancelled, "action editor destroyed");
        self.engine.destroy();
        self.guard.release();
        self.suggestions.hide();
        self.dnd.end();
        self.pending_sync = None;
        self.pending_blur = None;
    }
}

impl ActionNodeApi for ActionEditor {
    fn node_views(&self) -> Vec<ActionNodeView> {
        ActionEditor::node_views(self)
    }

    fn update_word(&mut self, id: &ActionRecordId, word: &str) -> bool {
        ActionEditor::update_word(self, id, word)
    }

    fn update_qualifier(&mut self, id: &ActionRecordId, qualifier: &str) -> bool {
        ActionEditor::update_qualifier(self, id, qualifier)
    }

    fn update_action_id(&mut self, id: &ActionRecordId, action_id: &str) -> bool {
        ActionEditor::update_action_id(self, id, action_id)
    }

    fn update_equation(&mut self, id: &ActionRecordId, equation: &str) -> bool {
        ActionEditor::update_equation(self, id, equation)
    }

    fn remove_action(&mut self, id: &ActionRecordId) -> bool {
        ActionEditor::remove_action(self, id)
    }

    fn begin_inline_edit(&mut self, id: &ActionRecordId, coords: Option<Coords>) -> bool {
        ActionEditor::begin_inline_edit(self, id, coords)
    }

    fn set_inline_query(&mut self, query: &str) -> bool {
        ActionEditor::set_inline_query(self, query)
    }

    fn commit_inline_edit(&mut self) -> bool {
        ActionEditor::commit_inline_edit(self)
    }

    fn cancel_inline_edit(&mut self) -> bool {
        ActionEditor::cancel_inline_edit(self)
    }
}
