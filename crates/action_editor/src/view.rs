use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::input::{InputEvent, InputState};
use gpui_component::{ActiveTheme as _, h_flex, v_flex};
use playlist_action_core::{
    ActionEditor, ActionEditorCallbacks, ActionEditorConfig, ActionList, ActionNodeApi, ActionRecord,
    ActionRecordId, ActionReorder, ConfigError, Coords, DragItem, DropOutcome, EditorId, Key,
    KeyOutcome, Node, NodeBox, Point as CorePoint, Selection,
};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::input::ActionInputElement;
use crate::menu::render_suggestion_menu;
use crate::node::{ActionChip, ActionDrag};

const CONTEXT: &str = "ActionEditor";
const OBJECT_REPLACEMENT: char = '\u{fffc}';
const MENU_OFFSET_Y: f32 = 20.;

/// A key the editor handles, bound in the `ActionEditor` context.
#[derive(Action, Clone, PartialEq, Eq, Deserialize)]
#[action(namespace = action_editor, no_json)]
pub struct PressKey {
    pub key: Key,
}

const KEY_BINDINGS: [(&str, Key); 11] = [
    ("up", Key::ArrowUp),
    ("down", Key::ArrowDown),
    ("left", Key::ArrowLeft),
    ("right", Key::ArrowRight),
    ("enter", Key::Enter),
    ("space", Key::Space),
    ("escape", Key::Escape),
    ("backspace", Key::Backspace),
    ("delete", Key::Delete),
    ("home", Key::Home),
    ("end", Key::End),
];

pub fn init(cx: &mut App) {
    cx.bind_keys(
        KEY_BINDINGS.map(|(keystrokes, key)| {
            KeyBinding::new(keystrokes, PressKey { key }, Some(CONTEXT))
        }),
    );
}

/// Host-facing notifications, one per editor callback.
#[derive(Clone, Debug)]
pub enum ActionEditorEvent {
    ActionCreated(ActionRecord),
    ActionDeleted(ActionRecordId),
    QualifierChanged {
        id: ActionRecordId,
        qualifier: String,
    },
    WordChanged {
        id: ActionRecordId,
        word: String,
    },
    EquationChanged {
        id: ActionRecordId,
        equation: String,
    },
    ActionIdChanged {
        id: ActionRecordId,
        action_id: String,
    },
    Reordered(ActionReorder),
    /// A record from another editor was dropped here. The host inserts it
    /// with [`ActionEditorView::accept_transfer`]; the origin editor drops its
    /// copy when the drag ends.
    Dropped {
        item: DragItem,
        target: EditorId,
        index: usize,
    },
}

type EventQueue = Rc<RefCell<Vec<ActionEditorEvent>>>;

fn queue_callbacks(queue: &EventQueue) -> ActionEditorCallbacks {
    let created = queue.clone();
    let deleted = queue.clone();
    let qualifier = queue.clone();
    let word = queue.clone();
    let equation = queue.clone();
    let action_id = queue.clone();
    let reordered = queue.clone();
    let dropped = queue.clone();

    ActionEditorCallbacks::new()
        .on_action_created(move |record| {
            created
                .borrow_mut()
                .push(ActionEditorEvent::ActionCreated(record.clone()));
        })
        .on_action_deleted(move |id| {
            deleted
                .borrow_mut()
                .push(ActionEditorEvent::ActionDeleted(id.clone()));
        })
        .on_qualifier_changed(move |id, value| {
            qualifier
                .borrow_mut()
                .push(ActionEditorEvent::QualifierChanged {
                    id: id.clone(),
                    qualifier: value.to_string(),
                });
        })
        .on_action_word_changed(move |id, value| {
            word.borrow_mut().push(ActionEditorEvent::WordChanged {
                id: id.clone(),
                word: value.to_string(),
            });
        })
        .on_action_equation_changed(move |id, value| {
            equation
                .borrow_mut()
                .push(ActionEditorEvent::EquationChanged {
                    id: id.clone(),
                    equation: value.to_string(),
                });
        })
        .on_action_id_changed(move |id, value| {
            action_id
                .borrow_mut()
                .push(ActionEditorEvent::ActionIdChanged {
                    id: id.clone(),
                    action_id: value.to_string(),
                });
        })
        .on_action_reordered(move |reorder| {
            reordered
                .borrow_mut()
                .push(ActionEditorEvent::Reordered(reorder.clone()));
        })
        .on_action_drop(move |item, target, index| {
            dropped.borrow_mut().push(ActionEditorEvent::Dropped {
                item: item.clone(),
                target: target.clone(),
                index,
            });
        })
}

/// A gpui view over one [`ActionEditor`]. Owns the editor clock: deferred
/// editor work runs on a gpui timer.
pub struct ActionEditorView {
    focus_handle: FocusHandle,
    editor: ActionEditor,
    events: EventQueue,
    clock: Instant,
    tick_task: Option<Task<()>>,
    marked_text: Option<String>,
    node_boxes: Vec<NodeBox>,
    equation_inputs: HashMap<ActionRecordId, (Entity<InputState>, Subscription)>,
    _subscriptions: Vec<Subscription>,
}

impl EventEmitter<ActionEditorEvent> for ActionEditorView {}

impl ActionEditorView {
    pub fn view(
        config: ActionEditorConfig,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<Entity<Self>, ConfigError> {
        let events = EventQueue::default();
        let editor = ActionEditor::new(config, queue_callbacks(&events))?;
        Ok(cx.new(|cx| Self::new(editor, events, window, cx)))
    }

    fn new(
        editor: ActionEditor,
        events: EventQueue,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let focus_handle = cx.focus_handle().tab_stop(true);
        let subscriptions = vec![
            cx.on_focus_in(&focus_handle, window, |this, _window, cx| {
                this.update_editor(cx, |editor| editor.focus());
            }),
            cx.on_focus_out(&focus_handle, window, |this, _event, _window, cx| {
                this.on_focus_out(cx);
            }),
            cx.on_release(|this, _cx| this.editor.destroy()),
        ];

        Self {
            focus_handle,
            editor,
            events,
            clock: Instant::now(),
            tick_task: None,
            marked_text: None,
            node_boxes: Vec::new(),
            equation_inputs: HashMap::new(),
            _subscriptions: subscriptions,
        }
    }

    pub fn editor(&self) -> &ActionEditor {
        &self.editor
    }

    pub fn editor_id(&self) -> &EditorId {
        self.editor.editor_id()
    }

    pub fn action_list(&self) -> ActionList {
        self.editor.action_list()
    }

    pub fn set_actions(&mut self, records: Vec<ActionRecord>, cx: &mut Context<Self>) {
        self.update_editor(cx, |editor| editor.set_actions(records));
    }

    pub fn add_action(
        &mut self,
        word: &str,
        qualifier: &str,
        cx: &mut Context<Self>,
    ) -> Option<ActionRecordId> {
        self.update_editor(cx, |editor| editor.add_action(word, qualifier))
    }

    pub fn accept_transfer(&mut self, item: &DragItem, index: usize, cx: &mut Context<Self>) -> bool {
        self.update_editor(cx, |editor| editor.accept_transfer(item, index))
    }

    /// End of a drag that started in this editor.
    pub(crate) fn finish_drag(&mut self, outcome: Option<&DropOutcome>, cx: &mut Context<Self>) {
        self.update_editor(cx, |editor| editor.drag_end(outcome));
    }

    /// Runs `f` against the editor with the clock brought up to date, then
    /// publishes whatever it produced.
    pub(crate) fn update_editor<R>(
        &mut self,
        cx: &mut Context<Self>,
        f: impl FnOnce(&mut ActionEditor) -> R,
    ) -> R {
        self.advance_clock();
        let result = f(&mut self.editor);
        self.after_change(cx);
        result
    }

    /// Node widgets reach the editor only through [`ActionNodeApi`].
    pub(crate) fn update_node<R>(
        &mut self,
        cx: &mut Context<Self>,
        f: impl FnOnce(&mut dyn ActionNodeApi) -> R,
    ) -> R {
        self.update_editor(cx, |editor| f(editor))
    }

    fn advance_clock(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.clock);
        self.clock = now;
        let ran = self.editor.tick(elapsed);
        if ran > 0 {
            trace!(editor = %self.editor.editor_id(), ran, "ran deferred editor tasks");
        }
    }

    fn after_change(&mut self, cx: &mut Context<Self>) {
        let events: Vec<_> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            cx.emit(event);
        }
        self.schedule_tick(cx);
        cx.notify();
    }

    fn schedule_tick(&mut self, cx: &mut Context<Self>) {
        let Some(delay) = self.editor.next_task_delay() else {
            self.tick_task = None;
            return;
        };
        self.tick_task = Some(cx.spawn(async move |this, cx| {
            Timer::after(delay).await;
            _ = this.update(cx, |this, cx| this.update_editor(cx, |_| ()));
        }));
    }

    fn on_focus_out(&mut self, cx: &mut Context<Self>) {
        if !self.editor.is_focused() {
            return;
        }
        let was_composing = self.marked_text.take().is_some();
        self.update_editor(cx, |editor| {
            if was_composing {
                editor.set_composing(false);
            }
            editor.blur();
        });
    }

    fn press_key(&mut self, action: &PressKey, window: &mut Window, cx: &mut Context<Self>) {
        // Equation inputs inside the chips take their own keys, and the IME
        // takes them while it composes.
        if !self.focus_handle.is_focused(window) || self.marked_text.is_some() {
            cx.propagate();
            return;
        }
        let outcome = self.update_editor(cx, |editor| editor.handle_key(action.key));
        if outcome == KeyOutcome::PassThrough {
            // An unhandled space reaches `replace_text_in_range` as text.
            cx.propagate();
        }
    }

    fn on_surface_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let end = self.editor.document().end_point();
        self.place_caret(end, event.position, window, cx);
    }

    fn on_mouse_down_out(
        &mut self,
        _event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.editor.suggestion_state().visible {
            self.update_editor(cx, |editor| editor.click_outside());
        }
    }

    pub(crate) fn place_caret(
        &mut self,
        point: CorePoint,
        position: Point<Pixels>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        window.focus(&self.focus_handle);
        let coords = menu_coords(position);
        self.update_editor(cx, |editor| {
            editor.set_caret_coords(Some(coords));
            editor.set_caret(point);
        });
    }

    pub(crate) fn select_node(
        &mut self,
        id: &ActionRecordId,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        window.focus(&self.focus_handle);
        self.update_editor(cx, |editor| editor.select_node(id));
    }

    pub(crate) fn begin_inline_edit(
        &mut self,
        id: &ActionRecordId,
        position: Point<Pixels>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        window.focus(&self.focus_handle);
        let coords = menu_coords(position);
        self.update_node(cx, |api| api.begin_inline_edit(id, Some(coords)));
    }

    pub(crate) fn select_suggestion(&mut self, ix: usize, cx: &mut Context<Self>) {
        self.update_editor(cx, |editor| editor.select_suggestion(ix));
    }

    pub(crate) fn record_node_box(&mut self, index: usize, bounds: Bounds<Pixels>) {
        let node = NodeBox::new(
            index,
            bounds.left().into(),
            bounds.top().into(),
            bounds.right().into(),
            bounds.bottom().into(),
        );
        match self.node_boxes.iter_mut().find(|b| b.index == index) {
            Some(slot) => *slot = node,
            None => self.node_boxes.push(node),
        }
    }

    fn on_drag_move(
        &mut self,
        event: &DragMoveEvent<ActionDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let position = event.event.position;
        if !event.bounds.contains(&position) {
            if self.editor.dragged_over_index().is_some() {
                self.update_editor(cx, |editor| editor.drag_leave());
            }
            return;
        }

        let item = event.drag(cx).item.clone();
        let layout = self.node_boxes.clone();
        let (x, y): (f32, f32) = (position.x.into(), position.y.into());
        self.advance_clock();
        if self.editor.drag_hover(&item, &layout, x, y) {
            self.after_change(cx);
        }
    }

    fn on_drop(&mut self, drag: &ActionDrag, _window: &mut Window, cx: &mut Context<Self>) {
        let item = drag.item.clone();
        let outcome = self.update_editor(cx, |editor| editor.drop(&item));
        debug!(editor = %self.editor.editor_id(), ?outcome, "drop handled");

        if drag.origin.entity_id() == cx.entity_id() {
            self.finish_drag(Some(&outcome), cx);
        } else {
            _ = drag
                .origin
                .update(cx, |origin, cx| origin.finish_drag(Some(&outcome), cx));
        }
    }

    fn equation_input(
        &mut self,
        id: &ActionRecordId,
        equation: &str,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Entity<InputState> {
        if let Some((input, _)) = self.equation_inputs.get(id) {
            let input = input.clone();
            let stale = input.read(cx).value().as_str() != equation;
            if stale && !input.focus_handle(cx).is_focused(window) {
                let equation = equation.to_string();
                input.update(cx, |state, cx| state.set_value(equation, window, cx));
            }
            return input;
        }

        let input = cx.new(|cx| {
            let mut state = InputState::new(window, cx);
            state.set_placeholder("=1", window, cx);
            state.set_value(equation.to_string(), window, cx);
            state
        });
        let record_id = id.clone();
        let subscription = cx.subscribe(&input, move |this, input, event: &InputEvent, cx| {
            if !matches!(event, InputEvent::Change { .. }) {
                return;
            }
            let value = input.read(cx).value().to_string();
            this.update_node(cx, |api| api.update_equation(&record_id, &value));
        });
        self.equation_inputs
            .insert(id.clone(), (input.clone(), subscription));
        input
    }

    /// Text of the focused block, one char per inline unit.
    fn block_text(&self) -> String {
        let block = self.editor.selection().focus.block;
        let Some(paragraph) = self.editor.document().paragraph(block) else {
            return String::new();
        };
        let mut text = String::new();
        for node in &paragraph.children {
            match node {
                Node::Text(t) => text.push_str(&t.text),
                Node::Action(_) | Node::Placeholder(_) => text.push(OBJECT_REPLACEMENT),
            }
        }
        text
    }
}

fn menu_coords(position: Point<Pixels>) -> Coords {
    let x: f32 = position.x.into();
    let y: f32 = position.y.into();
    Coords::new(x, y + MENU_OFFSET_Y)
}

impl Focusable for ActionEditorView {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl EntityInputHandler for ActionEditorView {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        adjusted_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let text = self.block_text();
        let start = utf16_to_char(&text, range_utf16.start);
        let end = utf16_to_char(&text, range_utf16.end).max(start);
        adjusted_range.replace(char_to_utf16(&text, start)..char_to_utf16(&text, end));
        Some(text.chars().skip(start).take(end - start).collect())
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        let text = self.block_text();
        let selection = *self.editor.selection();
        let (start, end) = selection.ordered();
        let end_offset = if end.block == start.block {
            end.offset
        } else {
            start.offset
        };
        Some(UTF16Selection {
            range: char_to_utf16(&text, start.offset)..char_to_utf16(&text, end_offset),
            reversed: !selection.is_collapsed() && selection.focus == start,
        })
    }

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        // Committed input ends any preedit; the preedit never reached the document.
        let was_composing = self.marked_text.take().is_some();
        let inserted: String = new_text
            .chars()
            .filter(|ch| *ch != '\n' && *ch != '\r')
            .collect();
        let text = self.block_text();
        let block = self.editor.selection().focus.block;

        self.update_editor(cx, |editor| {
            if was_composing {
                editor.set_composing(false);
            } else if let Some(range) = range_utf16 {
                let start = utf16_to_char(&text, range.start);
                let end = utf16_to_char(&text, range.end);
                editor.set_selection(Selection::new(
                    CorePoint::new(block, start),
                    CorePoint::new(block, end),
                ));
            }
            if !inserted.is_empty() {
                editor.insert_text(&inserted);
            }
        });
    }

    fn marked_text_range(
        &self,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Range<usize>> {
        let marked = self.marked_text.as_ref()?;
        let caret = self.editor.caret()?;
        let start = char_to_utf16(&self.block_text(), caret.offset);
        Some(start..start + marked.encode_utf16().count())
    }

    fn unmark_text(&mut self, _window: &mut Window, cx: &mut Context<Self>) {
        if self.marked_text.take().is_some() {
            self.update_editor(cx, |editor| editor.set_composing(false));
        }
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        _range_utf16: Option<Range<usize>>,
        new_text: &str,
        _new_selected_range_utf16: Option<Range<usize>>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let composing = !new_text.is_empty();
        self.marked_text = composing.then(|| new_text.to_string());
        self.update_editor(cx, |editor| editor.set_composing(composing));
    }

    fn bounds_for_range(
        &mut self,
        _range_utf16: Range<usize>,
        bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        let origin = match self.editor.suggestion_state().coords {
            Some(coords) => point(px(coords.x), px(coords.y - MENU_OFFSET_Y)),
            None => bounds.origin,
        };
        Some(Bounds::new(origin, size(px(1.), px(MENU_OFFSET_Y))))
    }

    fn character_index_for_point(
        &mut self,
        _point: Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        None
    }
}

fn utf16_to_char(s: &str, utf16_ix: usize) -> usize {
    let mut utf16 = 0;
    for (ix, ch) in s.chars().enumerate() {
        if utf16 >= utf16_ix {
            return ix;
        }
        utf16 += ch.len_utf16();
    }
    s.chars().count()
}

fn char_to_utf16(s: &str, char_ix: usize) -> usize {
    s.chars().take(char_ix).map(char::len_utf16).sum()
}

impl Render for ActionEditorView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() && self.editor.dragged_over_index().is_some() {
            self.update_editor(cx, |editor| editor.drag_end(None));
        }

        let theme = cx.theme().clone();
        let entity = cx.entity();
        let record_count = self.editor.records().len();
        self.node_boxes.retain(|node| node.index < record_count);
        let store = self.editor.store().clone();
        self.equation_inputs.retain(|id, _| store.contains(id));

        let views = self.editor.node_views();
        let blocks = self.editor.document().children.clone();
        let selection = *self.editor.selection();
        let selected_id = self
            .editor
            .document()
            .selected_atom(&selection)
            .and_then(Node::action_id)
            .cloned();
        let caret = self
            .editor
            .caret()
            .filter(|_| self.editor.is_focused() && !self.editor.is_read_only());
        let read_only = self.editor.is_read_only();

        let mut rows: Vec<AnyElement> = Vec::with_capacity(blocks.len());
        for (block, paragraph) in blocks.into_iter().enumerate() {
            let mut inline: Vec<AnyElement> = Vec::new();
            let mut offset = 0;
            for node in paragraph.children {
                match node {
                    Node::Text(t) => {
                        for ch in t.text.chars() {
                            if caret == Some(CorePoint::new(block, offset)) {
                                inline.push(self.render_caret(&theme));
                            }
                            inline.push(render_char(block, offset, ch, cx));
                            offset += 1;
                        }
                    }
                    Node::Action(action) => {
                        if caret == Some(CorePoint::new(block, offset)) {
                            inline.push(self.render_caret(&theme));
                        }
                        let id = action.attrs.id;
                        if let Some(view) = views.iter().find(|v| v.id == id).cloned() {
                            let store_index = store.position(&id);
                            let equation = (!read_only).then(|| {
                                self.equation_input(&id, &view.equation, window, cx)
                            });
                            let drag = self
                                .editor
                                .drag_item(&id)
                                .map(|item| ActionDrag::new(item, entity.downgrade()));
                            let inline_query = view
                                .editing
                                .then(|| self.editor.suggestion_state().query.clone());
                            inline.push(
                                ActionChip::new(view, entity.clone())
                                    .store_index(store_index)
                                    .inline_query(inline_query)
                                    .equation(equation)
                                    .drag(drag)
                                    .selected(selected_id.as_ref() == Some(&id))
                                    .into_any_element(),
                            );
                        }
                        offset += 1;
                    }
                    Node::Placeholder(placeholder) => {
                        inline.push(
                            div()
                                .px(px(10.))
                                .py(px(2.))
                                .rounded(px(6.))
                                .border_1()
                                .border_color(theme.drag_border)
                                .bg(theme.drop_target)
                                .text_sm()
                                .text_color(theme.muted_foreground)
                                .child(placeholder.attrs.word)
                                .into_any_element(),
                        );
                        offset += 1;
                    }
                }
            }
            if caret == Some(CorePoint::new(block, offset)) {
                inline.push(self.render_caret(&theme));
            }
            rows.push(
                h_flex()
                    .flex_wrap()
                    .items_center()
                    .gap_y_1()
                    .min_h(px(24.))
                    .children(inline)
                    .into_any_element(),
            );
        }

        let is_empty = record_count == 0 && self.editor.document().plain_text().is_empty();
        let menu = self.editor.suggestion_state().clone();
        let focused = self.editor.is_focused();

        let surface = div()
            .id("action-editor-surface")
            .relative()
            .w_full()
            .min_h(px(36.))
            .p(px(6.))
            .rounded(theme.radius)
            .border_1()
            .border_color(if focused { theme.primary } else { theme.border })
            .bg(theme.background)
            .cursor(CursorStyle::IBeam)
            .on_mouse_down(MouseButton::Left, cx.listener(Self::on_surface_mouse_down))
            .on_drag_move::<ActionDrag>(cx.listener(Self::on_drag_move))
            .on_drop::<ActionDrag>(cx.listener(Self::on_drop))
            .children(rows)
            .when(is_empty, |this| {
                this.child(
                    div()
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child(if read_only {
                            "No actions"
                        } else {
                            "Type an action and press space"
                        }),
                )
            })
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .bottom_0()
                    .child(ActionInputElement::new(entity.clone())),
            );

        v_flex()
            .id(("action-editor", cx.entity_id()))
            .key_context(CONTEXT)
            .track_focus(&self.focus_handle)
            .tab_index(0)
            .w_full()
            .gap_y_1()
            .on_action(cx.listener(Self::press_key))
            .on_mouse_down_out(cx.listener(Self::on_mouse_down_out))
            .child(surface)
            .when(menu.visible, |this| {
                this.child(render_suggestion_menu(&menu, entity, &theme))
            })
    }
}

impl ActionEditorView {
    fn render_caret(&self, theme: &gpui_component::Theme) -> AnyElement {
        h_flex()
            .items_center()
            .when_some(self.marked_text.clone(), |this, marked| {
                this.child(div().underline().child(marked))
            })
            .child(div().w(px(1.5)).h(px(16.)).bg(theme.primary))
            .into_any_element()
    }
}

fn render_char(
    block: usize,
    offset: usize,
    ch: char,
    cx: &mut Context<ActionEditorView>,
) -> AnyElement {
    let after = CorePoint::new(block, offset + 1);
    let shown = if ch == ' ' { '\u{a0}' } else { ch };
    div()
        .child(shown.to_string())
        .on_mouse_down(
            MouseButton::Left,
            cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                cx.stop_propagation();
                this.place_caret(after, event.position, window, cx);
            }),
        )
        .into_any_element()
}
