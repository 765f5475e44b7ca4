use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use playlist_action_core::{
    ActionEditor, ActionEditorCallbacks, ActionEditorConfig, ActionRecord, Key, KeyOutcome,
    NodeType, RegisteredAction, SuggestionPhase,
};

const FRAME: Duration = Duration::from_millis(16);
const SETTLE: Duration = Duration::from_millis(200);

fn item_editor(
    initial: Vec<ActionRecord>,
    registered: Vec<RegisteredAction>,
) -> (ActionEditor, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let created = log.clone();
    let callbacks = ActionEditorCallbacks::new().on_action_created(move |record| {
        created
            .borrow_mut()
            .push(format!("{}/{}", record.word, record.qualifier));
    });
    let config = ActionEditorConfig::new("item-1", NodeType::ItemActionNode)
        .default_qualifier("outgoing")
        .registered_actions(registered)
        .initial_actions(initial);
    (ActionEditor::new(config, callbacks).unwrap(), log)
}

fn words(editor: &ActionEditor) -> Vec<&str> {
    editor.records().iter().map(|r| r.word.as_str()).collect()
}

#[test]
fn typing_then_space_creates_one_record() {
    let (mut editor, log) = item_editor(Vec::new(), Vec::new());
    editor.focus();
    assert!(editor.insert_text("hello"));
    assert_eq!(editor.handle_key(Key::Space), KeyOutcome::Consumed);

    assert_eq!(words(&editor), vec!["hello"]);
    assert_eq!(editor.records()[0].qualifier, "outgoing");
    assert_eq!(*log.borrow(), vec!["hello/outgoing".to_string()]);
    assert!(editor.untracked_segments().is_empty());

    editor.tick(FRAME);
    assert_eq!(editor.document().action_ids().len(), 1);
    assert_eq!(editor.document().plain_text(), "hello");
    assert_eq!(editor.suggestion_phase(), SuggestionPhase::Idle);
}

#[test]
fn space_inside_existing_nodes_creates_nothing() {
    let (mut editor, log) = item_editor(
        vec![ActionRecord::new("hello", "incoming", NodeType::ItemActionNode)],
        Vec::new(),
    );
    editor.focus();
    assert_eq!(editor.handle_key(Key::Space), KeyOutcome::PassThrough);
    assert_eq!(editor.records().len(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn created_records_take_their_document_slot() {
    let (mut editor, _log) = item_editor(
        vec![ActionRecord::new("middle", "incoming", NodeType::ItemActionNode)],
        Vec::new(),
    );
    editor.focus();
    editor.insert_text("last");
    assert_eq!(editor.handle_key(Key::Enter), KeyOutcome::Consumed);
    editor.tick(SETTLE);
    assert_eq!(words(&editor), vec!["middle", "last"]);

    editor.handle_key(Key::Home);
    editor.insert_text("first");
    assert_eq!(editor.handle_key(Key::Space), KeyOutcome::Consumed);
    editor.tick(SETTLE);
    assert_eq!(words(&editor), vec!["first", "middle", "last"]);
    assert_eq!(editor.document().plain_text(), "first middle last");
}

#[test]
fn enter_without_text_passes_through() {
    let (mut editor, _log) = item_editor(Vec::new(), Vec::new());
    editor.focus();
    assert_eq!(editor.handle_key(Key::Enter), KeyOutcome::PassThrough);
    editor.insert_text("   ");
    assert_eq!(editor.handle_key(Key::Enter), KeyOutcome::PassThrough);
    assert!(editor.records().is_empty());
}

#[test]
fn blur_converts_abandoned_text_after_delay() {
    let (mut editor, _log) = item_editor(Vec::new(), Vec::new());
    editor.focus();
    editor.insert_text("pending");
    editor.blur();

    editor.tick(Duration::from_millis(50));
    assert!(editor.records().is_empty());

    editor.tick(Duration::from_millis(60));
    assert_eq!(words(&editor), vec!["pending"]);
}

#[test]
fn refocusing_before_the_delay_keeps_text() {
    let (mut editor, _log) = item_editor(Vec::new(), Vec::new());
    editor.focus();
    editor.insert_text("pending");
    editor.blur();
    editor.tick(Duration::from_millis(40));
    editor.focus();
    editor.tick(SETTLE);
    assert!(editor.records().is_empty());
    assert_eq!(editor.untracked_segments()[0].text, "pending");
}

#[test]
fn blur_after_space_does_not_convert_twice() {
    let (mut editor, log) = item_editor(Vec::new(), Vec::new());
    editor.focus();
    editor.insert_text("once");
    editor.handle_key(Key::Space);
    editor.blur();
    editor.tick(SETTLE);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn escape_discards_query_without_creating() {
    let (mut editor, _log) = item_editor(Vec::new(), vec![RegisteredAction::new("play", "")]);
    editor.focus();
    editor.insert_text("pla");
    assert_eq!(editor.suggestion_phase(), SuggestionPhase::Filtering);

    assert_eq!(editor.handle_key(Key::Escape), KeyOutcome::Consumed);
    assert!(!editor.is_focused());
    assert_eq!(editor.suggestion_phase(), SuggestionPhase::Idle);
    assert!(editor.suggestion_state().query.is_empty());

    editor.tick(SETTLE);
    assert!(editor.records().is_empty());
}

#[test]
fn creation_is_suppressed_while_a_mutation_settles() {
    let (mut editor, _log) = item_editor(Vec::new(), Vec::new());
    editor.add_action("first", "");
    assert!(editor.is_reentrancy_guarded());

    editor.insert_text("second");
    assert_eq!(editor.handle_key(Key::Space), KeyOutcome::PassThrough);
    assert_eq!(words(&editor), vec!["first"]);

    editor.tick(SETTLE);
    assert!(!editor.is_reentrancy_guarded());
}

#[test]
fn selecting_a_suggestion_replaces_the_typed_query() {
    let (mut editor, log) = item_editor(
        Vec::new(),
        vec![
            RegisteredAction::new("Start", "begins playback"),
            RegisteredAction::new("Stop", ""),
        ],
    );
    editor.focus();
    assert_eq!(editor.suggestion_phase(), SuggestionPhase::Browsing);

    editor.insert_text("st");
    assert_eq!(editor.suggestion_state().items.len(), 2);
    assert_eq!(editor.handle_key(Key::ArrowDown), KeyOutcome::Consumed);
    assert_eq!(editor.handle_key(Key::ArrowDown), KeyOutcome::Consumed);
    assert_eq!(editor.handle_key(Key::Enter), KeyOutcome::Consumed);

    assert_eq!(words(&editor), vec!["Stop"]);
    assert_eq!(editor.document().plain_text(), "Stop");
    assert_eq!(editor.suggestion_phase(), SuggestionPhase::Idle);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn selecting_a_suggestion_keeps_earlier_words_of_the_run() {
    let (mut editor, log) = item_editor(Vec::new(), vec![RegisteredAction::new("cde", "")]);
    editor.focus();
    editor.insert_text("ab cd");
    assert_eq!(editor.suggestion_state().query, "cd");
    assert_eq!(editor.handle_key(Key::ArrowDown), KeyOutcome::Consumed);
    assert_eq!(editor.handle_key(Key::Enter), KeyOutcome::Consumed);

    assert_eq!(words(&editor), vec!["cde"]);
    assert_eq!(editor.document().plain_text(), "ab cde");
    let leftover = editor.untracked_segments();
    assert_eq!(leftover.len(), 1);
    assert_eq!(leftover[0].text, "ab");
    assert_eq!(*log.borrow(), vec!["cde/outgoing".to_string()]);
}

#[test]
fn space_with_a_highlighted_suggestion_is_literal() {
    let (mut editor, _log) = item_editor(Vec::new(), vec![RegisteredAction::new("Start", "")]);
    editor.focus();
    editor.insert_text("st");
    editor.handle_key(Key::ArrowDown);
    assert_eq!(editor.handle_key(Key::Space), KeyOutcome::PassThrough);
    assert!(editor.records().is_empty());
}

#[test]
fn browsing_selection_inserts_at_the_caret() {
    let (mut editor, _log) = item_editor(
        vec![ActionRecord::new("tail", "incoming", NodeType::ItemActionNode)],
        vec![RegisteredAction::new("Start", "")],
    );
    editor.handle_key(Key::Home);
    editor.focus();
    assert!(editor.select_suggestion(0));
    assert_eq!(words(&editor), vec!["Start", "tail"]);

    editor.tick(FRAME);
    assert_eq!(editor.document().plain_text(), "Start tail");
}
