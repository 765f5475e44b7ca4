use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use playlist_action_core::{
    ActionEditor, ActionEditorCallbacks, ActionEditorConfig, ActionRecord, ActionRecordId,
    NodeType,
};

const FRAME: Duration = Duration::from_millis(16);

fn recorder(log: &Rc<RefCell<Vec<String>>>) -> ActionEditorCallbacks {
    let created = log.clone();
    let deleted = log.clone();
    let word = log.clone();
    let qualifier = log.clone();
    let equation = log.clone();
    let action_id = log.clone();
    let reordered = log.clone();
    ActionEditorCallbacks::new()
        .on_action_created(move |record| {
            created.borrow_mut().push(format!("created:{}", record.word));
        })
        .on_action_deleted(move |id| deleted.borrow_mut().push(format!("deleted:{id}")))
        .on_action_word_changed(move |id, w| word.borrow_mut().push(format!("word:{id}:{w}")))
        .on_qualifier_changed(move |id, q| {
            qualifier.borrow_mut().push(format!("qualifier:{id}:{q}"));
        })
        .on_action_equation_changed(move |id, e| {
            equation.borrow_mut().push(format!("equation:{id}:{e}"));
        })
        .on_action_id_changed(move |id, a| {
            action_id.borrow_mut().push(format!("action_id:{id}:{a}"));
        })
        .on_action_reordered(move |r| {
            reordered
                .borrow_mut()
                .push(format!("reordered:{}:{}:{}", r.id, r.from, r.to));
        })
}

fn playlist_editor(initial: Vec<ActionRecord>) -> (ActionEditor, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config =
        ActionEditorConfig::new("playlist", NodeType::PlaylistActionNode).initial_actions(initial);
    let editor = ActionEditor::new(config, recorder(&log)).unwrap();
    (editor, log)
}

fn record(id: &str, word: &str, qualifier: &str) -> ActionRecord {
    ActionRecord::new(word, qualifier, NodeType::PlaylistActionNode).with_id(id)
}

fn store_ids(editor: &ActionEditor) -> Vec<String> {
    editor.store().ids().map(|id| id.to_string()).collect()
}

fn doc_ids(editor: &ActionEditor) -> Vec<String> {
    editor
        .document()
        .action_ids()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn reorder_in_place_then_add() {
    let (mut editor, log) = playlist_editor(vec![record("a1", "start", "outgoing")]);

    assert!(!editor.reorder(0, 0));
    assert_eq!(store_ids(&editor), vec!["a1"]);
    editor.tick(FRAME);
    assert_eq!(doc_ids(&editor), vec!["a1"]);

    let id = editor.add_action("stop", "incoming").unwrap();
    assert_eq!(editor.records().len(), 2);
    let second = &editor.records()[1];
    assert_eq!(second.word, "stop");
    assert_eq!(second.qualifier, "incoming");
    assert_eq!(second.id, id);
    assert_ne!(second.id, ActionRecordId::new("a1"));
    assert_eq!(second.action_node_type, NodeType::PlaylistActionNode);
    assert_eq!(second.action_id, "start");

    editor.tick(FRAME);
    assert_eq!(doc_ids(&editor), store_ids(&editor));
    assert_eq!(*log.borrow(), vec!["created:stop".to_string()]);
}

#[test]
fn add_rejects_empty_words_and_defaults_qualifier() {
    let (mut editor, log) = playlist_editor(Vec::new());
    assert_eq!(editor.add_action("", "incoming"), None);
    assert_eq!(editor.add_action("   ", "incoming"), None);
    assert!(log.borrow().is_empty());

    editor.add_action("go", "").unwrap();
    assert_eq!(editor.records()[0].qualifier, "incoming");
}

#[test]
fn updates_notify_once_and_ignore_unknown_ids() {
    let (mut editor, log) = playlist_editor(vec![record("a1", "start", "outgoing")]);
    let a1 = ActionRecordId::new("a1");
    let missing = ActionRecordId::new("missing");

    assert!(editor.update_word(&a1, "begin"));
    assert!(!editor.update_word(&a1, "begin"));
    assert!(!editor.update_word(&a1, ""));
    assert!(!editor.update_word(&missing, "x"));

    assert!(editor.update_qualifier(&a1, "scheduled"));
    assert!(!editor.update_qualifier(&missing, "scheduled"));

    assert!(editor.update_action_id(&a1, "shuffle"));
    assert!(editor.update_equation(&a1, "=01"));
    assert!(!editor.remove_action(&missing));

    let stored = editor.store().get(&a1).unwrap();
    assert_eq!(stored.word, "begin");
    assert_eq!(stored.qualifier, "scheduled");
    assert_eq!(stored.action_id, "shuffle");
    assert_eq!(stored.equation, "=01");
    assert!(!stored.equation_is_valid());

    assert_eq!(
        *log.borrow(),
        vec![
            "word:a1:begin",
            "qualifier:a1:scheduled",
            "action_id:a1:shuffle",
            "equation:a1:=01",
        ]
    );
}

#[test]
fn unknown_option_ids_are_ignored() {
    let (mut editor, log) = playlist_editor(vec![record("a1", "start", "outgoing")]);
    let a1 = ActionRecordId::new("a1");
    let before = editor.records()[0].clone();

    assert!(!editor.update_qualifier(&a1, "later"));
    // "play" belongs to item nodes.
    assert!(!editor.update_action_id(&a1, "play"));
    assert!(!editor.update_action_id(&a1, ""));

    assert_eq!(editor.records()[0], before);
    assert!(log.borrow().is_empty());

    assert!(editor.update_qualifier(&a1, "scheduled"));
    assert!(editor.update_action_id(&a1, "stop"));
    assert_eq!(editor.records()[0].qualifier, "scheduled");
    assert_eq!(editor.records()[0].action_id, "stop");
}

#[test]
fn invalid_equation_is_kept_and_flagged_in_views() {
    let (mut editor, _log) = playlist_editor(vec![record("a1", "start", "outgoing")]);
    let a1 = ActionRecordId::new("a1");
    editor.update_equation(&a1, "abc");
    let views = editor.node_views();
    let view = &views[0];
    assert_eq!(view.equation, "abc");
    assert!(!view.equation_valid);

    editor.update_equation(&a1, ">100");
    assert!(editor.node_views()[0].equation_valid);
}

#[test]
fn remove_and_reorder_notify() {
    let (mut editor, log) = playlist_editor(vec![
        record("a", "A", "incoming"),
        record("b", "B", "incoming"),
        record("c", "C", "incoming"),
    ]);
    assert!(editor.reorder(0, 2));
    assert_eq!(store_ids(&editor), vec!["b", "c", "a"]);
    assert!(editor.remove_action(&ActionRecordId::new("c")));
    assert_eq!(store_ids(&editor), vec!["b", "a"]);
    assert!(!editor.reorder(5, 0));

    editor.tick(FRAME);
    assert_eq!(doc_ids(&editor), vec!["b", "a"]);
    assert_eq!(*log.borrow(), vec!["reordered:a:0:2", "deleted:c"]);
}

#[test]
fn document_tracks_store_through_mixed_mutations() {
    let (mut editor, _log) = playlist_editor(Vec::new());
    let mut seed: u64 = 7;
    let mut next = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    for step in 0..60 {
        let len = editor.records().len();
        match next() % 3 {
            0 => {
                editor.add_action(&format!("w{step}"), "");
            }
            1 if len > 0 => {
                let id = editor.records()[next() % len].id.clone();
                editor.remove_action(&id);
            }
            _ if len > 0 => {
                editor.reorder(next() % len, next() % len);
            }
            _ => {}
        }
        editor.tick(FRAME);

        let ids = doc_ids(&editor);
        assert_eq!(ids, store_ids(&editor), "step {step}");
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len(), "step {step}");
    }
}

#[test]
fn read_only_editor_rejects_every_mutation() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = ActionEditorConfig::new("ro", NodeType::PlaylistActionNode)
        .initial_actions(vec![record("a1", "start", "outgoing")])
        .read_only(true);
    let mut editor = ActionEditor::new(config, recorder(&log)).unwrap();
    let a1 = ActionRecordId::new("a1");

    assert_eq!(editor.add_action("x", ""), None);
    assert!(!editor.update_word(&a1, "x"));
    assert!(!editor.update_qualifier(&a1, "scheduled"));
    assert!(!editor.update_equation(&a1, "=1"));
    assert!(!editor.remove_action(&a1));
    assert!(!editor.insert_text("hello"));
    assert!(editor.drag_item(&a1).is_none());
    assert!(!editor.begin_inline_edit(&a1, None));
    assert!(editor.node_views().iter().all(|view| view.read_only));

    assert_eq!(editor.records().len(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn destroyed_editor_is_inert() {
    let (mut editor, log) = playlist_editor(vec![record("a1", "start", "outgoing")]);
    editor.add_action("stop", "");
    editor.destroy();

    assert!(editor.is_destroyed());
    assert_eq!(editor.pending_task_count(), 0);
    assert_eq!(editor.add_action("late", ""), None);
    assert_eq!(editor.tick(Duration::from_secs(1)), 0);
    assert!(!editor.sync_now());
    assert_eq!(doc_ids(&editor), vec!["a1"]);
    assert_eq!(*log.borrow(), vec!["created:stop".to_string()]);
}
