use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use playlist_action_core::{
    ActionEditor, ActionEditorCallbacks, ActionEditorConfig, ActionRecord, ActionRecordId,
    DragItem, DropOutcome, EditorId, NodeBox, NodeType,
};

const FRAME: Duration = Duration::from_millis(16);

type Log = Rc<RefCell<Vec<String>>>;
type Drops = Rc<RefCell<Vec<(DragItem, EditorId, usize)>>>;

fn recorder(log: &Log, drops: &Drops) -> ActionEditorCallbacks {
    let created = log.clone();
    let deleted = log.clone();
    let reordered = log.clone();
    let dropped = drops.clone();
    ActionEditorCallbacks::new()
        .on_action_created(move |r| created.borrow_mut().push(format!("created:{}", r.id)))
        .on_action_deleted(move |id| deleted.borrow_mut().push(format!("deleted:{id}")))
        .on_action_reordered(move |r| {
            reordered
                .borrow_mut()
                .push(format!("reordered:{}:{}", r.from, r.to));
        })
        .on_action_drop(move |item, target, index| {
            dropped
                .borrow_mut()
                .push((item.clone(), target.clone(), index));
        })
}

struct Fixture {
    editor: ActionEditor,
    log: Log,
    drops: Drops,
}

fn fixture(editor_id: &str, node_type: NodeType, ids: &[&str]) -> Fixture {
    let log = Rc::new(RefCell::new(Vec::new()));
    let drops = Rc::new(RefCell::new(Vec::new()));
    let config = ActionEditorConfig::new(editor_id, node_type).initial_actions(
        ids.iter()
            .map(|id| ActionRecord::new(*id, "incoming", node_type).with_id(*id))
            .collect(),
    );
    let editor = ActionEditor::new(config, recorder(&log, &drops)).unwrap();
    Fixture { editor, log, drops }
}

fn store_ids(editor: &ActionEditor) -> Vec<String> {
    editor.store().ids().map(|id| id.to_string()).collect()
}

#[test]
fn intra_editor_drop_reorders() {
    let mut f = fixture("e1", NodeType::ItemActionNode, &["a", "b", "c"]);
    let item = f.editor.drag_item(&ActionRecordId::new("a")).unwrap();
    assert_eq!(item.original_index, 0);

    assert!(f.editor.drag_hover_index(&item, 3));
    let rendered = f.editor.rendered();
    assert_eq!(rendered.len(), 4);
    assert!(rendered[3].is_placeholder());

    f.editor.tick(FRAME);
    assert!(f.editor.document().has_placeholder());
    assert_eq!(f.editor.document().action_ids().len(), 3);
    assert!(f.editor.untracked_segments().is_empty());
    assert_eq!(store_ids(&f.editor), vec!["a", "b", "c"]);

    assert_eq!(f.editor.drop(&item), DropOutcome::Reorder { from: 0, to: 2 });
    assert_eq!(store_ids(&f.editor), vec!["b", "c", "a"]);
    assert_eq!(*f.log.borrow(), vec!["reordered:0:2".to_string()]);

    f.editor.tick(FRAME);
    assert!(!f.editor.document().has_placeholder());
    assert_eq!(f.editor.document().plain_text(), "b c a");
}

#[test]
fn hover_position_picks_the_nearer_side() {
    let mut f = fixture("e1", NodeType::ItemActionNode, &["a", "b"]);
    let item = f.editor.drag_item(&ActionRecordId::new("b")).unwrap();
    let layout = [
        NodeBox::new(0, 0.0, 0.0, 40.0, 20.0),
        NodeBox::new(1, 50.0, 0.0, 90.0, 20.0),
    ];

    f.editor.drag_hover(&item, &layout, 10.0, 10.0);
    assert_eq!(f.editor.dragged_over_index(), Some(0));
    f.editor.drag_hover(&item, &layout, 30.0, 10.0);
    assert_eq!(f.editor.dragged_over_index(), Some(1));
    f.editor.drag_hover(&item, &layout, 300.0, 10.0);
    assert_eq!(f.editor.dragged_over_index(), Some(2));

    f.editor.drag_hover(&item, &layout, 10.0, 10.0);
    assert_eq!(f.editor.drop(&item), DropOutcome::Reorder { from: 1, to: 0 });
    assert_eq!(store_ids(&f.editor), vec!["b", "a"]);
}

#[test]
fn leaving_or_ending_a_drag_removes_the_placeholder() {
    let mut f = fixture("e1", NodeType::ItemActionNode, &["a"]);
    let item = f.editor.drag_item(&ActionRecordId::new("a")).unwrap();

    f.editor.drag_hover_index(&item, 0);
    assert!(f.editor.drag_leave());
    assert_eq!(f.editor.rendered().len(), 1);

    f.editor.drag_hover_index(&item, 1);
    f.editor.tick(FRAME);
    assert!(f.editor.document().has_placeholder());
    assert!(f.editor.drag_end(None));
    f.editor.tick(FRAME);
    assert!(!f.editor.document().has_placeholder());
    assert!(f.log.borrow().is_empty());
}

#[test]
fn cross_editor_drop_moves_the_record() {
    let mut origin = fixture("e1", NodeType::ItemActionNode, &["a", "b"]);
    let mut target = fixture("e2", NodeType::ItemActionNode, &["x"]);

    let item = origin.editor.drag_item(&ActionRecordId::new("b")).unwrap();
    target.editor.drag_hover_index(&item, 0);
    let outcome = target.editor.drop(&item);
    assert!(matches!(
        outcome,
        DropOutcome::Transfer { target_index: 0, .. }
    ));

    let (dropped, target_id, index) = target.drops.borrow_mut().remove(0);
    assert_eq!(target_id, EditorId::new("e2"));
    assert!(target.editor.accept_transfer(&dropped, index));
    assert!(origin.editor.drag_end(Some(&outcome)));

    assert_eq!(store_ids(&origin.editor), vec!["a"]);
    assert_eq!(store_ids(&target.editor), vec!["b", "x"]);
    assert_eq!(*origin.log.borrow(), vec!["deleted:b".to_string()]);
    assert_eq!(*target.log.borrow(), vec!["created:b".to_string()]);

    origin.editor.tick(FRAME);
    target.editor.tick(FRAME);
    assert_eq!(origin.editor.document().plain_text(), "a");
    assert_eq!(target.editor.document().plain_text(), "b x");
}

#[test]
fn origin_lets_go_of_a_transferred_record_when_the_drag_ends() {
    let mut origin = fixture("e1", NodeType::ItemActionNode, &["a", "b"]);
    let mut target = fixture("e2", NodeType::ItemActionNode, &[]);

    let item = origin.editor.drag_item(&ActionRecordId::new("b")).unwrap();
    let outcome = target.editor.drop(&item);
    assert!(matches!(
        outcome,
        DropOutcome::Transfer { target_index: 0, .. }
    ));

    // The target's own end-of-drag leaves its store alone.
    assert!(!target.editor.drag_end(Some(&outcome)));
    assert!(target.log.borrow().is_empty());

    assert!(origin.editor.drag_end(Some(&outcome)));
    assert_eq!(store_ids(&origin.editor), vec!["a"]);
    assert_eq!(*origin.log.borrow(), vec!["deleted:b".to_string()]);
    assert!(origin.drops.borrow().is_empty());

    origin.editor.tick(FRAME);
    assert_eq!(origin.editor.document().plain_text(), "a");
}

#[test]
fn cancelled_drag_keeps_the_record() {
    let mut origin = fixture("e1", NodeType::ItemActionNode, &["a"]);
    let item = origin.editor.drag_item(&ActionRecordId::new("a")).unwrap();
    origin.editor.drag_hover_index(&item, 1);
    assert!(origin.editor.drag_end(None));
    assert_eq!(store_ids(&origin.editor), vec!["a"]);
    assert!(origin.log.borrow().is_empty());
}

#[test]
fn foreign_type_drop_changes_nothing() {
    let mut playlist = fixture("p1", NodeType::PlaylistActionNode, &["p"]);
    let mut items = fixture("e1", NodeType::ItemActionNode, &["a"]);

    let item = playlist.editor.drag_item(&ActionRecordId::new("p")).unwrap();
    assert!(!items.editor.drag_hover_index(&item, 0));
    assert_eq!(items.editor.dragged_over_index(), None);
    assert_eq!(items.editor.drop(&item), DropOutcome::Rejected);
    assert!(!items.editor.accept_transfer(&item, 0));
    playlist.editor.drag_end(Some(&DropOutcome::Rejected));

    assert_eq!(store_ids(&playlist.editor), vec!["p"]);
    assert_eq!(store_ids(&items.editor), vec!["a"]);
    assert!(playlist.log.borrow().is_empty());
    assert!(items.log.borrow().is_empty());
    assert!(items.drops.borrow().is_empty());
}

#[test]
fn read_only_editor_refuses_drops() {
    let mut origin = fixture("e1", NodeType::ItemActionNode, &["a"]);
    let config = ActionEditorConfig::new("ro", NodeType::ItemActionNode).read_only(true);
    let mut read_only = ActionEditor::new(config, ActionEditorCallbacks::default()).unwrap();

    let item = origin.editor.drag_item(&ActionRecordId::new("a")).unwrap();
    assert!(!read_only.drag_hover_index(&item, 0));
    assert_eq!(read_only.drop(&item), DropOutcome::Rejected);
    assert!(read_only.records().is_empty());
    origin.editor.drag_end(Some(&DropOutcome::Rejected));
    assert_eq!(store_ids(&origin.editor), vec!["a"]);
}
