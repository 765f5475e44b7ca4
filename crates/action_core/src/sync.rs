//! Record store → document projection, and the deletion-only reverse path.

use std::collections::HashSet;

use crate::dnd::RenderedEntry;
use crate::document::{Document, Node, Paragraph, Point, Selection};
use crate::engine::AppliedTransaction;
use crate::ops::{Op, SYNC_REPLACE_SOURCE, Transaction};
use crate::record::{ActionRecordId, RecordStore};
use crate::scheduler::TaskHandle;

/// One paragraph: every entry becomes an atom, separated by single spaces.
pub fn project(entries: &[RenderedEntry]) -> Document {
    let mut children = Vec::with_capacity(entries.len() * 2);
    for (ix, entry) in entries.iter().enumerate() {
        if ix > 0 {
            children.push(Node::text(" "));
        }
        children.push(match entry {
            RenderedEntry::Record(record) => Node::action(record.clone()),
            RenderedEntry::Placeholder(record) => Node::placeholder(record.clone()),
        });
    }
    Document::new(vec![Paragraph::new(children)])
}

pub fn needs_replace(current: &Document, projected: &Document) -> bool {
    current != projected
}

/// A tagged full-content replacement that the reverse path ignores.
pub fn replace_transaction(projected: Document, selection: Selection) -> Transaction {
    Transaction::new(vec![Op::ReplaceContent {
        document: projected,
    }])
    .selection_after(selection)
    .source(SYNC_REPLACE_SOURCE)
}

/// Number of atoms before `point`.
pub fn atoms_before(doc: &Document, point: Point) -> usize {
    let Some(paragraph) = doc.paragraph(point.block) else {
        return 0;
    };
    let mut start = 0;
    let mut count = 0;
    for child in &paragraph.children {
        if start >= point.offset {
            break;
        }
        if child.is_atom() {
            count += 1;
        }
        start += child.inline_len();
    }
    count
}

/// Caret position right after the `count`-th atom of the first paragraph.
pub fn point_after_atoms(doc: &Document, count: usize) -> Point {
    if count == 0 {
        return Point::new(0, 0);
    }
    let Some(paragraph) = doc.paragraph(0) else {
        return doc.end_point();
    };
    let mut offset = 0;
    let mut seen = 0;
    for child in &paragraph.children {
        offset += child.inline_len();
        if child.is_atom() {
            seen += 1;
            if seen == count {
                return Point::new(0, offset);
            }
        }
    }
    doc.end_point()
}

/// Ids the user removed in one transaction.
///
/// Only ids that were tracked by the store, present before the transaction
/// and missing after it count. Sync replacements and transactions that left
/// the content alone never report deletions. Nodes present in the document
/// but unknown to the store are left alone.
pub fn detect_deletions(
    applied: &AppliedTransaction,
    doc_after: &Document,
    store: &RecordStore,
) -> Vec<ActionRecordId> {
    if !applied.doc_changed || applied.is_sync_replace() {
        return Vec::new();
    }
    let after: HashSet<&ActionRecordId> = doc_after.action_ids().into_iter().collect();
    let before: HashSet<&ActionRecordId> = applied.doc_before.action_ids().into_iter().collect();
    store
        .ids()
        .filter(|id| before.contains(id) && !after.contains(id))
        .cloned()
        .collect()
}

/// Suppresses implicit creation while a programmatic mutation settles.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    engaged: bool,
    release_task: Option<TaskHandle>,
}

impl ReentrancyGuard {
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Engages the guard. Returns the previously scheduled release, which the
    /// caller cancels so that the cooldown restarts.
    pub fn engage(&mut self) -> Option<TaskHandle> {
        self.engaged = true;
        self.release_task.take()
    }

    pub fn set_release_task(&mut self, handle: Option<TaskHandle>) {
        self.release_task = handle;
    }

    pub fn release(&mut self) {
        self.engaged = false;
        self.release_task = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::record::{ActionRecord, NodeType};

    fn record(id: &str) -> ActionRecord {
        ActionRecord::new(id, "incoming", NodeType::ItemActionNode).with_id(id)
    }

    #[test]
    fn projection_interleaves_single_spaces() {
        let doc = project(&[
            RenderedEntry::Record(record("a")),
            RenderedEntry::Placeholder(ActionRecord::placeholder_for(&record("z"))),
            RenderedEntry::Record(record("b")),
        ]);
        let children = &doc.children[0].children;
        assert_eq!(children.len(), 5);
        assert_eq!(children[1], Node::text(" "));
        assert!(matches!(children[2], Node::Placeholder(_)));
        assert_eq!(doc.action_ids().len(), 2);

        assert_eq!(project(&[]), Document::default());
    }

    #[test]
    fn atoms_round_trip_through_caret_positions() {
        let doc = project(&[
            RenderedEntry::Record(record("a")),
            RenderedEntry::Record(record("b")),
        ]);
        assert_eq!(point_after_atoms(&doc, 0), Point::new(0, 0));
        assert_eq!(point_after_atoms(&doc, 1), Point::new(0, 1));
        assert_eq!(point_after_atoms(&doc, 2), Point::new(0, 3));
        assert_eq!(point_after_atoms(&doc, 9), Point::new(0, 3));
        assert_eq!(atoms_before(&doc, Point::new(0, 3)), 2);
        assert_eq!(atoms_before(&doc, Point::new(0, 2)), 1);
    }

    #[test]
    fn sync_replacement_is_never_read_as_deletion() {
        let store = RecordStore::new(vec![record("a"), record("b")]);
        let mut engine = Engine::new(project(&[
            RenderedEntry::Record(record("a")),
            RenderedEntry::Record(record("b")),
        ]));
        let selection = *engine.selection();
        let applied = engine
            .apply(replace_transaction(Document::default(), selection))
            .unwrap()
            .unwrap();
        assert!(detect_deletions(&applied, engine.doc(), &store).is_empty());
    }

    #[test]
    fn deletion_reports_only_tracked_ids_that_disappeared() {
        let store = RecordStore::new(vec![record("a"), record("b")]);
        let mut engine = Engine::new(Document::single(vec![
            Node::action(record("a")),
            Node::text(" "),
            Node::action(record("b")),
            Node::action(record("stale")),
        ]));
        let applied = engine
            .apply(Transaction::new(vec![Op::RemoveRange {
                block: 0,
                range: 0..2,
            }]))
            .unwrap()
            .unwrap();
        let deleted = detect_deletions(&applied, engine.doc(), &store);
        assert_eq!(deleted, vec![ActionRecordId::new("a")]);
    }

    #[test]
    fn guard_hands_back_previous_release() {
        let mut guard = ReentrancyGuard::default();
        assert_eq!(guard.engage(), None);
        assert!(guard.is_engaged());
        guard.release();
        assert!(!guard.is_engaged());
    }
}
