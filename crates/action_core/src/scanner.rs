//! Finds plain text that has not been turned into an action yet.

use crate::document::{Document, Node, Point};
use crate::record::RecordStore;

/// A maximal run of untracked text, trimmed.
///
/// `start_pos`/`end_pos` are absolute document positions of the trimmed text;
/// `block`/`start`/`end` address the same range as inline offsets.
/// `insert_index` is the store slot a record created from this text takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrackedSegment {
    pub text: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub block: usize,
    pub start: usize,
    pub end: usize,
    pub insert_index: usize,
}

impl UntrackedSegment {
    pub fn contains(&self, point: Point) -> bool {
        point.block == self.block && point.offset >= self.start && point.offset <= self.end
    }
}

struct Accumulator {
    start: usize,
    text: String,
}

/// Scans every paragraph. Action nodes and placeholders both end a run.
pub fn untracked_segments(doc: &Document, store: &RecordStore) -> Vec<UntrackedSegment> {
    let mut segments = Vec::new();
    let mut tracked_before = 0;

    for (block, paragraph) in doc.children.iter().enumerate() {
        let base = doc.absolute_position(Point::new(block, 0));
        let mut acc: Option<Accumulator> = None;
        let mut offset = 0;

        for child in &paragraph.children {
            match child {
                Node::Text(t) => {
                    acc.get_or_insert_with(|| Accumulator {
                        start: offset,
                        text: String::new(),
                    })
                    .text
                    .push_str(&t.text);
                }
                Node::Action(node) => {
                    flush(&mut segments, acc.take(), block, base, tracked_before);
                    if store.contains(&node.attrs.id) {
                        tracked_before += 1;
                    }
                }
                Node::Placeholder(_) => {
                    flush(&mut segments, acc.take(), block, base, tracked_before);
                }
            }
            offset += child.inline_len();
        }
        flush(&mut segments, acc.take(), block, base, tracked_before);
    }

    segments
}

pub fn last_untracked_segment(doc: &Document, store: &RecordStore) -> Option<UntrackedSegment> {
    untracked_segments(doc, store).pop()
}

fn flush(
    segments: &mut Vec<UntrackedSegment>,
    acc: Option<Accumulator>,
    block: usize,
    base: usize,
    insert_index: usize,
) {
    let Some(acc) = acc else {
        return;
    };
    let trimmed = acc.text.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = acc.text.chars().count() - acc.text.trim_start().chars().count();
    let start = acc.start + leading;
    let end = start + trimmed.chars().count();
    segments.push(UntrackedSegment {
        text: trimmed.to_string(),
        start_pos: base + start,
        end_pos: base + end,
        block,
        start,
        end,
        insert_index,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ActionRecord, NodeType};

    fn record(id: &str) -> ActionRecord {
        ActionRecord::new(id, "incoming", NodeType::ItemActionNode).with_id(id)
    }

    #[test]
    fn runs_are_split_by_actions_and_trimmed() {
        let store = RecordStore::new(vec![record("a")]);
        let doc = Document::single(vec![
            Node::text("  hello "),
            Node::action(record("a")),
            Node::text(" "),
            Node::placeholder(ActionRecord::placeholder_for(&record("z"))),
            Node::text("world"),
        ]);
        let segments = untracked_segments(&doc, &store);
        assert_eq!(segments.len(), 2);

        assert_eq!(segments[0].text, "hello");
        assert_eq!((segments[0].start, segments[0].end), (2, 7));
        assert_eq!((segments[0].start_pos, segments[0].end_pos), (3, 8));
        assert_eq!(segments[0].insert_index, 0);

        assert_eq!(segments[1].text, "world");
        assert_eq!((segments[1].start, segments[1].end), (11, 16));
        assert_eq!(segments[1].insert_index, 1);
    }

    #[test]
    fn stale_action_nodes_do_not_advance_the_insert_index() {
        let store = RecordStore::default();
        let doc = Document::single(vec![Node::action(record("gone")), Node::text("x")]);
        let last = last_untracked_segment(&doc, &store).unwrap();
        assert_eq!(last.text, "x");
        assert_eq!(last.insert_index, 0);
    }

    #[test]
    fn whitespace_only_document_has_no_segments() {
        let doc = Document::single(vec![Node::text("   ")]);
        assert!(untracked_segments(&doc, &RecordStore::default()).is_empty());
    }
}
