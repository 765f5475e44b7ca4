use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::record::{ActionRecord, ActionRecordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Paragraph>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            children: vec![Paragraph::default()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Text(TextNode),
    Action(ActionNode),
    Placeholder(PlaceholderNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionNode {
    pub attrs: ActionRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderNode {
    pub attrs: ActionRecord,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn action(record: ActionRecord) -> Self {
        Node::Action(ActionNode { attrs: record })
    }

    pub fn placeholder(record: ActionRecord) -> Self {
        Node::Placeholder(PlaceholderNode { attrs: record })
    }

    /// Inline width: characters for text, 1 for atoms.
    pub fn inline_len(&self) -> usize {
        match self {
            Node::Text(t) => t.text.chars().count(),
            Node::Action(_) | Node::Placeholder(_) => 1,
        }
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Node::Text(_))
    }

    /// Id of a real action node; placeholders and text have none.
    pub fn action_id(&self) -> Option<&ActionRecordId> {
        match self {
            Node::Action(node) => Some(&node.attrs.id),
            Node::Text(_) | Node::Placeholder(_) => None,
        }
    }
}

/// A caret position: `offset` counts characters of text runs and 1 per atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn caret(&self) -> Option<Point> {
        self.is_collapsed().then_some(self.focus)
    }

    pub fn ordered(&self) -> (Point, Point) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

/// What sits on one side of a caret.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InlineUnit<'a> {
    Char(char),
    Atom(&'a Node),
}

enum Slot {
    InText { child: usize, char_offset: usize },
    Before(usize),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OffsetOutOfRange {
    pub(crate) len: usize,
}

impl Paragraph {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn inline_len(&self) -> usize {
        self.children.iter().map(Node::inline_len).sum()
    }

    /// The unit occupying `[offset, offset + 1)`.
    pub fn unit_at(&self, offset: usize) -> Option<InlineUnit<'_>> {
        let mut start = 0;
        for child in &self.children {
            let len = child.inline_len();
            if offset < start + len {
                return Some(match child {
                    Node::Text(t) => InlineUnit::Char(t.text.chars().nth(offset - start)?),
                    _ => InlineUnit::Atom(child),
                });
            }
            start += len;
        }
        None
    }

    pub fn unit_before(&self, offset: usize) -> Option<InlineUnit<'_>> {
        offset.checked_sub(1).and_then(|ix| self.unit_at(ix))
    }

    pub fn unit_after(&self, offset: usize) -> Option<InlineUnit<'_>> {
        self.unit_at(offset)
    }

    fn slot(&self, offset: usize) -> Slot {
        let mut start = 0;
        for (ix, child) in self.children.iter().enumerate() {
            let len = child.inline_len();
            match child {
                Node::Text(_) if offset <= start + len => {
                    return Slot::InText {
                        child: ix,
                        char_offset: offset - start,
                    };
                }
                Node::Action(_) | Node::Placeholder(_) if offset == start => {
                    return Slot::Before(ix);
                }
                _ => {}
            }
            start += len;
        }
        Slot::End
    }

    pub(crate) fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), OffsetOutOfRange> {
        self.check_offset(offset)?;
        match self.slot(offset) {
            Slot::InText { child, char_offset } => {
                if let Node::Text(t) = &mut self.children[child] {
                    let byte = char_to_byte(&t.text, char_offset);
                    t.text.insert_str(byte, text);
                }
            }
            Slot::Before(ix) => self.children.insert(ix, Node::text(text)),
            Slot::End => self.children.push(Node::text(text)),
        }
        Ok(())
    }

    pub(crate) fn insert_node(&mut self, offset: usize, node: Node) -> Result<(), OffsetOutOfRange> {
        self.check_offset(offset)?;
        match self.slot(offset) {
            Slot::InText { child, char_offset } => {
                let Node::Text(t) = &mut self.children[child] else {
                    return Ok(());
                };
                let byte = char_to_byte(&t.text, char_offset);
                let tail = t.text.split_off(byte);
                self.children.insert(child + 1, node);
                self.children.insert(child + 2, Node::text(tail));
            }
            Slot::Before(ix) => self.children.insert(ix, node),
            Slot::End => self.children.push(node),
        }
        Ok(())
    }

    /// Removes every unit inside `range`, atoms included.
    pub(crate) fn remove_range(&mut self, range: Range<usize>) -> Result<(), OffsetOutOfRange> {
        self.check_offset(range.end)?;
        let mut start = 0;
        let mut kept: Vec<Node> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            let len = child.inline_len();
            match child {
                Node::Text(t) => {
                    let text: String = t
                        .text
                        .chars()
                        .enumerate()
                        .filter(|(ix, _)| !range.contains(&(start + ix)))
                        .map(|(_, ch)| ch)
                        .collect();
                    kept.push(Node::text(text));
                }
                atom => {
                    if !range.contains(&start) {
                        kept.push(atom);
                    }
                }
            }
            start += len;
        }
        self.children = kept;
        Ok(())
    }

    /// Merges adjacent text runs and drops empty ones.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            if let Node::Text(t) = &child {
                if t.text.is_empty() {
                    continue;
                }
                if let Some(Node::Text(prev)) = merged.last_mut() {
                    prev.text.push_str(&t.text);
                    continue;
                }
            }
            merged.push(child);
        }
        self.children = merged;
    }

    fn check_offset(&self, offset: usize) -> Result<(), OffsetOutOfRange> {
        let len = self.inline_len();
        if offset > len {
            return Err(OffsetOutOfRange { len });
        }
        Ok(())
    }
}

impl Document {
    pub fn new(children: Vec<Paragraph>) -> Self {
        let mut doc = Self { children };
        doc.normalize();
        doc
    }

    /// A document holding one paragraph.
    pub fn single(children: Vec<Node>) -> Self {
        Self::new(vec![Paragraph::new(children)])
    }

    pub fn paragraph(&self, block: usize) -> Option<&Paragraph> {
        self.children.get(block)
    }

    pub(crate) fn paragraph_mut(&mut self, block: usize) -> Option<&mut Paragraph> {
        self.children.get_mut(block)
    }

    pub fn normalize(&mut self) {
        if self.children.is_empty() {
            self.children.push(Paragraph::default());
        }
        for paragraph in &mut self.children {
            paragraph.normalize();
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flat_map(|p| p.children.iter())
    }

    /// Ids of real action nodes in document order. Placeholders are skipped.
    pub fn action_ids(&self) -> Vec<&ActionRecordId> {
        self.nodes().filter_map(Node::action_id).collect()
    }

    pub fn has_placeholder(&self) -> bool {
        self.nodes().any(|node| matches!(node, Node::Placeholder(_)))
    }

    pub fn end_point(&self) -> Point {
        let block = self.children.len().saturating_sub(1);
        let offset = self.paragraph(block).map(Paragraph::inline_len).unwrap_or(0);
        Point::new(block, offset)
    }

    pub fn clamp_point(&self, point: Point) -> Point {
        let Some(paragraph) = self.paragraph(point.block) else {
            return self.end_point();
        };
        Point::new(point.block, point.offset.min(paragraph.inline_len()))
    }

    pub fn clamp_selection(&self, selection: Selection) -> Selection {
        Selection::new(
            self.clamp_point(selection.anchor),
            self.clamp_point(selection.focus),
        )
    }

    /// The atom covered by a one-unit selection, i.e. a node selection.
    pub fn selected_atom(&self, selection: &Selection) -> Option<&Node> {
        let (start, end) = selection.ordered();
        if start.block != end.block || end.offset != start.offset + 1 {
            return None;
        }
        match self.paragraph(start.block)?.unit_at(start.offset)? {
            InlineUnit::Atom(node) => Some(node),
            InlineUnit::Char(_) => None,
        }
    }

    /// Absolute position: every paragraph contributes an opening and a
    /// closing token around its inline content.
    pub fn absolute_position(&self, point: Point) -> usize {
        let before: usize = self
            .children
            .iter()
            .take(point.block)
            .map(|p| p.inline_len() + 2)
            .sum();
        before + 1 + point.offset
    }

    pub fn point_at_position(&self, pos: usize) -> Option<Point> {
        let mut start = 0;
        for (block, paragraph) in self.children.iter().enumerate() {
            let len = paragraph.inline_len();
            if pos > start && pos <= start + 1 + len {
                return Some(Point::new(block, pos - start - 1));
            }
            start += len + 2;
        }
        None
    }

    /// Offset right after the action node with `id`.
    pub fn point_after_action(&self, id: &ActionRecordId) -> Option<Point> {
        for (block, paragraph) in self.children.iter().enumerate() {
            let mut offset = 0;
            for child in &paragraph.children {
                offset += child.inline_len();
                if child.action_id() == Some(id) {
                    return Some(Point::new(block, offset));
                }
            }
        }
        None
    }

    /// Number of action nodes before `point` whose id satisfies `tracked`.
    pub fn actions_before(&self, point: Point, tracked: impl Fn(&ActionRecordId) -> bool) -> usize {
        let mut count = 0;
        for (block, paragraph) in self.children.iter().enumerate() {
            if block > point.block {
                break;
            }
            let mut start = 0;
            for child in &paragraph.children {
                if block == point.block && start >= point.offset {
                    break;
                }
                if child.action_id().is_some_and(&tracked) {
                    count += 1;
                }
                start += child.inline_len();
            }
        }
        count
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (ix, paragraph) in self.children.iter().enumerate() {
            if ix > 0 {
                out.push('\n');
            }
            for child in &paragraph.children {
                match child {
                    Node::Text(t) => out.push_str(&t.text),
                    Node::Action(node) => out.push_str(&node.attrs.word),
                    Node::Placeholder(_) => {}
                }
            }
        }
        out
    }
}

pub(crate) fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NodeType;

    fn action(id: &str) -> Node {
        Node::action(ActionRecord::new(id, "incoming", NodeType::ItemActionNode).with_id(id))
    }

    #[test]
    fn insert_text_between_atoms_creates_a_run() {
        let mut p = Paragraph::new(vec![action("a"), action("b")]);
        p.insert_text(1, "hé").unwrap();
        p.insert_text(2, "x").unwrap();
        assert_eq!(p.children[1], Node::text("hxé"));
        assert_eq!(p.inline_len(), 5);
        assert!(p.insert_text(9, "nope").is_err());
    }

    #[test]
    fn remove_range_drops_atoms_and_chars() {
        let mut p = Paragraph::new(vec![Node::text("ab"), action("a"), Node::text("cd")]);
        p.remove_range(1..4).unwrap();
        p.normalize();
        assert_eq!(p.children, vec![Node::text("ad")]);
    }

    #[test]
    fn insert_node_splits_text() {
        let mut p = Paragraph::new(vec![Node::text("abcd")]);
        p.insert_node(2, action("a")).unwrap();
        p.normalize();
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::text("ab"));
        assert_eq!(p.children[2], Node::text("cd"));
    }

    #[test]
    fn absolute_positions_round_trip() {
        let doc = Document::new(vec![
            Paragraph::new(vec![Node::text("ab")]),
            Paragraph::new(vec![action("a"), Node::text("c")]),
        ]);
        let point = Point::new(1, 1);
        let pos = doc.absolute_position(point);
        assert_eq!(pos, 6);
        assert_eq!(doc.point_at_position(pos), Some(point));
        assert_eq!(doc.point_at_position(1), Some(Point::new(0, 0)));
    }

    #[test]
    fn actions_before_counts_only_tracked_ids() {
        let doc = Document::single(vec![action("a"), Node::text(" x "), action("b")]);
        let end = doc.end_point();
        assert_eq!(doc.actions_before(end, |_| true), 2);
        assert_eq!(doc.actions_before(end, |id| id.as_str() == "b"), 1);
        assert_eq!(doc.actions_before(Point::new(0, 1), |_| true), 1);
    }
}
