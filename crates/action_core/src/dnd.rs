use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{ActionRecord, NodeType};

/// Identifies one editor instance; drag payloads carry their origin's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(String);

impl EditorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EditorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Payload of an in-flight drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragItem {
    pub record: ActionRecord,
    pub origin_editor_id: EditorId,
    pub original_index: usize,
}

/// Laid-out bounds of one rendered action node; `index` is its store index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub index: usize,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NodeBox {
    pub fn new(index: usize, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            index,
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn midpoint_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// Whether `(x, y)` comes before this box in reading order.
    fn precedes(&self, x: f32, y: f32) -> bool {
        y < self.top || (y <= self.bottom && x < self.left)
    }
}

/// One entry of the list that actually gets rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedEntry {
    Record(ActionRecord),
    Placeholder(ActionRecord),
}

impl RenderedEntry {
    pub fn record(&self) -> &ActionRecord {
        match self {
            RenderedEntry::Record(record) | RenderedEntry::Placeholder(record) => record,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderedEntry::Placeholder(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Same-editor move; `to` is the destination index after removal.
    Reorder { from: usize, to: usize },
    /// The item belongs to another editor; the host completes the move.
    Transfer {
        item: DragItem,
        target_editor_id: EditorId,
        target_index: usize,
    },
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DndPhase {
    Idle,
    Hovering,
}

/// Per-editor drop-target state.
#[derive(Debug)]
pub struct DndCoordinator {
    editor_id: EditorId,
    node_type: NodeType,
    dragged_over_index: Option<usize>,
    hovering: Option<DragItem>,
}

impl DndCoordinator {
    pub fn new(editor_id: EditorId, node_type: NodeType) -> Self {
        Self {
            editor_id,
            node_type,
            dragged_over_index: None,
            hovering: None,
        }
    }

    pub fn editor_id(&self) -> &EditorId {
        &self.editor_id
    }

    pub fn phase(&self) -> DndPhase {
        if self.dragged_over_index.is_some() {
            DndPhase::Hovering
        } else {
            DndPhase::Idle
        }
    }

    pub fn dragged_over_index(&self) -> Option<usize> {
        self.dragged_over_index
    }

    pub fn hovering_item(&self) -> Option<&DragItem> {
        self.hovering.as_ref()
    }

    pub fn can_drop(&self, item: &DragItem) -> bool {
        item.record.action_node_type == self.node_type
    }

    /// Records the hover target. Returns whether the rendered list changes.
    pub fn hover_at(&mut self, item: &DragItem, index: usize, record_count: usize) -> bool {
        if !self.can_drop(item) {
            return self.leave();
        }
        let index = index.min(record_count);
        let changed = self.dragged_over_index != Some(index);
        self.dragged_over_index = Some(index);
        self.hovering = Some(item.clone());
        changed
    }

    pub fn hover(
        &mut self,
        item: &DragItem,
        layout: &[NodeBox],
        x: f32,
        y: f32,
        record_count: usize,
    ) -> bool {
        if !self.can_drop(item) {
            return self.leave();
        }
        let index = resolve_hover_index(layout, x, y, record_count);
        self.hover_at(item, index, record_count)
    }

    /// Pointer left the target. Returns whether a placeholder was showing.
    pub fn leave(&mut self) -> bool {
        self.hovering = None;
        self.dragged_over_index.take().is_some()
    }

    /// Drag finished elsewhere or was cancelled.
    pub fn end(&mut self) -> bool {
        self.leave()
    }

    /// Resolves a drop onto this editor and clears hover state.
    pub fn drop(&mut self, item: &DragItem, record_count: usize) -> DropOutcome {
        let target = self.dragged_over_index.unwrap_or(record_count);
        self.leave();

        if !self.can_drop(item) {
            return DropOutcome::Rejected;
        }

        let target = target.min(record_count);
        if item.origin_editor_id == self.editor_id {
            DropOutcome::Reorder {
                from: item.original_index,
                to: reorder_to_index_from_gap(item.original_index, target, record_count),
            }
        } else {
            DropOutcome::Transfer {
                item: item.clone(),
                target_editor_id: self.editor_id.clone(),
                target_index: target,
            }
        }
    }

    /// Store records with the placeholder spliced in at the hover index.
    pub fn rendered(&self, records: &[ActionRecord]) -> Vec<RenderedEntry> {
        let mut entries: Vec<RenderedEntry> =
            records.iter().cloned().map(RenderedEntry::Record).collect();
        if let (Some(index), Some(item)) = (self.dragged_over_index, self.hovering.as_ref()) {
            let index = index.min(entries.len());
            entries.insert(
                index,
                RenderedEntry::Placeholder(ActionRecord::placeholder_for(&item.record)),
            );
        }
        entries
    }
}

/// Left half of a node targets its slot, right half the slot after it.
/// Off-node positions go to the end, or to the start when the pointer
/// precedes every node.
pub fn resolve_hover_index(layout: &[NodeBox], x: f32, y: f32, record_count: usize) -> usize {
    if let Some(node) = layout.iter().find(|node| node.contains(x, y)) {
        let index = if x < node.midpoint_x() {
            node.index
        } else {
            node.index + 1
        };
        return index.min(record_count);
    }
    if !layout.is_empty() && layout.iter().all(|node| node.precedes(x, y)) {
        0
    } else {
        record_count
    }
}

/// Converts a gap index (slot between items, counted with the dragged item
/// still in place) into the destination index after removing the item.
pub fn reorder_to_index_from_gap(from_ix: usize, gap_index: usize, item_count: usize) -> usize {
    let mut to_ix = gap_index;
    if to_ix > from_ix {
        to_ix = to_ix.saturating_sub(1);
    }
    to_ix.min(item_count.saturating_sub(1))
}
