use std::ops::Range;

use thiserror::Error;

use crate::document::{Document, OffsetOutOfRange, Point, Selection};
use crate::ops::{Op, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("block {block} out of range ({len} blocks)")]
    BlockOutOfRange { block: usize, len: usize },
    #[error("offset {offset} out of range in block {block} (length {len})")]
    OffsetOutOfRange {
        block: usize,
        offset: usize,
        len: usize,
    },
}

/// Outcome of a transaction the engine actually ran.
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    pub doc_before: Document,
    pub doc_changed: bool,
    pub source: Option<String>,
}

impl AppliedTransaction {
    pub fn is_sync_replace(&self) -> bool {
        self.source.as_deref() == Some(crate::ops::SYNC_REPLACE_SOURCE)
    }
}

/// The rich-text engine owning the document tree between synchronizer passes.
#[derive(Debug)]
pub struct Engine {
    doc: Document,
    selection: Selection,
    focused: bool,
    composing: bool,
    destroyed: bool,
}

impl Engine {
    pub fn new(mut doc: Document) -> Self {
        doc.normalize();
        let selection = Selection::collapsed(doc.end_point());
        Self {
            doc,
            selection,
            focused: false,
            composing: false,
            destroyed: false,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn caret(&self) -> Option<Point> {
        self.selection.caret()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if self.destroyed {
            return;
        }
        self.selection = self.doc.clamp_selection(selection);
    }

    pub fn is_focused(&self) -> bool {
        self.focused && !self.destroyed
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.focused = false;
        self.composing = false;
    }

    /// Applies all ops or none. A destroyed engine ignores the transaction.
    pub fn apply(&mut self, tx: Transaction) -> Result<Option<AppliedTransaction>, ApplyError> {
        if self.destroyed {
            return Ok(None);
        }

        let mut doc = self.doc.clone();
        let mut selection = self.selection;
        for op in tx.ops {
            apply_op_to(&mut doc, &mut selection, op)?;
        }
        doc.normalize();
        if let Some(sel) = tx.selection_after {
            selection = sel;
        }
        selection = doc.clamp_selection(selection);

        let doc_changed = doc != self.doc;
        let doc_before = std::mem::replace(&mut self.doc, doc);
        self.selection = selection;

        Ok(Some(AppliedTransaction {
            doc_before,
            doc_changed,
            source: tx.meta.source,
        }))
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<(), ApplyError> {
    let block_count = doc.children.len();
    let out_of_range = |block: usize, offset: usize| {
        move |err: OffsetOutOfRange| ApplyError::OffsetOutOfRange {
            block,
            offset,
            len: err.len,
        }
    };

    match op {
        Op::InsertText { at, text } => {
            let paragraph = doc
                .paragraph_mut(at.block)
                .ok_or(ApplyError::BlockOutOfRange {
                    block: at.block,
                    len: block_count,
                })?;
            paragraph
                .insert_text(at.offset, &text)
                .map_err(out_of_range(at.block, at.offset))?;
            transform_selection_insert(selection, at, text.chars().count());
        }
        Op::RemoveRange { block, range } => {
            let paragraph = doc
                .paragraph_mut(block)
                .ok_or(ApplyError::BlockOutOfRange {
                    block,
                    len: block_count,
                })?;
            if range.start >= range.end {
                return Ok(());
            }
            paragraph
                .remove_range(range.clone())
                .map_err(out_of_range(block, range.end))?;
            transform_selection_remove(selection, block, range);
        }
        Op::InsertNode { at, node } => {
            let paragraph = doc
                .paragraph_mut(at.block)
                .ok_or(ApplyError::BlockOutOfRange {
                    block: at.block,
                    len: block_count,
                })?;
            paragraph
                .insert_node(at.offset, node)
                .map_err(out_of_range(at.block, at.offset))?;
            transform_selection_insert(selection, at, 1);
        }
        Op::ReplaceContent { document } => {
            *doc = document;
            doc.normalize();
            *selection = doc.clamp_selection(*selection);
        }
    }
    Ok(())
}

fn transform_selection_insert(selection: &mut Selection, at: Point, len: usize) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block == at.block && point.offset >= at.offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove(selection: &mut Selection, block: usize, range: Range<usize>) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block != block || point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}
