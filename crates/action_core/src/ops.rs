use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Node, Point, Selection};

/// Source tag carried by every content replacement issued by the synchronizer.
pub const SYNC_REPLACE_SOURCE: &str = "sync:replace_content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        at: Point,
        text: String,
    },
    RemoveRange {
        #[serde(default)]
        block: usize,
        range: Range<usize>,
    },
    InsertNode {
        at: Point,
        node: Node,
    },
    ReplaceContent {
        document: Document,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }

    pub fn is_sync_replace(&self) -> bool {
        self.meta.source.as_deref() == Some(SYNC_REPLACE_SOURCE)
    }
}
