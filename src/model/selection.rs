//! Selection types: points addressing text inside a document

use serde::{Deserialize, Serialize};

use super::document::BlockPath;

/// A position inside a text block.
///
/// `inline_index` counts the block's leaf runs (links expanded into their
/// children); `offset` counts chars within that run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub block_path: BlockPath,
    pub inline_index: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block_path: impl Into<BlockPath>, inline_index: usize, offset: usize) -> Self {
        Self {
            block_path: block_path.into(),
            inline_index,
            offset,
        }
    }
}

/// A selection with anchor (where it started) and focus (where it ends).
///
/// Anchor and focus are in no guaranteed order; the document decides which
/// one comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (a caret)
    pub fn caret(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// A caret is a selection whose anchor equals its focus
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Collapse onto the focus point
    pub fn collapse(&mut self) {
        self.anchor = self.focus.clone();
    }
}
