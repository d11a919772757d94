//! Editor state - one immutable snapshot of (document, selection, version)

use super::document::Document;
use super::selection::Selection;

/// Whether a surface accepts edits. Fixed for the lifetime of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Editable,
    ReadOnly,
}

/// Immutable editor snapshot. Every applied command yields a new value with
/// `version` incremented by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub document: Document,
    pub selection: Option<Selection>,
    pub version: u64,
    pub mode: EditorMode,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::empty(), EditorMode::Editable)
    }
}

impl EditorState {
    /// Fresh state at version 0 with no selection
    pub fn new(document: Document, mode: EditorMode) -> Self {
        Self {
            document,
            selection: None,
            version: 0,
            mode,
        }
    }

    /// Same state with a selection set (no version bump; used when mounting)
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == EditorMode::ReadOnly
    }

    /// Successor state carrying a new document and selection
    pub(crate) fn next(&self, document: Document, selection: Option<Selection>) -> Self {
        Self {
            document,
            selection,
            version: self.version + 1,
            mode: self.mode,
        }
    }
}
