//! Editor model - documents, selections and editor snapshots
//!
//! Everything here is a plain value. State changes go through
//! [`crate::update::dispatch`], which returns a new [`EditorState`].

pub mod document;
pub mod editor;
pub(crate) mod flat;
pub mod selection;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use document::{
    inline_text, Block, BlockPath, BlockType, Document, Format, FormatSet, HeadingLevel, Inline,
    Link, List, ListItem, ListKind, TextBlockKind, TextBlockRef, TextRun,
};
pub use editor::{EditorMode, EditorState};
pub use selection::{Point, Selection};

/// Identifies a persisted note
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
