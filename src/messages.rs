//! Message types for the Elm-style architecture
//!
//! Every change to an editor state flows through [`Msg`]. The set is closed:
//! there is no string-keyed command namespace.

use serde::{Deserialize, Serialize};

use crate::commands::EditorCommand;
use crate::model::{BlockType, ListKind, Selection};

/// Inputs to [`crate::update::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Msg {
    /// Replace the selection (caret movement, mouse drag)
    Select(Selection),
    /// Type text over the selection
    InsertText(String),
    /// Split the block at the caret (Enter)
    InsertParagraph,
    /// Remove the selected content
    DeleteRange,
    /// Delete the selection, or the character before the caret (Backspace)
    DeleteBackward,
    /// Delete the selection, or the character after the caret (Delete)
    DeleteForward,
    /// A toolbar or keyboard command
    Command(EditorCommand),
    SetBlockType(BlockType),
    ToggleList(ListKind),
    /// Wrap the selection in a link, or unwrap links with `None`
    ToggleLink(Option<String>),
}

impl Msg {
    /// True for messages that may change the document (not just the selection)
    pub fn is_edit(&self) -> bool {
        !matches!(self, Msg::Select(_))
    }
}
