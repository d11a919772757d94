//! Update functions for the Elm-style architecture
//!
//! All state transitions flow through these functions. Each takes the current
//! [`EditorState`] and a selection and returns a new state; nothing is
//! mutated in place. Failures never escape [`dispatch`]: a stale selection or
//! a rejected command leaves the state unchanged and reports `applied: false`.

mod block;
mod format;
mod link;
mod text_edit;

use thiserror::Error;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

use crate::commands::{EditorCommand, PLACEHOLDER_URL};
use crate::messages::Msg;
use crate::model::flat::{FlatDoc, Pos};
use crate::model::{BlockType, EditorState, Format, HeadingLevel, ListKind, Selection};
#[cfg(debug_assertions)]
use crate::tracing::StateSnapshot;

pub use block::{set_block_type, toggle_list};
pub use format::toggle_inline_format;
pub use link::{link_at_selection, link_range_at, toggle_link};
pub use text_edit::{delete_backward, delete_forward, delete_range, insert_paragraph, insert_text};

/// Why a command left the state unchanged
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("editor is read-only")]
    ReadOnly,

    #[error("no selection")]
    NoSelection,

    #[error("selection does not match the document")]
    StaleSelection,

    #[error("command needs a non-empty selection")]
    NothingSelected,

    #[error("link URL must not be empty")]
    EmptyUrl,

    #[error("command would not change the document")]
    NoChange,
}

/// Result of [`dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub state: EditorState,
    pub applied: bool,
}

/// Apply a message to a state.
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn dispatch(state: &EditorState, msg: Msg) -> Dispatched {
    #[cfg(debug_assertions)]
    {
        dispatch_traced(state, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        dispatch_inner(state, msg)
    }
}

fn dispatch_inner(state: &EditorState, msg: Msg) -> Dispatched {
    match apply(state, msg) {
        Ok(next) => Dispatched {
            state: next,
            applied: true,
        },
        Err(err) => {
            tracing::debug!(target: "command", %err, "command rejected");
            Dispatched {
                state: state.clone(),
                applied: false,
            }
        }
    }
}

fn apply(state: &EditorState, msg: Msg) -> Result<EditorState, CommandError> {
    if msg.is_edit() {
        ensure_editable(state)?;
    }
    let current = || state.selection.as_ref().ok_or(CommandError::NoSelection);
    match msg {
        Msg::Select(selection) => select(state, selection),
        Msg::InsertText(text) => insert_text(state, current()?, &text),
        Msg::InsertParagraph => insert_paragraph(state, current()?),
        Msg::DeleteRange => delete_range(state, current()?),
        Msg::DeleteBackward => delete_backward(state, current()?),
        Msg::DeleteForward => delete_forward(state, current()?),
        Msg::Command(command) => apply_command(state, current()?, command),
        Msg::SetBlockType(block_type) => set_block_type(state, current()?, block_type),
        Msg::ToggleList(kind) => toggle_list(state, current()?, kind),
        Msg::ToggleLink(url) => toggle_link(state, current()?, url.as_deref()),
    }
}

fn apply_command(
    state: &EditorState,
    selection: &Selection,
    command: EditorCommand,
) -> Result<EditorState, CommandError> {
    match command {
        EditorCommand::Bold => toggle_inline_format(state, selection, Format::Bold),
        EditorCommand::Italic => toggle_inline_format(state, selection, Format::Italic),
        EditorCommand::Underline => toggle_inline_format(state, selection, Format::Underline),
        EditorCommand::Strikethrough => {
            toggle_inline_format(state, selection, Format::Strikethrough)
        }
        EditorCommand::Code => toggle_inline_format(state, selection, Format::Code),
        EditorCommand::Paragraph => set_block_type(state, selection, BlockType::Paragraph),
        EditorCommand::Heading1 => {
            set_block_type(state, selection, BlockType::Heading(HeadingLevel::H1))
        }
        EditorCommand::Heading2 => {
            set_block_type(state, selection, BlockType::Heading(HeadingLevel::H2))
        }
        EditorCommand::ListOrdered => toggle_list(state, selection, ListKind::Ordered),
        EditorCommand::ListUnordered => toggle_list(state, selection, ListKind::Unordered),
        EditorCommand::LinkToggle => {
            if link_at_selection(&state.document, selection).is_some() {
                toggle_link(state, selection, None)
            } else {
                toggle_link(state, selection, Some(PLACEHOLDER_URL))
            }
        }
    }
}

/// Replace the selection after checking it against the document
pub fn select(state: &EditorState, selection: Selection) -> Result<EditorState, CommandError> {
    FlatDoc::new(&state.document)
        .resolve_selection(&selection)
        .ok_or(CommandError::StaleSelection)?;
    if state.selection.as_ref() == Some(&selection) {
        return Err(CommandError::NoChange);
    }
    Ok(state.next(state.document.clone(), Some(selection)))
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn ensure_editable(state: &EditorState) -> Result<(), CommandError> {
    if state.is_read_only() {
        Err(CommandError::ReadOnly)
    } else {
        Ok(())
    }
}

/// Selection endpoints in the flat view, as `(anchor, focus, start, end)`
pub(crate) struct Resolved {
    pub anchor: Pos,
    pub focus: Pos,
    pub start: Pos,
    pub end: Pos,
}

impl Resolved {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

pub(crate) fn resolve(flat: &FlatDoc, selection: &Selection) -> Result<Resolved, CommandError> {
    let (anchor, focus) = flat
        .resolve_selection(selection)
        .ok_or(CommandError::StaleSelection)?;
    Ok(Resolved {
        anchor,
        focus,
        start: anchor.min(focus),
        end: anchor.max(focus),
    })
}

/// Per-block char ranges covered by `[start, end)`
pub(crate) fn block_ranges(flat: &FlatDoc, start: Pos, end: Pos) -> Vec<(usize, usize, usize)> {
    (start.block..=end.block)
        .filter_map(|block| {
            let len = flat.blocks.get(block)?.len();
            let from = if block == start.block { start.offset } else { 0 };
            let to = if block == end.block { end.offset } else { len };
            Some((block, from, to))
        })
        .collect()
}

/// Traced dispatch wrapper (debug builds only)
///
/// Captures before/after state and logs diffs for debugging.
#[cfg(debug_assertions)]
fn dispatch_traced(state: &EditorState, msg: Msg) -> Dispatched {
    let msg_name = msg_type_name(&msg);
    let _span = span!(Level::DEBUG, "dispatch", msg = %msg_name).entered();

    let before = StateSnapshot::from_state(state);
    debug!(target: "message", msg = %msg_name, "processing");

    let result = dispatch_inner(state, msg);

    let after = StateSnapshot::from_state(&result.state);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "selection", %diff, "state changed");
    }

    result
}

/// Get a display name for a message type
///
/// Uses Debug formatting to include variant names and arguments, except for
/// inserted text, which is abbreviated to its length.
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::InsertText(text) => format!("InsertText({} chars)", text.chars().count()),
        Msg::Command(command) => format!("Command::{}", command),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, EditorMode, Point};

    fn state(text: &str) -> EditorState {
        EditorState::new(Document::from_paragraphs(&[text]), EditorMode::Editable)
            .with_selection(Selection::new(
                Point::new(vec![0], 0, 0),
                Point::new(vec![0], 0, text.chars().count()),
            ))
    }

    #[test]
    fn test_applied_command_bumps_version_once() {
        let s = state("hello");
        let result = dispatch(&s, Msg::Command(EditorCommand::Bold));
        assert!(result.applied);
        assert_eq!(result.state.version, s.version + 1);
    }

    #[test]
    fn test_rejected_command_returns_input_state() {
        let s = EditorState::new(Document::from_paragraphs(&["hello"]), EditorMode::Editable);
        let result = dispatch(&s, Msg::Command(EditorCommand::Bold));
        assert!(!result.applied);
        assert_eq!(result.state, s);
    }

    #[test]
    fn test_read_only_rejects_edits_but_allows_selection() {
        let mut s = state("hello");
        s.mode = EditorMode::ReadOnly;
        let result = dispatch(&s, Msg::InsertText("x".into()));
        assert!(!result.applied);
        assert_eq!(result.state, s);

        let caret = Selection::caret(Point::new(vec![0], 0, 2));
        let result = dispatch(&s, Msg::Select(caret.clone()));
        assert!(result.applied);
        assert_eq!(result.state.selection, Some(caret));
    }

    #[test]
    fn test_read_only_is_reported_before_missing_selection() {
        let s = EditorState::new(Document::from_paragraphs(&["hello"]), EditorMode::ReadOnly);
        assert_eq!(apply(&s, Msg::DeleteBackward), Err(CommandError::ReadOnly));
        assert_eq!(
            apply(&s, Msg::Command(EditorCommand::Bold)),
            Err(CommandError::ReadOnly)
        );
    }

    #[test]
    fn test_stale_select_is_rejected() {
        let s = state("hello");
        let stale = Selection::caret(Point::new(vec![3], 0, 0));
        assert_eq!(select(&s, stale), Err(CommandError::StaleSelection));
    }

    #[test]
    fn test_link_toggle_command_inserts_placeholder_then_unlinks() {
        let s = state("hello");
        let linked = dispatch(&s, Msg::Command(EditorCommand::LinkToggle));
        assert!(linked.applied);
        let sel = linked.state.selection.clone().unwrap();
        assert_eq!(
            link_at_selection(&linked.state.document, &sel).as_deref(),
            Some(PLACEHOLDER_URL)
        );

        let unlinked = dispatch(&linked.state, Msg::Command(EditorCommand::LinkToggle));
        assert!(unlinked.applied);
        assert_eq!(unlinked.state.document, s.document);
    }
}
