//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use caderno::messages::Msg;
use caderno::model::{
    Block, BlockPath, Document, DocumentId, EditorMode, EditorState, FormatSet, Inline, List,
    ListItem, ListKind, Point, Selection, TextRun,
};
use caderno::persistence::{Notifier, PersistenceError, PersistenceService};
use caderno::update::dispatch;

// ============================================================================
// Documents
// ============================================================================

/// Document with one plain paragraph per entry
pub fn paragraphs(texts: &[&str]) -> Document {
    Document::from_paragraphs(texts)
}

pub fn bold(text: &str) -> Inline {
    Inline::formatted(text, FormatSet::BOLD)
}

pub fn link(url: &str, text: &str) -> Inline {
    Inline::link(url, vec![TextRun::plain(text)])
}

/// A flat list block with one item per entry
pub fn list(kind: ListKind, items: &[&str]) -> Block {
    Block::List(List {
        kind,
        items: items
            .iter()
            .map(|text| ListItem::new(vec![Inline::text(*text)]))
            .collect(),
    })
}

// ============================================================================
// Selections
// ============================================================================

pub fn pt(path: impl Into<BlockPath>, inline_index: usize, offset: usize) -> Point {
    Point::new(path, inline_index, offset)
}

pub fn caret(path: impl Into<BlockPath>, inline_index: usize, offset: usize) -> Selection {
    Selection::caret(pt(path, inline_index, offset))
}

/// Selection inside the first run of one top-level block
pub fn range_in(block: usize, from: usize, to: usize) -> Selection {
    Selection::new(pt(vec![block], 0, from), pt(vec![block], 0, to))
}

// ============================================================================
// Editor states
// ============================================================================

pub fn editable(document: Document, selection: Selection) -> EditorState {
    EditorState::new(document, EditorMode::Editable).with_selection(selection)
}

pub fn read_only(document: Document, selection: Selection) -> EditorState {
    EditorState::new(document, EditorMode::ReadOnly).with_selection(selection)
}

/// Dispatch and require the message to apply
pub fn apply(state: &EditorState, msg: Msg) -> EditorState {
    let result = dispatch(state, msg.clone());
    assert!(result.applied, "expected {:?} to apply", msg);
    result.state
}

/// Dispatch and require the message to be rejected with the state unchanged
pub fn reject(state: &EditorState, msg: Msg) {
    let result = dispatch(state, msg.clone());
    assert!(!result.applied, "expected {:?} to be rejected", msg);
    assert_eq!(&result.state, state);
}

/// Top-level blocks' plain text, one entry per text block
pub fn texts(document: &Document) -> Vec<String> {
    document.plain_text().split('\n').map(str::to_string).collect()
}

// ============================================================================
// Collaborators
// ============================================================================

/// Persistence service recording every call
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub saves: Vec<(DocumentId, String)>,
    pub fail: bool,
}

impl PersistenceService for RecordingStore {
    fn save(&mut self, id: &DocumentId, content: &str) -> Result<(), PersistenceError> {
        self.saves.push((id.clone(), content.to_string()));
        if self.fail {
            Err(PersistenceError::Rejected("offline".into()))
        } else {
            Ok(())
        }
    }
}

/// Notifier recording messages
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub errors: Vec<String>,
    pub successes: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn notify_success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }
}
