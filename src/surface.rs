//! Editing surface - one open note
//!
//! Owns the note's [`EditorState`] and the views derived from it (toolbar,
//! link overlay), and commits the serialized document to the persistence
//! bridge after every edit. Surfaces never share state with each other.

use std::time::Instant;

use crate::codec;
use crate::config::EditorConfig;
use crate::messages::Msg;
use crate::model::{DocumentId, EditorMode, EditorState, Point, Selection};
use crate::overlay::{LinkOverlay, SelectionGeometry};
use crate::persistence::{Notifier, PersistenceBridge};
use crate::preview::document_preview;
use crate::toolbar::{toolbar_for, ToolbarState};
use crate::update::dispatch;

/// Shown when a stored note cannot be opened
pub const LOAD_FAILED: &str = "Não foi possível abrir a nota. Um documento vazio foi criado.";

pub struct EditorSurface {
    id: DocumentId,
    state: EditorState,
    toolbar: ToolbarState,
    overlay: LinkOverlay,
    geometry: Box<dyn SelectionGeometry>,
    /// Serialized form of `state.document`
    serialized: String,
    /// Stored content this surface was opened with, if it parsed
    loaded: Option<String>,
    preview_length: usize,
    torn_down: bool,
}

impl EditorSurface {
    /// Open a note. `serialized` is `None` for a new note; content that does
    /// not parse opens as an empty paragraph and reports an error to
    /// `notifier`.
    pub fn mount(
        id: DocumentId,
        serialized: Option<&str>,
        mode: EditorMode,
        config: &EditorConfig,
        geometry: Box<dyn SelectionGeometry>,
        notifier: &mut dyn Notifier,
    ) -> Self {
        let (document, loaded) = match serialized.map(codec::deserialize) {
            None => (Default::default(), None),
            Some(Ok(document)) => (document, serialized.map(str::to_string)),
            Some(Err(err)) => {
                tracing::warn!(%id, %err, "stored note does not parse, opening empty");
                notifier.notify_error(LOAD_FAILED);
                (Default::default(), None)
            }
        };

        let mut state = EditorState::new(document, mode);
        if let Some(first) = state.document.text_block_paths().into_iter().next() {
            state = state.with_selection(Selection::caret(Point::new(first, 0, 0)));
        }
        let serialized = codec::serialize(&state.document);
        tracing::debug!(%id, ?mode, "surface mounted");

        Self {
            id,
            toolbar: toolbar_for(&state),
            overlay: LinkOverlay::new(config.overlay(), config.viewport()),
            geometry,
            state,
            serialized,
            loaded,
            preview_length: config.preview_length,
            torn_down: false,
        }
    }

    /// Tell the bridge what is already stored, so reopening and closing a
    /// note without edits never saves
    pub fn register(&self, bridge: &mut PersistenceBridge) {
        if let Some(loaded) = &self.loaded {
            bridge.mark_forwarded(&self.id, loaded.clone());
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.id
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn overlay(&self) -> &LinkOverlay {
        &self.overlay
    }

    /// Current document in its persisted form
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    pub fn preview(&self) -> String {
        document_preview(&self.state.document, self.preview_length)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Dispatch a message. Returns whether it was applied.
    pub fn update(&mut self, msg: Msg, bridge: &mut PersistenceBridge, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        let result = dispatch(&self.state, msg);
        if result.applied {
            self.replace_state(result.state, bridge, now);
        }
        result.applied
    }

    // === Link overlay actions ===

    pub fn begin_link_edit(&mut self) -> bool {
        !self.torn_down && self.overlay.begin_edit()
    }

    pub fn set_link_draft(&mut self, draft: impl Into<String>) -> bool {
        !self.torn_down && self.overlay.set_draft(draft)
    }

    pub fn cancel_link_edit(&mut self) -> bool {
        !self.torn_down && self.overlay.cancel()
    }

    /// Apply the overlay's draft URL to the link it shows
    pub fn confirm_link_edit(&mut self, bridge: &mut PersistenceBridge, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        match self.overlay.confirm(&self.state, self.geometry.as_ref()) {
            Some(next) => {
                self.replace_state(next, bridge, now);
                true
            }
            None => false,
        }
    }

    /// Remove the link the overlay shows
    pub fn unlink(&mut self, bridge: &mut PersistenceBridge, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        match self.overlay.unlink(&self.state) {
            Some(next) => {
                self.replace_state(next, bridge, now);
                true
            }
            None => false,
        }
    }

    /// Close the surface: the pending save is cancelled, not flushed
    pub fn teardown(&mut self, bridge: &mut PersistenceBridge) {
        if self.torn_down {
            return;
        }
        bridge.cancel(&self.id);
        self.overlay.teardown();
        self.torn_down = true;
        tracing::debug!(id = %self.id, "surface torn down");
    }

    fn replace_state(&mut self, next: EditorState, bridge: &mut PersistenceBridge, now: Instant) {
        let document_changed = next.document != self.state.document;
        self.state = next;
        self.toolbar = toolbar_for(&self.state);
        self.overlay
            .on_selection_change(&self.state, self.geometry.as_ref());

        if document_changed {
            let serialized = codec::serialize(&self.state.document);
            if serialized != self.serialized {
                bridge.commit(&self.id, serialized.clone(), now);
                self.serialized = serialized;
            }
        }
    }
}

impl std::fmt::Debug for EditorSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSurface")
            .field("id", &self.id)
            .field("version", &self.state.version)
            .field("mode", &self.state.mode)
            .field("overlay", self.overlay.state())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
