//! Floating link overlay
//!
//! A small state machine (`Hidden`, `View`, `Edit`) driven by selection
//! changes, plus the placement of the overlay against the bounding rectangle
//! of the selection.

use crate::model::flat::FlatDoc;
use crate::model::{Document, EditorState, Selection};
use crate::update::{link_range_at, toggle_link};

// ============================================================================
// Geometry
// ============================================================================

/// Rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Get the right edge X coordinate
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Get the bottom edge Y coordinate
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Source of selection geometry: the platform's text layout
pub trait SelectionGeometry {
    /// Bounding rectangle of the selected range, `None` when it has no layout
    fn selection_bounding_rect(&self, document: &Document, selection: &Selection) -> Option<Rect>;
}

/// Fixed-pitch layout for headless surfaces: one line per text block, no
/// wrapping, every char `char_width` wide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceLayout {
    pub char_width: f32,
    pub line_height: f32,
    pub width: f32,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            width: 1280.0,
        }
    }
}

impl SelectionGeometry for MonospaceLayout {
    fn selection_bounding_rect(&self, document: &Document, selection: &Selection) -> Option<Rect> {
        let flat = FlatDoc::new(document);
        let (anchor, focus) = flat.resolve_selection(selection)?;
        let (start, end) = (anchor.min(focus), anchor.max(focus));

        let top = start.block as f32 * self.line_height;
        if start.block == end.block {
            let left = start.offset as f32 * self.char_width;
            let width = (end.offset - start.offset) as f32 * self.char_width;
            Some(Rect::new(left, top, width, self.line_height))
        } else {
            let lines = (end.block - start.block + 1) as f32;
            Some(Rect::new(0.0, top, self.width, lines * self.line_height))
        }
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Size of the overlay and its gap from the selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub width: f32,
    pub height: f32,
    /// Vertical gap between the selection and the overlay
    pub fixed_offset: f32,
}

impl OverlayConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            fixed_offset: 10.0,
        }
    }

    /// Set the offset (builder pattern)
    pub fn with_offset(mut self, fixed_offset: f32) -> Self {
        self.fixed_offset = fixed_offset;
        self
    }

    /// Place the overlay below `rect`, flipping above it when it would
    /// overflow the bottom edge, and clamped inside the viewport
    pub fn compute_bounds(&self, rect: Rect, viewport: Size) -> OverlayBounds {
        let max_x = (viewport.width - self.width).max(0.0);
        let x = rect.left.clamp(0.0, max_x);

        let below = rect.bottom() + self.fixed_offset;
        let y = if below + self.height > viewport.height {
            rect.top - self.height - self.fixed_offset
        } else {
            below
        };

        OverlayBounds {
            x,
            y: y.max(0.0),
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::new(320.0, 40.0)
    }
}

/// Computed overlay bounds (viewport coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Hidden,
    /// Showing the URL of the link under the selection
    View { url: String },
    /// Editing a draft URL; `url` is what cancel returns to
    Edit { url: String, draft: String },
}

/// Link overlay for one editing surface
#[derive(Debug, Clone)]
pub struct LinkOverlay {
    state: OverlayState,
    link_range: Option<Selection>,
    bounds: Option<OverlayBounds>,
    config: OverlayConfig,
    viewport: Size,
    torn_down: bool,
}

impl LinkOverlay {
    pub fn new(config: OverlayConfig, viewport: Size) -> Self {
        Self {
            state: OverlayState::Hidden,
            link_range: None,
            bounds: None,
            config,
            viewport,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    /// Where the overlay renders, while visible
    pub fn bounds(&self) -> Option<OverlayBounds> {
        self.bounds
    }

    /// Selection covering the whole link the overlay is showing
    pub fn link_range(&self) -> Option<&Selection> {
        self.link_range.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Recompute from a new editor state. A range selection whose anchor is
    /// in a link shows that link; anything else hides the overlay, dropping
    /// any unconfirmed draft.
    pub fn on_selection_change(&mut self, editor: &EditorState, geometry: &dyn SelectionGeometry) {
        if self.torn_down {
            return;
        }
        let link = editor
            .selection
            .as_ref()
            .filter(|selection| !selection.is_collapsed())
            .and_then(|selection| link_range_at(&editor.document, selection));

        match link {
            Some((url, range)) => {
                tracing::debug!(target: "overlay", %url, "showing link overlay");
                self.show(url, range, editor, geometry);
            }
            None => self.hide(),
        }
    }

    /// View → Edit, with the draft starting at the current URL
    pub fn begin_edit(&mut self) -> bool {
        match &self.state {
            OverlayState::View { url } => {
                self.state = OverlayState::Edit {
                    url: url.clone(),
                    draft: url.clone(),
                };
                true
            }
            _ => false,
        }
    }

    /// Replace the draft while editing
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.state {
            OverlayState::Edit { draft, .. } => {
                *draft = text.into();
                true
            }
            _ => false,
        }
    }

    /// Edit → View with the original URL; the draft is dropped
    pub fn cancel(&mut self) -> bool {
        match &self.state {
            OverlayState::Edit { url, .. } => {
                self.state = OverlayState::View { url: url.clone() };
                true
            }
            _ => false,
        }
    }

    /// Commit the draft: unlink the original link range, relink it with the
    /// draft URL and show the result. Returns the new editor state, or `None`
    /// when not editing or the draft is rejected.
    pub fn confirm(
        &mut self,
        editor: &EditorState,
        geometry: &dyn SelectionGeometry,
    ) -> Option<EditorState> {
        let OverlayState::Edit { draft, .. } = &self.state else {
            return None;
        };
        let draft = draft.trim().to_string();
        if draft.is_empty() {
            return None;
        }
        let range = self.link_range.clone()?;

        let relinked = toggle_link(editor, &range, None)
            .and_then(|unlinked| {
                let range = unlinked.selection.clone().unwrap_or(range);
                toggle_link(&unlinked, &range, Some(&draft))
            });
        match relinked {
            Ok(next) => {
                let range = next.selection.clone()?;
                self.show(draft, range, &next, geometry);
                Some(next)
            }
            Err(err) => {
                tracing::debug!(target: "overlay", %err, "link edit could not be applied");
                self.hide();
                None
            }
        }
    }

    /// View → Hidden, removing the link
    pub fn unlink(&mut self, editor: &EditorState) -> Option<EditorState> {
        if !matches!(self.state, OverlayState::View { .. }) {
            return None;
        }
        let range = self.link_range.clone()?;
        let result = toggle_link(editor, &range, None).ok();
        self.hide();
        result
    }

    /// Surface unmounted: hide and ignore everything from now on
    pub fn teardown(&mut self) {
        self.hide();
        self.torn_down = true;
    }

    fn show(
        &mut self,
        url: String,
        range: Selection,
        editor: &EditorState,
        geometry: &dyn SelectionGeometry,
    ) {
        let rect = editor
            .selection
            .as_ref()
            .and_then(|selection| geometry.selection_bounding_rect(&editor.document, selection));
        self.bounds = rect.map(|rect| self.config.compute_bounds(rect, self.viewport));
        self.link_range = Some(range);
        self.state = OverlayState::View { url };
    }

    fn hide(&mut self) {
        self.state = OverlayState::Hidden;
        self.link_range = None;
        self.bounds = None;
    }
}
