//! Link overlay tests - state transitions and placement

mod common;

use caderno::model::{Block, Document, EditorState, Inline, Selection};
use caderno::overlay::{
    LinkOverlay, MonospaceLayout, OverlayConfig, OverlayState, Rect, SelectionGeometry, Size,
};
use common::{caret, editable, link, paragraphs, pt};

/// Geometry reporting the same rectangle for every selection
struct FixedRect(Rect);

impl SelectionGeometry for FixedRect {
    fn selection_bounding_rect(&self, _: &Document, _: &Selection) -> Option<Rect> {
        Some(self.0)
    }
}

fn linked_doc() -> Document {
    Document::new(vec![Block::paragraph(vec![
        Inline::text("see "),
        link("https://x.test", "here"),
    ])])
}

/// Range over the link text, anchored inside the link
fn on_link() -> EditorState {
    editable(
        linked_doc(),
        Selection::new(pt(vec![0], 1, 0), pt(vec![0], 1, 4)),
    )
}

fn overlay() -> LinkOverlay {
    LinkOverlay::new(OverlayConfig::default(), Size::new(1280.0, 800.0))
}

fn view_url(overlay: &LinkOverlay) -> Option<&str> {
    match overlay.state() {
        OverlayState::View { url } => Some(url),
        _ => None,
    }
}

// ========================================================================
// Transitions
// ========================================================================

#[test]
fn test_range_on_link_shows_view() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    overlay.on_selection_change(&on_link(), &layout);

    assert_eq!(view_url(&overlay), Some("https://x.test"));
    let bounds = overlay.bounds().unwrap();
    // "see " is 4 chars of 8px; the overlay sits 10px under the 20px line
    assert_eq!(bounds.x, 32.0);
    assert_eq!(bounds.y, 30.0);
    assert_eq!((bounds.width, bounds.height), (320.0, 40.0));

    // The stored range covers the whole link and starts inside it
    assert_eq!(
        overlay.link_range(),
        Some(&Selection::new(pt(vec![0], 1, 0), pt(vec![0], 1, 4)))
    );
}

#[test]
fn test_range_off_link_stays_hidden() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    let state = editable(linked_doc(), Selection::new(pt(vec![0], 0, 0), pt(vec![0], 0, 3)));
    overlay.on_selection_change(&state, &layout);

    assert_eq!(overlay.state(), &OverlayState::Hidden);
    assert!(overlay.bounds().is_none());
}

#[test]
fn test_collapse_hides_and_discards_draft() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    overlay.on_selection_change(&on_link(), &layout);
    assert!(overlay.begin_edit());
    assert!(overlay.set_draft("https://draft.test"));

    let collapsed = editable(linked_doc(), caret(vec![0], 1, 2));
    overlay.on_selection_change(&collapsed, &layout);
    assert_eq!(overlay.state(), &OverlayState::Hidden);

    // Reselecting starts again from the stored url, not the old draft
    overlay.on_selection_change(&on_link(), &layout);
    assert!(overlay.begin_edit());
    assert_eq!(
        overlay.state(),
        &OverlayState::Edit {
            url: "https://x.test".into(),
            draft: "https://x.test".into()
        }
    );
}

#[test]
fn test_cancel_returns_to_original_url() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    overlay.on_selection_change(&on_link(), &layout);
    overlay.begin_edit();
    overlay.set_draft("https://other.test");

    assert!(overlay.cancel());
    assert_eq!(view_url(&overlay), Some("https://x.test"));
    assert!(!overlay.cancel(), "cancel only applies while editing");
}

#[test]
fn test_confirm_replaces_url() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    let state = on_link();
    overlay.on_selection_change(&state, &layout);
    overlay.begin_edit();
    overlay.set_draft(" https://y.test ");

    let next = overlay.confirm(&state, &layout).unwrap();
    assert_eq!(
        next.document.blocks()[0],
        Block::paragraph(vec![Inline::text("see "), link("https://y.test", "here")])
    );
    assert_eq!(view_url(&overlay), Some("https://y.test"));
    assert!(next.version > state.version);
}

#[test]
fn test_confirm_with_empty_draft_keeps_editing() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    let state = on_link();
    overlay.on_selection_change(&state, &layout);
    overlay.begin_edit();
    overlay.set_draft("   ");

    assert!(overlay.confirm(&state, &layout).is_none());
    assert!(matches!(overlay.state(), OverlayState::Edit { .. }));
}

#[test]
fn test_unlink_removes_link_and_hides() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    let state = on_link();
    overlay.on_selection_change(&state, &layout);

    let next = overlay.unlink(&state).unwrap();
    assert_eq!(next.document, paragraphs(&["see here"]));
    assert_eq!(overlay.state(), &OverlayState::Hidden);
}

#[test]
fn test_actions_need_the_right_state() {
    let mut overlay = overlay();
    let state = on_link();
    assert!(!overlay.begin_edit());
    assert!(!overlay.set_draft("x"));
    assert!(overlay.unlink(&state).is_none());
    assert!(overlay.confirm(&state, &MonospaceLayout::default()).is_none());
}

#[test]
fn test_teardown_ignores_later_events() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    overlay.on_selection_change(&on_link(), &layout);
    overlay.teardown();
    assert_eq!(overlay.state(), &OverlayState::Hidden);

    overlay.on_selection_change(&on_link(), &layout);
    assert_eq!(overlay.state(), &OverlayState::Hidden);
}

// ========================================================================
// Placement
// ========================================================================

#[test]
fn test_overlay_flips_above_selection_near_bottom() {
    let geometry = FixedRect(Rect::new(40.0, 100.0, 50.0, 20.0));
    let mut overlay = LinkOverlay::new(
        OverlayConfig::new(100.0, 40.0).with_offset(10.0),
        Size::new(800.0, 150.0),
    );
    overlay.on_selection_change(&on_link(), &geometry);

    let bounds = overlay.bounds().unwrap();
    assert_eq!(bounds.x, 40.0);
    assert_eq!(bounds.y, 100.0 - 40.0 - 10.0);
}

#[test]
fn test_viewport_change_applies_on_next_selection() {
    let layout = MonospaceLayout::default();
    let mut overlay = overlay();
    overlay.on_selection_change(&on_link(), &layout);
    assert_eq!(overlay.bounds().unwrap().y, 30.0);

    overlay.set_viewport(Size::new(1280.0, 50.0));
    overlay.on_selection_change(&on_link(), &layout);
    assert_eq!(overlay.bounds().unwrap().y, 0.0);
}

#[test]
fn test_overlay_clamped_horizontally() {
    let geometry = FixedRect(Rect::new(780.0, 0.0, 10.0, 20.0));
    let mut overlay = LinkOverlay::new(OverlayConfig::new(100.0, 40.0), Size::new(800.0, 600.0));
    overlay.on_selection_change(&on_link(), &geometry);

    assert_eq!(overlay.bounds().unwrap().x, 700.0);
}

#[test]
fn test_monospace_layout_spans_lines_for_multi_block_selection() {
    let layout = MonospaceLayout::default();
    let doc = paragraphs(&["ab", "cd", "ef"]);
    let sel = Selection::new(pt(vec![1], 0, 1), pt(vec![2], 0, 1));
    let rect = layout.selection_bounding_rect(&doc, &sel).unwrap();

    assert_eq!(rect, Rect::new(0.0, 20.0, 1280.0, 40.0));
    assert!(layout
        .selection_bounding_rect(&doc, &caret(vec![9], 0, 0))
        .is_none());
}
