//! Command tests - inline formats, block types, lists and links

mod common;

use caderno::commands::{EditorCommand, PLACEHOLDER_URL};
use caderno::messages::Msg;
use caderno::model::{
    Block, BlockType, Document, FormatSet, HeadingLevel, Inline, List, ListItem, ListKind,
    Selection, TextRun,
};
use caderno::overlay::{LinkOverlay, MonospaceLayout, OverlayConfig, OverlayState, Size};
use caderno::toolbar::toolbar_for;
use caderno::update::{dispatch, link_at_selection, toggle_link, CommandError};
use common::{apply, bold, caret, editable, link, list, paragraphs, pt, range_in, reject};

// ========================================================================
// Inline formats
// ========================================================================

#[test]
fn test_toggle_format_twice_restores_formats() {
    let state = editable(paragraphs(&["Hello world"]), range_in(0, 0, 5));
    let once = apply(&state, Msg::Command(EditorCommand::Bold));
    assert_eq!(
        once.document.blocks()[0],
        Block::paragraph(vec![bold("Hello"), Inline::text(" world")])
    );

    let twice = apply(&once, Msg::Command(EditorCommand::Bold));
    assert_eq!(twice.document, state.document);
}

#[test]
fn test_mixed_selection_gains_format_everywhere() {
    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::text("Hello "),
        bold("world"),
    ])]);
    let state = editable(doc, Selection::new(pt(vec![0], 0, 0), pt(vec![0], 1, 5)));
    let next = apply(&state, Msg::Command(EditorCommand::Bold));

    assert_eq!(
        next.document.blocks()[0],
        Block::paragraph(vec![bold("Hello world")])
    );
}

#[test]
fn test_formats_combine() {
    let state = editable(paragraphs(&["abc"]), range_in(0, 0, 3));
    let italic = apply(&state, Msg::Command(EditorCommand::Italic));
    let both = apply(&italic, Msg::Command(EditorCommand::Underline));

    assert_eq!(
        both.document.blocks()[0],
        Block::paragraph(vec![Inline::formatted(
            "abc",
            FormatSet::ITALIC | FormatSet::UNDERLINE
        )])
    );
}

#[test]
fn test_format_across_blocks() {
    let state = editable(
        paragraphs(&["abcd", "efgh"]),
        Selection::new(pt(vec![0], 0, 2), pt(vec![1], 0, 2)),
    );
    let next = apply(&state, Msg::Command(EditorCommand::Strikethrough));

    let strike = |text: &str| Inline::formatted(text, FormatSet::STRIKETHROUGH);
    assert_eq!(
        next.document.blocks(),
        &[
            Block::paragraph(vec![Inline::text("ab"), strike("cd")]),
            Block::paragraph(vec![strike("ef"), Inline::text("gh")]),
        ]
    );
}

#[test]
fn test_format_inside_link_keeps_link() {
    let doc = Document::new(vec![Block::paragraph(vec![link("https://x.test", "abc")])]);
    let state = editable(doc, Selection::new(pt(vec![0], 0, 1), pt(vec![0], 0, 2)));
    let next = apply(&state, Msg::Command(EditorCommand::Code));

    assert_eq!(
        next.document.blocks()[0],
        Block::paragraph(vec![Inline::link(
            "https://x.test",
            vec![
                TextRun::plain("a"),
                TextRun::formatted("b", FormatSet::CODE),
                TextRun::plain("c"),
            ]
        )])
    );
}

#[test]
fn test_format_with_caret_is_rejected() {
    let state = editable(paragraphs(&["abc"]), caret(vec![0], 0, 1));
    reject(&state, Msg::Command(EditorCommand::Bold));
}

// ========================================================================
// Block types
// ========================================================================

#[test]
fn test_heading_commands() {
    let state = editable(paragraphs(&["Title"]), caret(vec![0], 0, 0));
    let h1 = apply(&state, Msg::Command(EditorCommand::Heading1));
    assert_eq!(
        h1.document.blocks()[0],
        Block::heading(HeadingLevel::H1, vec![Inline::text("Title")])
    );

    let h2 = apply(&h1, Msg::Command(EditorCommand::Heading2));
    assert_eq!(
        h2.document.blocks()[0],
        Block::heading(HeadingLevel::H2, vec![Inline::text("Title")])
    );

    let back = apply(&h2, Msg::Command(EditorCommand::Paragraph));
    assert_eq!(back.document, state.document);
}

#[test]
fn test_set_block_type_covers_every_touched_block() {
    let state = editable(
        paragraphs(&["a", "b", "c"]),
        Selection::new(pt(vec![0], 0, 0), pt(vec![1], 0, 1)),
    );
    let next = apply(&state, Msg::SetBlockType(BlockType::Quote));

    assert_eq!(
        next.document.blocks(),
        &[
            Block::Quote(vec![Inline::text("a")]),
            Block::Quote(vec![Inline::text("b")]),
            Block::paragraph(vec![Inline::text("c")]),
        ]
    );
}

#[test]
fn test_set_block_type_on_list_item_splits_list() {
    let doc = Document::new(vec![list(ListKind::Unordered, &["a", "b", "c"])]);
    let state = editable(doc, caret(vec![0, 1], 0, 0));
    let next = apply(&state, Msg::SetBlockType(BlockType::Paragraph));

    assert_eq!(
        next.document.blocks(),
        &[
            list(ListKind::Unordered, &["a"]),
            Block::paragraph(vec![Inline::text("b")]),
            list(ListKind::Unordered, &["c"]),
        ]
    );
    assert_eq!(next.selection, Some(caret(vec![1], 0, 0)));
}

// ========================================================================
// Lists
// ========================================================================

#[test]
fn test_list_commands_wrap_and_unwrap() {
    let state = editable(
        paragraphs(&["one", "two"]),
        Selection::new(pt(vec![0], 0, 0), pt(vec![1], 0, 3)),
    );
    let wrapped = apply(&state, Msg::Command(EditorCommand::ListUnordered));
    assert_eq!(
        wrapped.document.blocks(),
        &[list(ListKind::Unordered, &["one", "two"])]
    );

    let unwrapped = apply(&wrapped, Msg::Command(EditorCommand::ListUnordered));
    assert_eq!(unwrapped.document, state.document);
}

#[test]
fn test_unwrapping_nested_item_keeps_parent_list() {
    let doc = Document::new(vec![Block::List(List {
        kind: ListKind::Unordered,
        items: vec![ListItem::with_nested(
            vec![Inline::text("one")],
            List {
                kind: ListKind::Ordered,
                items: vec![ListItem::new(vec![Inline::text("one.a")])],
            },
        )],
    })]);
    let state = editable(doc, caret(vec![0, 0, 0], 0, 0));
    let next = apply(&state, Msg::ToggleList(ListKind::Ordered));

    assert_eq!(
        next.document.blocks(),
        &[
            list(ListKind::Unordered, &["one"]),
            Block::paragraph(vec![Inline::text("one.a")]),
        ]
    );
}

#[test]
fn test_unwrapping_list_restores_heading() {
    let title = Block::heading(HeadingLevel::H1, vec![Inline::text("Titulo")]);
    let state = editable(Document::new(vec![title.clone()]), caret(vec![0], 0, 2));
    let listed = apply(&state, Msg::Command(EditorCommand::ListOrdered));
    assert_eq!(listed.document.blocks(), &[list(ListKind::Ordered, &["Titulo"])]);

    let unlisted = apply(&listed, Msg::Command(EditorCommand::ListOrdered));
    assert_eq!(unlisted.document.blocks(), &[title]);
}

#[test]
fn test_loaded_list_unwraps_to_paragraph() {
    let state = editable(
        Document::new(vec![list(ListKind::Unordered, &["item"])]),
        caret(vec![0, 0], 0, 0),
    );
    let next = apply(&state, Msg::Command(EditorCommand::ListUnordered));
    assert_eq!(next.document, paragraphs(&["item"]));
}

#[test]
fn test_list_then_heading_leaves_list() {
    let state = editable(paragraphs(&["item"]), caret(vec![0], 0, 0));
    let listed = apply(&state, Msg::Command(EditorCommand::ListOrdered));
    let sel = listed.selection.clone().unwrap();
    assert_eq!(sel, caret(vec![0, 0], 0, 0));

    let heading = apply(&listed, Msg::Command(EditorCommand::Heading1));
    assert_eq!(
        heading.document.blocks(),
        &[Block::heading(HeadingLevel::H1, vec![Inline::text("item")])]
    );
}

// ========================================================================
// Links
// ========================================================================

#[test]
fn test_link_wrap_and_unwrap_hello_world() {
    let state = editable(paragraphs(&["Hello world"]), range_in(0, 0, 11));
    let linked = apply(&state, Msg::ToggleLink(Some("https://x.test".into())));

    assert_eq!(
        linked.document.blocks()[0],
        Block::paragraph(vec![Inline::link(
            "https://x.test",
            vec![TextRun::plain("Hello world")]
        )])
    );

    let unlinked = apply(&linked, Msg::ToggleLink(None));
    assert_eq!(unlinked.document, state.document);
}

#[test]
fn test_unlink_keeps_run_formats() {
    let doc = Document::new(vec![Block::paragraph(vec![
        bold("Hello"),
        Inline::formatted(" world", FormatSet::ITALIC),
    ])]);
    let state = editable(doc.clone(), Selection::new(pt(vec![0], 0, 0), pt(vec![0], 1, 6)));
    let linked = apply(&state, Msg::ToggleLink(Some("https://x.test".into())));
    assert_eq!(
        linked.document.blocks()[0],
        Block::paragraph(vec![Inline::link(
            "https://x.test",
            vec![
                TextRun::formatted("Hello", FormatSet::BOLD),
                TextRun::formatted(" world", FormatSet::ITALIC),
            ]
        )])
    );

    let unlinked = apply(&linked, Msg::ToggleLink(None));
    assert_eq!(unlinked.document, doc);
}

#[test]
fn test_unlink_partial_range_removes_whole_link() {
    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::text("see "),
        link("https://x.test", "here"),
    ])]);
    let state = editable(doc, Selection::new(pt(vec![0], 0, 2), pt(vec![0], 1, 1)));
    let next = apply(&state, Msg::ToggleLink(None));

    assert_eq!(next.document, paragraphs(&["see here"]));
}

#[test]
fn test_link_across_blocks_makes_one_link_per_block() {
    let state = editable(
        paragraphs(&["abcd", "efgh"]),
        Selection::new(pt(vec![0], 0, 2), pt(vec![1], 0, 2)),
    );
    let next = apply(&state, Msg::ToggleLink(Some("https://x.test".into())));

    assert_eq!(
        next.document.blocks(),
        &[
            Block::paragraph(vec![Inline::text("ab"), link("https://x.test", "cd")]),
            Block::paragraph(vec![link("https://x.test", "ef"), Inline::text("gh")]),
        ]
    );
}

#[test]
fn test_link_url_is_trimmed() {
    let state = editable(paragraphs(&["abc"]), range_in(0, 0, 3));
    let sel = state.selection.as_ref().unwrap();
    let next = toggle_link(&state, sel, Some("  https://x.test ")).unwrap();
    let sel = next.selection.clone().unwrap();

    assert_eq!(
        link_at_selection(&next.document, &sel).as_deref(),
        Some("https://x.test")
    );
}

#[test]
fn test_new_link_mid_paragraph_is_seen_by_toolbar_and_overlay() {
    let state = editable(paragraphs(&["Hello world"]), range_in(0, 6, 11));
    let next = apply(&state, Msg::ToggleLink(Some("https://x.test".into())));

    assert_eq!(
        next.document.blocks()[0],
        Block::paragraph(vec![Inline::text("Hello "), link("https://x.test", "world")])
    );
    // The range starts on the link run, not at the end of "Hello "
    assert_eq!(
        next.selection,
        Some(Selection::new(pt(vec![0], 1, 0), pt(vec![0], 1, 5)))
    );
    assert_eq!(toolbar_for(&next).link_url.as_deref(), Some("https://x.test"));

    let mut overlay = LinkOverlay::new(OverlayConfig::default(), Size::new(1280.0, 800.0));
    overlay.on_selection_change(&next, &MonospaceLayout::default());
    assert_eq!(
        overlay.state(),
        &OverlayState::View {
            url: "https://x.test".into()
        }
    );
}

#[test]
fn test_relinking_part_of_a_link_keeps_selection_on_new_link() {
    let doc = Document::new(vec![Block::paragraph(vec![
        Inline::text("see "),
        link("https://old.test", "here"),
    ])]);
    let state = editable(doc, Selection::new(pt(vec![0], 1, 2), pt(vec![0], 1, 4)));
    let next = apply(&state, Msg::ToggleLink(Some("https://new.test".into())));

    assert_eq!(
        next.document.blocks()[0],
        Block::paragraph(vec![
            Inline::text("see "),
            link("https://old.test", "he"),
            link("https://new.test", "re"),
        ])
    );
    let sel = next.selection.clone().unwrap();
    assert_eq!(
        link_at_selection(&next.document, &sel).as_deref(),
        Some("https://new.test")
    );
}

#[test]
fn test_link_with_caret_is_nothing_selected() {
    let state = editable(paragraphs(&["abc"]), caret(vec![0], 0, 1));
    assert_eq!(
        toggle_link(&state, state.selection.as_ref().unwrap(), Some("https://x.test")),
        Err(CommandError::NothingSelected)
    );
    reject(&state, Msg::Command(EditorCommand::LinkToggle));
}

#[test]
fn test_link_toggle_command_uses_placeholder() {
    let state = editable(paragraphs(&["abc"]), range_in(0, 0, 3));
    let next = dispatch(&state, Msg::Command(EditorCommand::LinkToggle));

    assert!(next.applied);
    assert_eq!(
        next.state.document.blocks()[0],
        Block::paragraph(vec![link(PLACEHOLDER_URL, "abc")])
    );
}
