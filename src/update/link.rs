//! Link wrapping and unwrapping

use std::collections::HashSet;

use super::{block_ranges, ensure_editable, resolve, CommandError};
use crate::model::flat::{FlatDoc, LinkTag};
use crate::model::{Document, EditorState, Selection};

/// Wrap the selected runs in a link to `url`, or with `None` unwrap every
/// link overlapping the selection, keeping its runs and their formats.
///
/// Wrapping splits runs at the selection boundaries and replaces any link the
/// covered runs were in, so links never nest.
pub fn toggle_link(
    state: &EditorState,
    selection: &Selection,
    url: Option<&str>,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    match url {
        Some(url) => wrap(state, selection, url),
        None => unwrap(state, selection),
    }
}

fn wrap(
    state: &EditorState,
    selection: &Selection,
    url: &str,
) -> Result<EditorState, CommandError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CommandError::EmptyUrl);
    }
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if range.is_collapsed() {
        return Err(CommandError::NothingSelected);
    }

    let tag = LinkTag {
        url: url.to_string(),
        group: flat.fresh_group(),
    };
    let mut wrapped = 0;
    for (block, from, to) in block_ranges(&flat, range.start, range.end) {
        let indices = flat.blocks[block].range_indices(from, to);
        for leaf in &mut flat.blocks[block].leaves_mut()[indices] {
            if !leaf.text.is_empty() {
                wrapped += 1;
            }
            leaf.link = Some(tag.clone());
        }
    }
    if wrapped == 0 {
        return Err(CommandError::NothingSelected);
    }

    tracing::trace!(url, "wrapped selection in link");
    let (document, selection) = flat.finish(range.anchor, range.focus);
    Ok(state.next(document, Some(selection)))
}

fn unwrap(state: &EditorState, selection: &Selection) -> Result<EditorState, CommandError> {
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;

    let mut groups = HashSet::new();
    for (block, from, to) in block_ranges(&flat, range.start, range.end) {
        let flat_block = &flat.blocks[block];
        for (leaf, (start, end)) in flat_block.leaves().iter().zip(flat_block.spans()) {
            let overlaps = if range.is_collapsed() {
                start <= from && from <= end
            } else {
                start < to && end > from
            };
            if let (true, Some(tag)) = (overlaps, &leaf.link) {
                groups.insert(tag.group);
            }
        }
    }
    if groups.is_empty() {
        return Err(CommandError::NoChange);
    }

    for block in &mut flat.blocks[range.start.block..=range.end.block] {
        let unlink = block
            .leaves()
            .iter()
            .any(|leaf| leaf.link.as_ref().is_some_and(|tag| groups.contains(&tag.group)));
        if !unlink {
            continue;
        }
        for leaf in block.leaves_mut() {
            if leaf.link.as_ref().is_some_and(|tag| groups.contains(&tag.group)) {
                leaf.link = None;
            }
        }
    }

    tracing::trace!(count = groups.len(), "unwrapped links");
    let (document, selection) = flat.finish(range.anchor, range.focus);
    Ok(state.next(document, Some(selection)))
}

/// URL of the link at the selection anchor, if the anchor is inside one
pub fn link_at_selection(document: &Document, selection: &Selection) -> Option<String> {
    FlatDoc::new(document)
        .link_at(&selection.anchor)
        .map(|(url, _, _)| url)
}

/// Selection spanning the whole link at the selection anchor
pub fn link_range_at(document: &Document, selection: &Selection) -> Option<(String, Selection)> {
    let flat = FlatDoc::new(document);
    let (url, start, end) = flat.link_at(&selection.anchor)?;
    Some((url, Selection::new(flat.point_after(start), flat.point_at(end))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, EditorMode, FormatSet, Inline, Point, TextRun};

    #[test]
    fn test_wrap_merges_equal_runs_into_one_child() {
        let doc = Document::new(vec![Block::paragraph(vec![
            Inline::text("Hello "),
            Inline::text("world"),
        ])]);
        let state = EditorState::new(doc, EditorMode::Editable);
        let sel = Selection::new(Point::new(vec![0], 0, 0), Point::new(vec![0], 1, 5));
        let next = toggle_link(&state, &sel, Some("https://x.test")).unwrap();
        assert_eq!(
            next.document.blocks()[0],
            Block::paragraph(vec![Inline::link(
                "https://x.test",
                vec![TextRun::plain("Hello world")]
            )])
        );
    }

    #[test]
    fn test_wrap_replaces_existing_link() {
        let doc = Document::new(vec![Block::paragraph(vec![Inline::link(
            "https://old.test",
            vec![TextRun::formatted("abc", FormatSet::ITALIC)],
        )])]);
        let state = EditorState::new(doc, EditorMode::Editable);
        let sel = Selection::new(Point::new(vec![0], 0, 1), Point::new(vec![0], 0, 2));
        let next = toggle_link(&state, &sel, Some("https://new.test")).unwrap();
        assert_eq!(
            next.document.blocks()[0],
            Block::paragraph(vec![
                Inline::link("https://old.test", vec![TextRun::formatted("a", FormatSet::ITALIC)]),
                Inline::link("https://new.test", vec![TextRun::formatted("b", FormatSet::ITALIC)]),
                Inline::link("https://old.test", vec![TextRun::formatted("c", FormatSet::ITALIC)]),
            ])
        );
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let state = EditorState::new(Document::from_paragraphs(&["abc"]), EditorMode::Editable);
        let sel = Selection::new(Point::new(vec![0], 0, 0), Point::new(vec![0], 0, 3));
        assert_eq!(toggle_link(&state, &sel, Some("  ")), Err(CommandError::EmptyUrl));
    }

    #[test]
    fn test_unlink_with_caret_inside_link() {
        let doc = Document::new(vec![Block::paragraph(vec![
            Inline::text("see "),
            Inline::link("https://x.test", vec![TextRun::plain("here")]),
        ])]);
        let state = EditorState::new(doc, EditorMode::Editable);
        let sel = Selection::caret(Point::new(vec![0], 1, 2));
        let next = toggle_link(&state, &sel, None).unwrap();
        assert_eq!(next.document, Document::from_paragraphs(&["see here"]));
    }

    #[test]
    fn test_link_range_starts_inside_the_link() {
        let doc = Document::new(vec![Block::paragraph(vec![
            Inline::text("see "),
            Inline::link("https://x.test", vec![TextRun::plain("here")]),
        ])]);
        let sel = Selection::caret(Point::new(vec![0], 1, 2));
        let (url, range) = link_range_at(&doc, &sel).unwrap();
        assert_eq!(url, "https://x.test");
        assert_eq!(
            range,
            Selection::new(Point::new(vec![0], 1, 0), Point::new(vec![0], 1, 4))
        );
        assert_eq!(link_at_selection(&doc, &range).as_deref(), Some("https://x.test"));
    }

    #[test]
    fn test_unlink_without_links_is_no_change() {
        let state = EditorState::new(Document::from_paragraphs(&["abc"]), EditorMode::Editable);
        let sel = Selection::new(Point::new(vec![0], 0, 0), Point::new(vec![0], 0, 3));
        assert_eq!(toggle_link(&state, &sel, None), Err(CommandError::NoChange));
    }
}
