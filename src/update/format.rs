//! Inline format toggling

use super::{block_ranges, ensure_editable, resolve, CommandError};
use crate::model::flat::FlatDoc;
use crate::model::{EditorState, Format, Selection};

/// Toggle `format` over the selected runs.
///
/// If every non-empty run covered by the selection already has the format,
/// it is removed from all of them; otherwise it is added to all of them.
/// Runs are split at the selection boundaries.
pub fn toggle_inline_format(
    state: &EditorState,
    selection: &Selection,
    format: Format,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if range.is_collapsed() {
        return Err(CommandError::NothingSelected);
    }

    let flag = format.flag();
    let mut covered = Vec::new();
    for (block, from, to) in block_ranges(&flat, range.start, range.end) {
        let indices = flat.blocks[block].range_indices(from, to);
        covered.push((block, indices));
    }

    let mut runs = covered
        .iter()
        .flat_map(|(block, indices)| flat.blocks[*block].leaves()[indices.clone()].iter())
        .filter(|leaf| !leaf.text.is_empty())
        .peekable();
    if runs.peek().is_none() {
        return Err(CommandError::NothingSelected);
    }
    let all_formatted = runs.all(|leaf| leaf.formats.contains(flag));

    for (block, indices) in covered {
        for leaf in &mut flat.blocks[block].leaves_mut()[indices] {
            leaf.formats.set(flag, !all_formatted);
        }
    }

    tracing::trace!(?format, remove = all_formatted, "toggled inline format");
    let (document, selection) = flat.finish(range.anchor, range.focus);
    Ok(state.next(document, Some(selection)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Document, EditorMode, FormatSet, Inline, Point};

    #[test]
    fn test_partial_run_is_split() {
        let state = EditorState::new(
            Document::from_paragraphs(&["Hello world"]),
            EditorMode::Editable,
        );
        let sel = Selection::new(Point::new(vec![0], 0, 6), Point::new(vec![0], 0, 11));
        let next = toggle_inline_format(&state, &sel, Format::Bold).unwrap();
        assert_eq!(
            next.document.blocks()[0],
            Block::paragraph(vec![
                Inline::text("Hello "),
                Inline::formatted("world", FormatSet::BOLD),
            ])
        );
        // Selection covers exactly the new bold run
        assert_eq!(
            next.selection,
            Some(Selection::new(Point::new(vec![0], 1, 0), Point::new(vec![0], 1, 5)))
        );
    }

    #[test]
    fn test_collapsed_selection_is_rejected() {
        let state = EditorState::new(Document::from_paragraphs(&["Hello"]), EditorMode::Editable);
        let sel = Selection::caret(Point::new(vec![0], 0, 2));
        assert_eq!(
            toggle_inline_format(&state, &sel, Format::Italic),
            Err(CommandError::NothingSelected)
        );
    }
}
