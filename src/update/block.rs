//! Block type changes and list wrapping

use super::{ensure_editable, resolve, CommandError};
use crate::model::flat::{FlatDoc, FlatKind, ListTag};
use crate::model::{BlockType, EditorState, ListKind, Selection};

/// Switch every block touched by the selection to `block_type`. Inline
/// content is kept as is; list items touched leave their list.
pub fn set_block_type(
    state: &EditorState,
    selection: &Selection,
    block_type: BlockType,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;

    let target = FlatKind::Block(block_type);
    let touched = &mut flat.blocks[range.start.block..=range.end.block];
    if touched.iter().all(|block| block.kind == target) {
        return Err(CommandError::NoChange);
    }
    for block in touched {
        block.kind = target;
    }

    let (document, selection) = flat.finish(range.anchor, range.focus);
    Ok(state.next(document, Some(selection)))
}

/// Wrap the touched blocks into a list of `kind`, or unwrap them when they
/// all already belong to such a list. Unwrapped items get back the block
/// type they were wrapped from, or become paragraphs.
pub fn toggle_list(
    state: &EditorState,
    selection: &Selection,
    kind: ListKind,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;

    let unwrap = flat.blocks[range.start.block..=range.end.block]
        .iter()
        .all(|block| block.kind.list_kind() == Some(kind));

    let outer = ListTag {
        kind,
        group: flat.fresh_group(),
    };
    for block in &mut flat.blocks[range.start.block..=range.end.block] {
        block.kind = match (unwrap, block.kind) {
            (true, FlatKind::Item { origin, .. }) => {
                FlatKind::Block(origin.unwrap_or(BlockType::Paragraph))
            }
            (true, kind @ FlatKind::Block(_)) => kind,
            (false, FlatKind::Item { origin, .. }) => FlatKind::Item {
                outer,
                nested: None,
                origin,
            },
            (false, FlatKind::Block(block_type)) => FlatKind::Item {
                outer,
                nested: None,
                origin: Some(block_type),
            },
        };
    }

    tracing::trace!(?kind, unwrap, "toggled list");
    let (document, selection) = flat.finish(range.anchor, range.focus);
    Ok(state.next(document, Some(selection)))
}
