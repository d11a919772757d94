//! Text editing: insert, delete, split and join blocks

use super::{ensure_editable, resolve, CommandError};
use crate::model::flat::{FlatBlock, FlatDoc, FlatKind, Leaf, Pos};
use crate::model::{BlockType, EditorState, FormatSet, Selection};

/// Insert text over the selection. A range is deleted first; the new text
/// takes the formats found at the start of the selection and the caret ends
/// up after it.
pub fn insert_text(
    state: &EditorState,
    selection: &Selection,
    text: &str,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if text.is_empty() && range.is_collapsed() {
        return Err(CommandError::NoChange);
    }

    let formats = inherited_formats(
        &flat.blocks[range.start.block],
        range.start.offset,
        !range.is_collapsed(),
    );
    let at = delete_between(&mut flat, range.start, range.end);

    let block = &mut flat.blocks[at.block];
    let idx = block.split_at(at.offset);
    let link = {
        let leaves = block.leaves();
        match (idx.checked_sub(1).and_then(|i| leaves.get(i)), leaves.get(idx)) {
            (Some(before), Some(after)) if before.link.is_some() && before.link == after.link => {
                before.link.clone()
            }
            _ => None,
        }
    };
    block.leaves_mut().insert(
        idx,
        Leaf {
            text: text.to_string(),
            formats,
            link,
        },
    );

    let caret = Pos::new(at.block, at.offset + text.chars().count());
    let (document, selection) = flat.finish(caret, caret);
    Ok(state.next(document, Some(selection)))
}

/// Remove everything between the selection ends
pub fn delete_range(
    state: &EditorState,
    selection: &Selection,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if range.is_collapsed() {
        return Err(CommandError::NoChange);
    }
    let caret = delete_between(&mut flat, range.start, range.end);
    let (document, selection) = flat.finish(caret, caret);
    Ok(state.next(document, Some(selection)))
}

/// Backspace: delete the range, the char before the caret, or join with the
/// previous block
pub fn delete_backward(
    state: &EditorState,
    selection: &Selection,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if !range.is_collapsed() {
        return delete_range(state, selection);
    }

    let caret = range.start;
    let at = if caret.offset > 0 {
        delete_between(&mut flat, Pos::new(caret.block, caret.offset - 1), caret)
    } else if caret.block > 0 {
        join_with_next(&mut flat, caret.block - 1)
    } else {
        return Err(CommandError::NoChange);
    };
    let (document, selection) = flat.finish(at, at);
    Ok(state.next(document, Some(selection)))
}

/// Delete key: delete the range, the char after the caret, or pull the next
/// block into this one
pub fn delete_forward(
    state: &EditorState,
    selection: &Selection,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    if !range.is_collapsed() {
        return delete_range(state, selection);
    }

    let caret = range.start;
    let len = flat.blocks[caret.block].len();
    let at = if caret.offset < len {
        delete_between(&mut flat, caret, Pos::new(caret.block, caret.offset + 1))
    } else if caret.block + 1 < flat.blocks.len() {
        join_with_next(&mut flat, caret.block)
    } else {
        return Err(CommandError::NoChange);
    };
    let (document, selection) = flat.finish(at, at);
    Ok(state.next(document, Some(selection)))
}

/// Enter: split the block at the caret. Headings continue as a paragraph,
/// list items as a new item of the same list. Enter in an empty list item
/// leaves the list instead.
pub fn insert_paragraph(
    state: &EditorState,
    selection: &Selection,
) -> Result<EditorState, CommandError> {
    ensure_editable(state)?;
    let mut flat = FlatDoc::new(&state.document);
    let range = resolve(&flat, selection)?;
    let at = delete_between(&mut flat, range.start, range.end);

    let block = &mut flat.blocks[at.block];
    if range.is_collapsed() && block.len() == 0 && matches!(block.kind, FlatKind::Item { .. }) {
        block.kind = FlatKind::Block(BlockType::Paragraph);
        let (document, selection) = flat.finish(at, at);
        return Ok(state.next(document, Some(selection)));
    }

    let tail = block.split_off(at.offset);
    let kind = match block.kind {
        FlatKind::Block(BlockType::Heading(_)) => FlatKind::Block(BlockType::Paragraph),
        other => other,
    };
    flat.blocks.insert(at.block + 1, FlatBlock::new(kind, tail));

    let caret = Pos::new(at.block + 1, 0);
    let (document, selection) = flat.finish(caret, caret);
    Ok(state.next(document, Some(selection)))
}

/// Delete `[start, end)`. Boundary blocks of the same kind merge into the
/// first; otherwise both are kept, trimmed. Returns the caret position.
pub(crate) fn delete_between(flat: &mut FlatDoc, start: Pos, end: Pos) -> Pos {
    if start >= end {
        return start;
    }
    if start.block == end.block {
        let block = &mut flat.blocks[start.block];
        let range = block.range_indices(start.offset, end.offset);
        block.leaves_mut().drain(range);
        return start;
    }

    let tail = flat.blocks[end.block].split_off(end.offset);
    flat.blocks[start.block].split_off(start.offset);
    let end_kind = flat.blocks[end.block].kind;

    if flat.blocks[start.block].kind.mergeable_with(&end_kind) {
        flat.blocks[start.block].leaves_mut().extend(tail);
        flat.blocks.drain(start.block + 1..=end.block);
    } else {
        *flat.blocks[end.block].leaves_mut() = tail;
        flat.blocks.drain(start.block + 1..end.block);
    }
    start
}

/// Append block `index + 1` to block `index`, returning the join point
fn join_with_next(flat: &mut FlatDoc, index: usize) -> Pos {
    let at = Pos::new(index, flat.blocks[index].len());
    let next = flat.blocks.remove(index + 1);
    let leaves = next.leaves().to_vec();
    flat.blocks[index].leaves_mut().extend(leaves);
    at
}

/// Formats new text picks up: the run before a caret, or the first covered
/// run of a range. Falls back to the neighbouring run, then to no formats.
fn inherited_formats(block: &FlatBlock, offset: usize, is_range: bool) -> FormatSet {
    let spans = block.spans();
    let candidates = block
        .leaves()
        .iter()
        .zip(spans)
        .filter(|(leaf, _)| !leaf.text.is_empty());

    let mut before = None;
    let mut after = None;
    for (leaf, (start, end)) in candidates {
        if before.is_none() && start < offset && offset <= end {
            before = Some(leaf.formats);
        }
        if after.is_none() && start <= offset && offset < end {
            after = Some(leaf.formats);
        }
    }
    let preferred = if is_range { after.or(before) } else { before.or(after) };
    preferred.unwrap_or_default()
}
