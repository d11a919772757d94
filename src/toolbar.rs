//! Toolbar state derived from the document and selection
//!
//! Pure projections: nothing here changes the editor state. A surface
//! recomputes the toolbar after every dispatch.

use crate::commands::EditorCommand;
use crate::model::flat::{FlatDoc, FlatKind};
use crate::model::{
    BlockType, Document, EditorState, Format, FormatSet, HeadingLevel, ListKind, Selection,
};
use crate::update::link_at_selection;

/// Kind of the text block the selection anchor is in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveBlockType {
    #[default]
    Paragraph,
    Heading(HeadingLevel),
    Quote,
    Code,
    /// A list item, with the kind of the list that owns it
    List(ListKind),
}

impl From<BlockType> for ActiveBlockType {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Paragraph => ActiveBlockType::Paragraph,
            BlockType::Heading(level) => ActiveBlockType::Heading(level),
            BlockType::Quote => ActiveBlockType::Quote,
            BlockType::Code => ActiveBlockType::Code,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolbarState {
    pub active_formats: FormatSet,
    pub active_block_type: ActiveBlockType,
    /// URL of the link at the selection anchor
    pub link_url: Option<String>,
    pub can_edit: bool,
}

impl ToolbarState {
    pub fn is_format_active(&self, format: Format) -> bool {
        self.active_formats.contains(format.flag())
    }

    /// Whether a toolbar button should render as pressed
    pub fn is_active(&self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Bold => self.is_format_active(Format::Bold),
            EditorCommand::Italic => self.is_format_active(Format::Italic),
            EditorCommand::Underline => self.is_format_active(Format::Underline),
            EditorCommand::Strikethrough => self.is_format_active(Format::Strikethrough),
            EditorCommand::Code => self.is_format_active(Format::Code),
            EditorCommand::Paragraph => self.active_block_type == ActiveBlockType::Paragraph,
            EditorCommand::Heading1 => {
                self.active_block_type == ActiveBlockType::Heading(HeadingLevel::H1)
            }
            EditorCommand::Heading2 => {
                self.active_block_type == ActiveBlockType::Heading(HeadingLevel::H2)
            }
            EditorCommand::ListOrdered => {
                self.active_block_type == ActiveBlockType::List(ListKind::Ordered)
            }
            EditorCommand::ListUnordered => {
                self.active_block_type == ActiveBlockType::List(ListKind::Unordered)
            }
            EditorCommand::LinkToggle => self.link_url.is_some(),
        }
    }
}

/// Derive formats, block type and link for a selection.
///
/// For a range, a format is active only when every non-empty run the range
/// covers carries it. For a caret, the run just before the caret decides,
/// falling back to the run the caret sits in. No selection, or one that does
/// not resolve, yields the defaults.
pub fn derive_toolbar_state(document: &Document, selection: Option<&Selection>) -> ToolbarState {
    let Some(selection) = selection else {
        return ToolbarState::default();
    };
    let flat = FlatDoc::new(document);
    let Some((anchor, focus)) = flat.resolve_selection(selection) else {
        return ToolbarState::default();
    };
    let (start, end) = (anchor.min(focus), anchor.max(focus));

    let active_formats = if start == end {
        caret_formats(&flat, start.block, start.offset)
    } else {
        let mut common: Option<FormatSet> = None;
        for block in start.block..=end.block {
            let flat_block = &flat.blocks[block];
            let from = if block == start.block { start.offset } else { 0 };
            let to = if block == end.block {
                end.offset
            } else {
                flat_block.len()
            };
            for (leaf, (s, e)) in flat_block.leaves().iter().zip(flat_block.spans()) {
                if s < to && e > from && !leaf.text.is_empty() {
                    common = Some(common.map_or(leaf.formats, |c| c & leaf.formats));
                }
            }
        }
        common.unwrap_or_default()
    };

    let active_block_type = match flat.blocks[anchor.block].kind {
        FlatKind::Block(block_type) => block_type.into(),
        kind @ FlatKind::Item { .. } => kind
            .list_kind()
            .map(ActiveBlockType::List)
            .unwrap_or_default(),
    };

    ToolbarState {
        active_formats,
        active_block_type,
        link_url: link_at_selection(document, selection),
        can_edit: true,
    }
}

fn caret_formats(flat: &FlatDoc, block: usize, offset: usize) -> FormatSet {
    let flat_block = &flat.blocks[block];
    let leaves = flat_block.leaves();
    let spans = flat_block.spans();

    let before = spans
        .iter()
        .position(|&(s, e)| s < offset && offset <= e);
    let within = || spans.iter().position(|&(s, e)| s <= offset && offset < e);
    before
        .or_else(within)
        .map(|i| leaves[i].formats)
        .unwrap_or_default()
}

/// Toolbar for an editor snapshot; read-only surfaces cannot edit
pub fn toolbar_for(state: &EditorState) -> ToolbarState {
    ToolbarState {
        can_edit: !state.is_read_only(),
        ..derive_toolbar_state(&state.document, state.selection.as_ref())
    }
}
