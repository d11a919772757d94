//! Flat editing view of a document
//!
//! Commands work on a linear sequence of text blocks, each holding a list of
//! leaf runs. Positions become `(block ordinal, char offset)`, which keeps
//! range edits across blocks simple. Lists and links are remembered as tags
//! on blocks/leaves and regrouped when the tree is rebuilt.
//!
//! Blocks whose leaves were never touched keep their original inline nodes,
//! so an edit in one paragraph leaves every other paragraph byte-identical.

use std::cmp::Ordering;

use super::document::{
    Block, BlockPath, BlockType, Document, FormatSet, Inline, Link, List, ListItem, ListKind,
    TextRun,
};
use super::selection::{Point, Selection};

/// A position in the flat view: text block ordinal and char offset in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Pos {
    pub block: usize,
    pub offset: usize,
}

impl Pos {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Identifies the link a leaf belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkTag {
    pub url: String,
    pub group: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Leaf {
    pub text: String,
    pub formats: FormatSet,
    pub link: Option<LinkTag>,
}

impl Leaf {
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Identifies the list a list item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListTag {
    pub kind: ListKind,
    pub group: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlatKind {
    Block(BlockType),
    /// `outer` is the top-level list; `nested` is set for items of a nested list.
    /// `origin` is the block type to restore when the item leaves its list.
    Item {
        outer: ListTag,
        nested: Option<ListTag>,
        origin: Option<BlockType>,
    },
}

impl FlatKind {
    /// Kind of the list that directly owns this item
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            FlatKind::Item { outer, nested, .. } => Some(nested.unwrap_or(*outer).kind),
            FlatKind::Block(_) => None,
        }
    }

    /// Two boundary blocks merge on a range delete only when they are of the same kind
    pub fn mergeable_with(&self, other: &FlatKind) -> bool {
        match (self, other) {
            (FlatKind::Block(a), FlatKind::Block(b)) => a == b,
            (FlatKind::Item { .. }, FlatKind::Item { .. }) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FlatBlock {
    pub kind: FlatKind,
    leaves: Vec<Leaf>,
    original: Option<Vec<Inline>>,
}

impl FlatBlock {
    pub fn new(kind: FlatKind, leaves: Vec<Leaf>) -> Self {
        Self {
            kind,
            leaves,
            original: None,
        }
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Mutable access; the block will be normalized and rebuilt from leaves
    pub fn leaves_mut(&mut self) -> &mut Vec<Leaf> {
        self.original = None;
        &mut self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.iter().map(Leaf::len).sum()
    }

    /// `(start, end)` char offsets of every leaf
    pub fn spans(&self) -> Vec<(usize, usize)> {
        let mut start = 0;
        self.leaves
            .iter()
            .map(|leaf| {
                let end = start + leaf.len();
                let span = (start, end);
                start = end;
                span
            })
            .collect()
    }

    /// Ensure a leaf boundary at `offset`, returning the index of the first
    /// leaf starting there
    pub fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.leaves.len() {
            if offset == start {
                return i;
            }
            let len = self.leaves[i].len();
            if offset < start + len {
                self.original = None;
                let head = &mut self.leaves[i];
                let tail = Leaf {
                    text: split_off_chars(&mut head.text, offset - start),
                    formats: head.formats,
                    link: head.link.clone(),
                };
                self.leaves.insert(i + 1, tail);
                return i + 1;
            }
            start += len;
        }
        self.leaves.len()
    }

    /// Leaf index range covering `[from, to)`, splitting at both ends
    pub fn range_indices(&mut self, from: usize, to: usize) -> std::ops::Range<usize> {
        let start = self.split_at(from);
        let end = self.split_at(to);
        start..end
    }

    /// Remove and return everything from `offset` to the end of the block
    pub fn split_off(&mut self, offset: usize) -> Vec<Leaf> {
        let idx = self.split_at(offset);
        self.leaves_mut().split_off(idx)
    }

    fn is_dirty(&self) -> bool {
        self.original.is_none()
    }

    fn normalize(&mut self) {
        if !self.is_dirty() {
            return;
        }
        let mut merged: Vec<Leaf> = Vec::with_capacity(self.leaves.len());
        for leaf in self.leaves.drain(..) {
            if leaf.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.formats == leaf.formats && prev.link == leaf.link => {
                    prev.text.push_str(&leaf.text)
                }
                _ => merged.push(leaf),
            }
        }
        self.leaves = merged;
    }

    fn inlines(self) -> Vec<Inline> {
        if let Some(original) = self.original {
            return original;
        }
        let mut inlines = Vec::new();
        let mut open_group = None;
        for leaf in self.leaves {
            let run = TextRun {
                text: leaf.text,
                formats: leaf.formats,
            };
            match leaf.link {
                None => {
                    open_group = None;
                    inlines.push(Inline::Text(run));
                }
                Some(tag) => {
                    if open_group == Some(tag.group) {
                        if let Some(Inline::Link(link)) = inlines.last_mut() {
                            link.children.push(run);
                            continue;
                        }
                    }
                    open_group = Some(tag.group);
                    inlines.push(Inline::Link(Link {
                        url: tag.url,
                        children: vec![run],
                    }));
                }
            }
        }
        inlines
    }
}

/// A document flattened into text blocks
#[derive(Debug, Clone)]
pub(crate) struct FlatDoc {
    pub blocks: Vec<FlatBlock>,
    paths: Vec<BlockPath>,
    next_group: usize,
}

impl FlatDoc {
    pub fn new(document: &Document) -> Self {
        let mut flat = Self {
            blocks: Vec::new(),
            paths: document.text_block_paths(),
            next_group: 0,
        };
        for block in document.blocks() {
            match block {
                Block::List(list) => {
                    let outer = flat.list_tag(list.kind);
                    for item in &list.items {
                        flat.push_item(item, outer, None);
                    }
                }
                other => {
                    // Non-list blocks always have a type and inline content
                    if let (Some(kind), Some(inlines)) = (other.block_type(), other.inlines()) {
                        flat.push_text(FlatKind::Block(kind), inlines);
                    }
                }
            }
        }
        flat
    }

    fn list_tag(&mut self, kind: ListKind) -> ListTag {
        ListTag {
            kind,
            group: self.fresh_group(),
        }
    }

    fn push_item(&mut self, item: &ListItem, outer: ListTag, nested: Option<ListTag>) {
        let kind = FlatKind::Item {
            outer,
            nested,
            origin: item.origin,
        };
        self.push_text(kind, &item.children);
        if let Some(list) = &item.nested {
            let inner = self.list_tag(list.kind);
            for child in &list.items {
                self.push_item(child, outer, Some(inner));
            }
        }
    }

    fn push_text(&mut self, kind: FlatKind, inlines: &[Inline]) {
        let mut leaves = Vec::new();
        for inline in inlines {
            match inline {
                Inline::Text(run) => leaves.push(Leaf {
                    text: run.text.clone(),
                    formats: run.formats,
                    link: None,
                }),
                Inline::Link(link) => {
                    let tag = LinkTag {
                        url: link.url.clone(),
                        group: self.fresh_group(),
                    };
                    leaves.extend(link.children.iter().map(|run| Leaf {
                        text: run.text.clone(),
                        formats: run.formats,
                        link: Some(tag.clone()),
                    }));
                }
            }
        }
        self.blocks.push(FlatBlock {
            kind,
            leaves,
            original: Some(inlines.to_vec()),
        });
    }

    /// A group id not used by any list or link in this document
    pub fn fresh_group(&mut self) -> usize {
        let group = self.next_group;
        self.next_group += 1;
        group
    }

    /// Map a point to a flat position; `None` if the point is stale
    pub fn resolve(&self, point: &Point) -> Option<Pos> {
        let block = self.paths.iter().position(|p| *p == point.block_path)?;
        let leaves = &self.blocks.get(block)?.leaves;
        if leaves.is_empty() {
            return (point.inline_index == 0 && point.offset == 0).then(|| Pos::new(block, 0));
        }
        let leaf = leaves.get(point.inline_index)?;
        if point.offset > leaf.len() {
            return None;
        }
        let before: usize = leaves[..point.inline_index].iter().map(Leaf::len).sum();
        Some(Pos::new(block, before + point.offset))
    }

    /// Resolve both ends of a selection, in `(anchor, focus)` order
    pub fn resolve_selection(&self, selection: &Selection) -> Option<(Pos, Pos)> {
        Some((self.resolve(&selection.anchor)?, self.resolve(&selection.focus)?))
    }

    /// Map a flat position back to a point. A position on a boundary between
    /// two runs is reported at the end of the earlier run.
    pub fn point_at(&self, pos: Pos) -> Point {
        self.point_biased(pos, false)
    }

    /// Like [`point_at`](Self::point_at), but a boundary between two runs is
    /// reported at the start of the later run. Used for the start of a range.
    pub fn point_after(&self, pos: Pos) -> Point {
        self.point_biased(pos, true)
    }

    fn point_biased(&self, pos: Pos, forward: bool) -> Point {
        let block = pos.block.min(self.blocks.len().saturating_sub(1));
        let path = self.paths.get(block).cloned().unwrap_or_else(|| vec![0]);
        let Some(flat_block) = self.blocks.get(block) else {
            return Point::new(path, 0, 0);
        };
        let spans = flat_block.spans();
        let offset = pos.offset.min(flat_block.len());
        if forward {
            let inside = spans
                .iter()
                .position(|&(start, end)| start <= offset && offset < end);
            if let Some(i) = inside {
                return Point::new(path, i, offset - spans[i].0);
            }
        }
        for (i, (start, end)) in spans.iter().enumerate() {
            if *start <= offset && offset <= *end {
                return Point::new(path, i, offset - start);
            }
        }
        Point::new(path, 0, 0)
    }

    /// Extent of the link owning the leaf a point addresses
    pub fn link_at(&self, point: &Point) -> Option<(String, Pos, Pos)> {
        let block = self.paths.iter().position(|p| *p == point.block_path)?;
        let flat_block = self.blocks.get(block)?;
        let tag = flat_block.leaves.get(point.inline_index)?.link.as_ref()?;
        let spans = flat_block.spans();
        let mut extent: Option<(usize, usize)> = None;
        for (leaf, (start, end)) in flat_block.leaves.iter().zip(spans) {
            if leaf.link.as_ref().map(|l| l.group) == Some(tag.group) {
                extent = Some(match extent {
                    Some((s, _)) => (s, end),
                    None => (start, end),
                });
            }
        }
        let (start, end) = extent?;
        Some((tag.url.clone(), Pos::new(block, start), Pos::new(block, end)))
    }

    /// Rebuild the tree. Touched blocks are normalized: empty runs dropped and
    /// neighbours with equal formats and link merged.
    pub fn into_document(self) -> Document {
        let mut blocks: Vec<Block> = Vec::new();
        let mut open_list: Option<usize> = None;

        for mut flat_block in self.blocks {
            flat_block.normalize();
            let kind = flat_block.kind;
            let inlines = flat_block.inlines();
            match kind {
                FlatKind::Block(block_type) => {
                    blocks.push(Block::with_type(block_type, inlines));
                    open_list = None;
                }
                FlatKind::Item {
                    outer,
                    nested: None,
                    origin,
                } => {
                    let item = ListItem::unwrapping_to(inlines, origin);
                    push_list_item(&mut blocks, &mut open_list, outer, item);
                }
                FlatKind::Item {
                    outer,
                    nested: Some(inner),
                    origin,
                } => {
                    let item = ListItem::unwrapping_to(inlines, origin);
                    let has_parent = open_list == Some(outer.group)
                        && matches!(
                            blocks.last(),
                            Some(Block::List(list)) if !list.items.is_empty()
                        );
                    if !has_parent {
                        // Parent item is gone: promote to a top-level list
                        push_list_item(&mut blocks, &mut open_list, inner, item);
                        continue;
                    }
                    if let Some(Block::List(list)) = blocks.last_mut() {
                        if let Some(parent) = list.items.last_mut() {
                            parent
                                .nested
                                .get_or_insert_with(|| List {
                                    kind: inner.kind,
                                    items: Vec::new(),
                                })
                                .items
                                .push(item);
                        }
                    }
                }
            }
        }
        Document::new(blocks)
    }

    /// Clamp a position into this document
    pub fn clamp(&self, pos: Pos) -> Pos {
        let block = pos.block.min(self.blocks.len().saturating_sub(1));
        let len = self.blocks.get(block).map(FlatBlock::len).unwrap_or(0);
        Pos::new(block, pos.offset.min(len))
    }

    /// Rebuild the tree and express `anchor`/`focus` as a selection in it.
    /// The start of a non-collapsed range lands on the run that follows it,
    /// so a range over a whole run addresses that run at both ends.
    pub fn finish(self, anchor: Pos, focus: Pos) -> (Document, Selection) {
        let document = self.into_document();
        let fresh = FlatDoc::new(&document);
        let (anchor, focus) = (fresh.clamp(anchor), fresh.clamp(focus));
        let selection = match anchor.cmp(&focus) {
            Ordering::Equal => Selection::caret(fresh.point_at(anchor)),
            Ordering::Less => Selection::new(fresh.point_after(anchor), fresh.point_at(focus)),
            Ordering::Greater => Selection::new(fresh.point_at(anchor), fresh.point_after(focus)),
        };
        (document, selection)
    }
}

fn push_list_item(
    blocks: &mut Vec<Block>,
    open_list: &mut Option<usize>,
    tag: ListTag,
    item: ListItem,
) {
    if *open_list == Some(tag.group) {
        if let Some(Block::List(list)) = blocks.last_mut() {
            list.items.push(item);
            return;
        }
    }
    blocks.push(Block::List(List {
        kind: tag.kind,
        items: vec![item],
    }));
    *open_list = Some(tag.group);
}

/// Split a string at a char index, returning the tail
pub(crate) fn split_off_chars(text: &mut String, at: usize) -> String {
    let byte = text
        .char_indices()
        .nth(at)
        .map(|(b, _)| b)
        .unwrap_or(text.len());
    text.split_off(byte)
}
