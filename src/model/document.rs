//! Document model - the structured rich-text tree
//!
//! A [`Document`] is an immutable value: commands build a new tree instead of
//! mutating the old one. Structural equality (`PartialEq`) is node-by-node
//! equality of type, formats/url and text.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Inline text formats.
    ///
    /// Bit values match the persisted `format` bitset.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatSet: u32 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const UNDERLINE = 1 << 3;
        const CODE = 1 << 4;
    }
}

/// A single inline format, as toggled from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Bold,
        Format::Italic,
        Format::Underline,
        Format::Strikethrough,
        Format::Code,
    ];

    /// The bit this format occupies in a [`FormatSet`]
    pub fn flag(self) -> FormatSet {
        match self {
            Format::Bold => FormatSet::BOLD,
            Format::Italic => FormatSet::ITALIC,
            Format::Underline => FormatSet::UNDERLINE,
            Format::Strikethrough => FormatSet::STRIKETHROUGH,
            Format::Code => FormatSet::CODE,
        }
    }

    /// Lowercase name used in the string-set form of the persisted schema
    pub fn name(self) -> &'static str {
        match self {
            Format::Bold => "bold",
            Format::Italic => "italic",
            Format::Underline => "underline",
            Format::Strikethrough => "strikethrough",
            Format::Code => "code",
        }
    }

    pub fn from_name(name: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// A run of text sharing one set of formats
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub formats: FormatSet,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formats: FormatSet::empty(),
        }
    }

    pub fn formatted(text: impl Into<String>, formats: FormatSet) -> Self {
        Self {
            text: text.into(),
            formats,
        }
    }

    /// Length in chars (all offsets in the model count chars, not bytes)
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A hyperlink wrapping text runs. Links never nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub children: Vec<TextRun>,
}

/// Content of a text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    Link(Link),
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(text))
    }

    pub fn formatted(text: impl Into<String>, formats: FormatSet) -> Self {
        Inline::Text(TextRun::formatted(text, formats))
    }

    pub fn link(url: impl Into<String>, children: Vec<TextRun>) -> Self {
        Inline::Link(Link {
            url: url.into(),
            children,
        })
    }

    /// Leaf runs of this inline, links expanded into their children
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Inline::Text(run) => std::slice::from_ref(run),
            Inline::Link(link) => &link.children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
}

impl HeadingLevel {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn name(self) -> &'static str {
        match self {
            ListKind::Ordered => "ordered",
            ListKind::Unordered => "unordered",
        }
    }
}

/// Kinds a non-list block can be switched between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading(HeadingLevel),
    Quote,
    Code,
}

/// A list block. Holds only list items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// A list item: inline content plus at most one nested list
#[derive(Debug, Clone, Default)]
pub struct ListItem {
    pub children: Vec<Inline>,
    pub nested: Option<List>,
    /// Block type the item came from when a block was wrapped into a list.
    /// Session-only: not serialized and ignored by equality.
    pub(crate) origin: Option<BlockType>,
}

impl ListItem {
    pub fn new(children: Vec<Inline>) -> Self {
        Self {
            children,
            nested: None,
            origin: None,
        }
    }

    pub fn with_nested(children: Vec<Inline>, nested: List) -> Self {
        Self {
            nested: Some(nested),
            ..Self::new(children)
        }
    }

    pub(crate) fn unwrapping_to(children: Vec<Inline>, origin: Option<BlockType>) -> Self {
        Self {
            origin,
            ..Self::new(children)
        }
    }
}

impl PartialEq for ListItem {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children && self.nested == other.nested
    }
}

impl Eq for ListItem {}

/// Top-level structural unit of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading {
        level: HeadingLevel,
        children: Vec<Inline>,
    },
    Quote(Vec<Inline>),
    Code(Vec<Inline>),
    List(List),
}

impl Block {
    pub fn paragraph(children: Vec<Inline>) -> Self {
        Block::Paragraph(children)
    }

    pub fn heading(level: HeadingLevel, children: Vec<Inline>) -> Self {
        Block::Heading { level, children }
    }

    pub fn with_type(block_type: BlockType, children: Vec<Inline>) -> Self {
        match block_type {
            BlockType::Paragraph => Block::Paragraph(children),
            BlockType::Heading(level) => Block::Heading { level, children },
            BlockType::Quote => Block::Quote(children),
            BlockType::Code => Block::Code(children),
        }
    }

    /// Block type of a non-list block
    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            Block::Paragraph(_) => Some(BlockType::Paragraph),
            Block::Heading { level, .. } => Some(BlockType::Heading(*level)),
            Block::Quote(_) => Some(BlockType::Quote),
            Block::Code(_) => Some(BlockType::Code),
            Block::List(_) => None,
        }
    }

    /// Inline content of a non-list block
    pub fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Block::Paragraph(children)
            | Block::Heading { children, .. }
            | Block::Quote(children)
            | Block::Code(children) => Some(children),
            Block::List(_) => None,
        }
    }
}

/// Address of a text block: `[i]`, `[i, j]` (list item) or `[i, j, k]`
/// (item of a nested list)
pub type BlockPath = Vec<usize>;

/// Borrowed view of a block that directly owns inline content
#[derive(Debug, Clone, Copy)]
pub struct TextBlockRef<'a> {
    pub kind: TextBlockKind,
    pub inlines: &'a [Inline],
}

/// What kind of text block a [`BlockPath`] resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlockKind {
    Block(BlockType),
    /// A list item, with the kind of the list that directly owns it
    ListItem(ListKind),
}

/// The document root. Always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// A document holding a single empty paragraph
    pub fn empty() -> Self {
        Self {
            blocks: vec![Block::Paragraph(Vec::new())],
        }
    }

    /// Build a document; an empty block list yields [`Document::empty`]
    pub fn new(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            Self::empty()
        } else {
            Self { blocks }
        }
    }

    /// Document with one plain paragraph per entry
    pub fn from_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> Self {
        Self::new(
            paragraphs
                .iter()
                .map(|p| {
                    let text = p.as_ref();
                    if text.is_empty() {
                        Block::Paragraph(Vec::new())
                    } else {
                        Block::Paragraph(vec![Inline::text(text)])
                    }
                })
                .collect(),
        )
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Paths of every text block, in document order
    pub fn text_block_paths(&self) -> Vec<BlockPath> {
        let mut paths = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            match block {
                Block::List(list) => collect_item_paths(list, vec![i], &mut paths),
                _ => paths.push(vec![i]),
            }
        }
        paths
    }

    /// Resolve a path to the text block it addresses
    pub fn text_block(&self, path: &[usize]) -> Option<TextBlockRef<'_>> {
        let (&first, rest) = path.split_first()?;
        let block = self.blocks.get(first)?;
        match block {
            Block::List(list) => item_at(list, rest),
            _ if rest.is_empty() => Some(TextBlockRef {
                kind: TextBlockKind::Block(block.block_type()?),
                inlines: block.inlines()?,
            }),
            _ => None,
        }
    }

    /// Concatenated text of the whole document, blocks separated by newlines
    pub fn plain_text(&self) -> String {
        self.text_block_paths()
            .iter()
            .filter_map(|path| self.text_block(path))
            .map(|block| inline_text(block.inlines))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn collect_item_paths(list: &List, prefix: Vec<usize>, paths: &mut Vec<BlockPath>) {
    for (j, item) in list.items.iter().enumerate() {
        let mut path = prefix.clone();
        path.push(j);
        if let Some(nested) = &item.nested {
            paths.push(path.clone());
            collect_item_paths(nested, path, paths);
        } else {
            paths.push(path);
        }
    }
}

fn item_at<'a>(list: &'a List, rest: &[usize]) -> Option<TextBlockRef<'a>> {
    let (&j, rest) = rest.split_first()?;
    let item = list.items.get(j)?;
    if rest.is_empty() {
        Some(TextBlockRef {
            kind: TextBlockKind::ListItem(list.kind),
            inlines: &item.children,
        })
    } else {
        item_at(item.nested.as_ref()?, rest)
    }
}

/// Concatenated text of a sequence of inlines
pub fn inline_text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .flat_map(|inline| inline.runs())
        .map(|run| run.text.as_str())
        .collect()
}
