//! Persisted JSON form of a document
//!
//! Notes are stored as `{"root": {"type": "root", "children": [...]}}`. Each
//! node carries a `type` tag; text formats are an integer bitset. Reading is
//! strict about node shapes (unknown types, misplaced nodes and bad formats
//! fail the whole parse) but ignores extra keys other producers write.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    Block, Document, Format, FormatSet, HeadingLevel, Inline, Link, List, ListItem, ListKind,
    TextRun,
};

/// Serialized form of [`Document::empty`]
pub const EMPTY_DOCUMENT: &str =
    r#"{"root":{"type":"root","children":[{"type":"paragraph","children":[]}]}}"#;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid document: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}

fn schema(message: impl Into<String>) -> ParseError {
    ParseError::Schema(message.into())
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Node {
    Root {
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    Quote {
        children: Vec<Node>,
    },
    Code {
        children: Vec<Node>,
    },
    Heading {
        tag: HeadingLevel,
        children: Vec<Node>,
    },
    List {
        #[serde(rename = "listType")]
        list_type: ListKind,
        children: Vec<Node>,
    },
    #[serde(rename = "listitem")]
    ListItem {
        children: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default)]
        format: WireFormat,
    },
    Link {
        url: String,
        children: Vec<Node>,
    },
}

impl Node {
    fn type_name(&self) -> &'static str {
        match self {
            Node::Root { .. } => "root",
            Node::Paragraph { .. } => "paragraph",
            Node::Quote { .. } => "quote",
            Node::Code { .. } => "code",
            Node::Heading { .. } => "heading",
            Node::List { .. } => "list",
            Node::ListItem { .. } => "listitem",
            Node::Text { .. } => "text",
            Node::Link { .. } => "link",
        }
    }
}

/// Text formats: written as the bitset, read from the bitset or a list of names
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireFormat {
    Bits(u32),
    Names(Vec<String>),
}

impl Default for WireFormat {
    fn default() -> Self {
        WireFormat::Bits(0)
    }
}

impl WireFormat {
    fn to_formats(&self) -> Result<FormatSet, ParseError> {
        match self {
            WireFormat::Bits(bits) => FormatSet::from_bits(*bits)
                .ok_or_else(|| schema(format!("unknown format bits in {}", bits))),
            WireFormat::Names(names) => names.iter().try_fold(FormatSet::empty(), |set, name| {
                Format::from_name(name)
                    .map(|format| set | format.flag())
                    .ok_or_else(|| schema(format!("unknown format \"{}\"", name)))
            }),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    root: &'a Node,
}

// ============================================================================
// Writing
// ============================================================================

/// Serialize a document to its persisted JSON form
pub fn serialize(document: &Document) -> String {
    let root = Node::Root {
        children: document.blocks().iter().map(block_node).collect(),
    };
    match serde_json::to_string(&Envelope { root: &root }) {
        Ok(json) => json,
        Err(err) => {
            // Only string keys and finite values are written, so this is unreachable
            tracing::error!(%err, "failed to serialize document");
            EMPTY_DOCUMENT.to_string()
        }
    }
}

fn block_node(block: &Block) -> Node {
    match block {
        Block::Paragraph(children) => Node::Paragraph {
            children: inline_nodes(children),
        },
        Block::Heading { level, children } => Node::Heading {
            tag: *level,
            children: inline_nodes(children),
        },
        Block::Quote(children) => Node::Quote {
            children: inline_nodes(children),
        },
        Block::Code(children) => Node::Code {
            children: inline_nodes(children),
        },
        Block::List(list) => list_node(list),
    }
}

fn list_node(list: &List) -> Node {
    Node::List {
        list_type: list.kind,
        children: list
            .items
            .iter()
            .map(|item| {
                let mut children = inline_nodes(&item.children);
                if let Some(nested) = &item.nested {
                    children.push(list_node(nested));
                }
                Node::ListItem { children }
            })
            .collect(),
    }
}

fn inline_nodes(inlines: &[Inline]) -> Vec<Node> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(run) => text_node(run),
            Inline::Link(link) => Node::Link {
                url: link.url.clone(),
                children: link.children.iter().map(text_node).collect(),
            },
        })
        .collect()
}

fn text_node(run: &TextRun) -> Node {
    Node::Text {
        text: run.text.clone(),
        format: WireFormat::Bits(run.formats.bits()),
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Parse a persisted document. Accepts the `{"root": ...}` envelope or a bare
/// root node.
pub fn deserialize(input: &str) -> Result<Document, ParseError> {
    let mut value: Value = serde_json::from_str(input)?;
    let root = match value.get_mut("root").map(Value::take) {
        Some(root) => root,
        None => value,
    };
    let node: Node = serde_json::from_value(root)?;

    let children = match node {
        Node::Root { children } => children,
        other => {
            return Err(schema(format!(
                "expected a root node, found \"{}\"",
                other.type_name()
            )))
        }
    };
    if children.is_empty() {
        return Err(schema("root has no blocks"));
    }
    let blocks = children
        .into_iter()
        .map(read_block)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document::new(blocks))
}

fn read_block(node: Node) -> Result<Block, ParseError> {
    match node {
        Node::Paragraph { children } => Ok(Block::Paragraph(read_inlines(children)?)),
        Node::Quote { children } => Ok(Block::Quote(read_inlines(children)?)),
        Node::Code { children } => Ok(Block::Code(read_inlines(children)?)),
        Node::Heading { tag, children } => Ok(Block::heading(tag, read_inlines(children)?)),
        Node::List {
            list_type,
            children,
        } => Ok(Block::List(read_list(list_type, children, 0)?)),
        other => Err(schema(format!(
            "\"{}\" is not allowed at block level",
            other.type_name()
        ))),
    }
}

fn read_list(kind: ListKind, children: Vec<Node>, depth: usize) -> Result<List, ParseError> {
    let items = children
        .into_iter()
        .map(|child| match child {
            Node::ListItem { children } => read_item(children, depth),
            other => Err(schema(format!(
                "a list holds only list items, found \"{}\"",
                other.type_name()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(List { kind, items })
}

fn read_item(mut children: Vec<Node>, depth: usize) -> Result<ListItem, ParseError> {
    if depth > 0 && matches!(children.last(), Some(Node::List { .. })) {
        return Err(schema("lists nest at most one level deep"));
    }
    let nested = match children.pop() {
        Some(Node::List {
            list_type,
            children,
        }) => Some(read_list(list_type, children, depth + 1)?),
        Some(other) => {
            children.push(other);
            None
        }
        None => None,
    };
    let children = read_inlines(children)?;
    Ok(match nested {
        Some(list) => ListItem::with_nested(children, list),
        None => ListItem::new(children),
    })
}

fn read_inlines(children: Vec<Node>) -> Result<Vec<Inline>, ParseError> {
    children
        .into_iter()
        .map(|child| match child {
            Node::Text { text, format } => Ok(Inline::Text(TextRun {
                text,
                formats: format.to_formats()?,
            })),
            Node::Link { url, children } => {
                if url.is_empty() {
                    return Err(schema("link with an empty url"));
                }
                let children = children
                    .into_iter()
                    .map(|child| match child {
                        Node::Text { text, format } => Ok(TextRun {
                            text,
                            formats: format.to_formats()?,
                        }),
                        Node::Link { .. } => Err(schema("links cannot nest")),
                        other => Err(schema(format!(
                            "a link holds only text, found \"{}\"",
                            other.type_name()
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Inline::Link(Link { url, children }))
            }
            other => Err(schema(format!(
                "\"{}\" is not allowed inside a text block",
                other.type_name()
            ))),
        })
        .collect()
}
