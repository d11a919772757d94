//! Short text previews for note list views

use crate::codec;
use crate::model::{inline_text, Block, Document};

/// Shown when the stored content does not parse
pub const INVALID_CONTENT: &str = "Conteúdo inválido.";

/// Shown when the note has no paragraph text
pub const NO_CONTENT: &str = "Sem conteúdo.";

/// Preview of a serialized note: the text of its top-level paragraphs, joined
/// without separators, cut at `max_length` chars with `...` appended.
///
/// Headings, quotes, code blocks and list items never appear in a preview.
pub fn extract_preview(serialized: &str, max_length: usize) -> String {
    match codec::deserialize(serialized) {
        Ok(document) => document_preview(&document, max_length),
        Err(err) => {
            tracing::debug!(%err, "preview of unparseable note");
            INVALID_CONTENT.to_string()
        }
    }
}

/// Preview of an already parsed document
pub fn document_preview(document: &Document, max_length: usize) -> String {
    let text: String = document
        .blocks()
        .iter()
        .filter_map(|block| match block {
            Block::Paragraph(children) => Some(inline_text(children)),
            _ => None,
        })
        .collect();

    if text.is_empty() {
        return NO_CONTENT.to_string();
    }
    if text.chars().count() > max_length {
        let mut truncated: String = text.chars().take(max_length).collect();
        truncated.push_str("...");
        truncated
    } else {
        text
    }
}
