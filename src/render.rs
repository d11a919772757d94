//! Read-only rendering of stored notes
//!
//! Documents are rendered to Markdown first and then to HTML with
//! pulldown-cmark. Underline has no Markdown syntax and is written as inline
//! `<u>` HTML, which pulldown-cmark passes through.

use pulldown_cmark::{html, Options, Parser};

use crate::codec::{self, ParseError};
use crate::model::{
    inline_text, Block, Document, FormatSet, HeadingLevel, Inline, List, ListKind, TextRun,
};

/// Rendered in place of a note whose content does not parse
pub const NOTE_UNAVAILABLE: &str = "Nota não disponível.";

/// Render a serialized note to HTML
pub fn render_html(serialized: &str) -> Result<String, ParseError> {
    let document = codec::deserialize(serialized)?;
    Ok(markdown_to_html(&render_markdown(&document)))
}

/// Render a serialized note for display, falling back to [`NOTE_UNAVAILABLE`]
pub fn render_note(serialized: &str) -> String {
    match render_html(serialized) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(%err, "note could not be rendered");
            format!("<p>{}</p>\n", NOTE_UNAVAILABLE)
        }
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Render a document as CommonMark (with `~~strikethrough~~`)
pub fn render_markdown(document: &Document) -> String {
    let mut sections: Vec<String> = Vec::new();
    let mut previous_list: Option<ListKind> = None;

    for block in document.blocks() {
        let section = match block {
            Block::Paragraph(children) => render_inlines(children),
            Block::Heading { level, children } => {
                let hashes = match level {
                    HeadingLevel::H1 => "#",
                    HeadingLevel::H2 => "##",
                };
                format!("{} {}", hashes, render_inlines(children))
            }
            Block::Quote(children) => format!("> {}", render_inlines(children)),
            Block::Code(children) => {
                let text = inline_text(children);
                let fence = "`".repeat(longest_backtick_run(&text).max(2) + 1);
                format!("{}\n{}\n{}", fence, text, fence)
            }
            Block::List(list) => {
                // Keep two adjacent lists of the same kind from merging
                if previous_list == Some(list.kind) {
                    sections.push("<!-- -->".to_string());
                }
                let mut out = String::new();
                render_list(list, 0, &mut out);
                out.trim_end().to_string()
            }
        };
        if section.trim().is_empty() {
            continue;
        }
        previous_list = match block {
            Block::List(list) => Some(list.kind),
            _ => None,
        };
        sections.push(section);
    }

    let mut markdown = sections.join("\n\n");
    markdown.push('\n');
    markdown
}

fn render_list(list: &List, indent: usize, out: &mut String) {
    for (i, item) in list.items.iter().enumerate() {
        let marker = match list.kind {
            ListKind::Ordered => format!("{}. ", i + 1),
            ListKind::Unordered => "- ".to_string(),
        };
        out.push_str(&" ".repeat(indent));
        out.push_str(&marker);
        out.push_str(&render_inlines(&item.children));
        out.push('\n');
        if let Some(nested) = &item.nested {
            render_list(nested, indent + marker.len(), out);
        }
    }
}

fn render_inlines(inlines: &[Inline]) -> String {
    let line: String = inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(run) => render_run(run),
            Inline::Link(link) => {
                let text: String = link.children.iter().map(render_run).collect();
                format!("[{}]({})", text, link.url.replace(' ', "%20").replace(')', "%29"))
            }
        })
        .collect();
    escape_line_start(line)
}

fn render_run(run: &TextRun) -> String {
    // Emphasis markers must hug non-whitespace, so surrounding spaces stay outside
    let core = run.text.trim();
    if core.is_empty() {
        return escape(&run.text);
    }
    let lead = &run.text[..run.text.len() - run.text.trim_start().len()];
    let trail = &run.text[run.text.trim_end().len()..];

    let mut text = if run.formats.contains(FormatSet::CODE) {
        let ticks = "`".repeat(longest_backtick_run(core) + 1);
        if core.starts_with('`') || core.ends_with('`') {
            format!("{} {} {}", ticks, core, ticks)
        } else {
            format!("{}{}{}", ticks, core, ticks)
        }
    } else {
        escape(core)
    };
    if run.formats.contains(FormatSet::STRIKETHROUGH) {
        text = format!("~~{}~~", text);
    }
    if run.formats.contains(FormatSet::ITALIC) {
        text = format!("*{}*", text);
    }
    if run.formats.contains(FormatSet::BOLD) {
        text = format!("**{}**", text);
    }
    if run.formats.contains(FormatSet::UNDERLINE) {
        text = format!("<u>{}</u>", text);
    }
    format!("{}{}{}", lead, text, trail)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '*' | '_' | '`' | '[' | ']' | '~' | '<' | '>' | '#' | '!' | '|' | '&'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a list marker or rule opening a line (`- `, `+ `, `---`, `1. `, `2) `)
fn escape_line_start(line: String) -> String {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    if rest.starts_with('-') || rest.starts_with('+') {
        return format!("{}\\{}", &line[..indent], rest);
    }
    // Ordered list markers take at most nine digits
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if (1..=9).contains(&digits) && matches!(rest.as_bytes().get(digits), Some(b'.' | b')')) {
        let at = indent + digits;
        return format!("{}\\{}", &line[..at], &line[at..]);
    }
    line
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
