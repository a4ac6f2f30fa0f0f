//! Tree → Markdown.
//!
//! Ordered list items are all written as `1.`; Markdown renderers renumber them, and the
//! editor never relies on the literal numbers.

use crate::model::{collapse_newlines, Document, Element, Node, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// Where we are in list nesting. Threaded through the recursion, never stored on nodes.
#[derive(Debug, Clone, Copy, Default)]
struct ListContext {
    level: usize,
    kind: Option<ListKind>,
}

impl ListContext {
    fn enter(self, kind: ListKind) -> Self {
        Self {
            level: if self.kind.is_some() { self.level + 1 } else { 0 },
            kind: Some(kind),
        }
    }

    fn indent(self) -> String {
        "  ".repeat(self.level)
    }
}

pub fn to_markdown(doc: &Document) -> String {
    let raw = render_children(&doc.children, ListContext::default());
    collapse_newlines(&raw).trim().to_string()
}

fn render_children(children: &[Node], ctx: ListContext) -> String {
    children.iter().map(|c| render(c, ctx)).collect()
}

fn render(node: &Node, ctx: ListContext) -> String {
    match node {
        Node::Text(content) => content.clone(),
        Node::Element(el) => render_element(el, ctx),
    }
}

fn render_element(el: &Element, ctx: ListContext) -> String {
    let tag = el.tag();
    let inner = match tag {
        Tag::UnorderedList => ctx.enter(ListKind::Unordered),
        Tag::OrderedList => ctx.enter(ListKind::Ordered),
        _ => ctx,
    };
    let child = match tag {
        Tag::Preformatted => el.text_content().trim_end_matches('\n').to_string(),
        _ => render_children(&el.children, inner),
    };

    match tag {
        Tag::Heading(level) => format!("{} {}\n\n", "#".repeat(level as usize), child.trim()),
        Tag::Paragraph => format!("{}\n\n", child.trim()),
        Tag::LineBreak => "\n".to_string(),
        Tag::Bold => emphasis(&child, "**"),
        Tag::Italic => emphasis(&child, "*"),
        Tag::Underline => format!("<u>{child}</u>"),
        Tag::UnorderedList | Tag::OrderedList => {
            // A nested list must start on its own line inside the parent item.
            let lead = if ctx.kind.is_some() { "\n" } else { "" };
            format!("{lead}{child}\n")
        }
        Tag::ListItem => {
            let marker = match ctx.kind {
                Some(ListKind::Ordered) => "1. ",
                _ => "- ",
            };
            format!("{}{}{}\n", ctx.indent(), marker, child.trim())
        }
        Tag::Blockquote => format!("> {}\n\n", child.trim().replace('\n', "\n> ")),
        Tag::Code => format!("`{child}`"),
        Tag::Preformatted => format!("```\n{child}\n```\n\n"),
        Tag::Link => format!("[{}]({})", child, el.attr("href").unwrap_or_default()),
        Tag::Image => format!(
            "![{}]({})",
            el.attr("alt").unwrap_or_default(),
            el.attr("src").unwrap_or_default()
        ),
        Tag::Rule => "\n---\n\n".to_string(),
        Tag::Container => {
            if el.text_content().trim().is_empty() {
                child
            } else {
                format!("{child}\n")
            }
        }
        Tag::Other => child,
    }
}

/// Wraps `text` in `marker`, keeping edge whitespace outside: a delimiter run next to
/// a space does not open or close emphasis.
fn emphasis(text: &str, marker: &str) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    format!("{}{marker}{core}{marker}{}", &text[..start], &text[end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup;

    fn md(src: &str) -> String {
        to_markdown(&markup::parse(src))
    }

    #[test]
    fn test_headings_and_paragraphs() {
        assert_eq!(
            md("<h1> Title </h1><p>  Some <strong>bold</strong> text. </p><h3>Sub</h3>"),
            "# Title\n\nSome **bold** text.\n\n### Sub"
        );
    }

    #[test]
    fn test_inline_marks() {
        assert_eq!(
            md("<b>b</b> <em>e</em> <u>u</u> <code>c</code>"),
            "**b** *e* <u>u</u> `c`"
        );
    }

    #[test]
    fn test_edge_whitespace_moves_outside_markers() {
        assert_eq!(md("<p><strong>bold </strong>text</p>"), "**bold** text");
        assert_eq!(md("<p>an<em> italic </em>word</p>"), "an *italic* word");
        assert_eq!(md("<p>x<b> </b>y</p>"), "x y");
        assert_eq!(md("<p>x<b></b>y</p>"), "xy");
    }

    #[test]
    fn test_unordered_and_ordered_lists() {
        assert_eq!(md("<ul><li>one</li><li> two </li></ul>"), "- one\n- two");
        assert_eq!(
            md("<ol><li>first</li><li>second</li><li>third</li></ol>"),
            "1. first\n1. second\n1. third"
        );
    }

    #[test]
    fn test_nested_list_indents_two_spaces_per_level() {
        let out = md("<ul><li>top<ul><li>mid<ol><li>deep</li></ol></li></ul></li><li>next</li></ul>");
        assert_eq!(out, "- top\n  - mid\n    1. deep\n- next");
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        assert_eq!(md("<blockquote>a<br>b</blockquote>"), "> a\n> b");
    }

    #[test]
    fn test_links_images_rules() {
        assert_eq!(
            md(r#"<p><a href="https://x.y">site</a> <img src="p.png" alt="pic"></p><hr><p>end</p>"#),
            "[site](https://x.y) ![pic](p.png)\n\n---\n\nend"
        );
    }

    #[test]
    fn test_preformatted_uses_text_only() {
        assert_eq!(
            md("<pre><code>let x = 1;\n</code></pre>"),
            "```\nlet x = 1;\n```"
        );
    }

    #[test]
    fn test_container_with_text_ends_line() {
        assert_eq!(md("<div>one</div><div>two</div>"), "one\ntwo");
        assert_eq!(md("<div><br></div><div>x</div>"), "x");
    }

    #[test]
    fn test_unknown_tags_render_children() {
        assert_eq!(md("<span><font>plain</font></span>"), "plain");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_markdown(&Document::default()), "");
    }
}
