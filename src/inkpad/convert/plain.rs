//! Tree → plain text.

use crate::model::{collapse_newlines, Document, Node, Tag};

pub fn to_plain_text(doc: &Document) -> String {
    let mut out = String::new();
    for child in &doc.children {
        render(child, &mut out);
    }
    collapse_newlines(&out)
}

fn render(node: &Node, out: &mut String) {
    match node {
        Node::Text(content) => out.push_str(content),
        Node::Element(el) => {
            let tag = el.tag();
            let block = tag.is_text_block();
            if block {
                out.push('\n');
            }
            for child in &el.children {
                render(child, out);
            }
            if block && tag != Tag::LineBreak {
                out.push('\n');
            }
        }
    }
}
