//! # Markup Codec
//!
//! Loads the editor's serialized content (an HTML-like markup string) into a
//! [`Document`] and writes a [`Document`] back out. This is the form history snapshots
//! and HTML exports carry.
//!
//! The loader is forgiving in the way an editing surface is: unknown tags become
//! elements like any other, stray end tags are ignored, unclosed elements close at end
//! of input, comments/doctypes/processing instructions are dropped and `script`/`style`
//! bodies are discarded. Character references are resolved so text nodes hold plain text.

use crate::model::{Document, Element, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// Parses markup into a tree.
pub fn parse(input: &str) -> Document {
    let bytes = input.as_bytes();
    let mut builder = TreeBuilder::default();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx.saturating_add(1), b'<').unwrap_or(bytes.len());
            builder.push_text(&decode_entities(&input[idx..next]));
            idx = next;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            idx = find_subslice(bytes, idx.saturating_add(4), b"-->")
                .map(|end| end.saturating_add(3))
                .unwrap_or(bytes.len());
            continue;
        }

        if starts_with(bytes, idx, b"<!") || starts_with(bytes, idx, b"<?") {
            idx = skip_to_gt(bytes, idx.saturating_add(2));
            continue;
        }

        let Some((tag, next_idx)) = parse_tag(input, idx) else {
            builder.push_text("<");
            idx = idx.saturating_add(1);
            continue;
        };

        if tag.is_end {
            builder.close(&tag.name);
            idx = next_idx;
            continue;
        }

        if !tag.self_closing && (tag.name == "script" || tag.name == "style") {
            idx = skip_raw_text(bytes, next_idx, tag.name.as_bytes());
            continue;
        }

        let mut element = Element::new(tag.name.as_str());
        element.attributes = tag.attributes;
        if tag.self_closing || is_void(&tag.name) {
            builder.push_node(element.into());
        } else {
            builder.open(element);
        }
        idx = next_idx;
    }

    builder.finish()
}

/// Writes a tree back out as markup.
pub fn to_markup(doc: &Document) -> String {
    let mut out = String::new();
    for child in &doc.children {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(content) => out.push_str(&escape_text(content)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag_name);
            for (name, value) in &el.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void(&el.tag_name) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag_name);
            out.push('>');
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Resolves the common named references and all numeric references.
/// Unknown references are kept literally.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|semi| *semi <= 10) {
            Some(semi) => match resolve_entity(&tail[1..semi]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.children_mut();
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }

    fn push_node(&mut self, node: Node) {
        self.children_mut().push(node);
    }

    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    /// Closes the nearest open element with this name, and everything opened inside it.
    fn close(&mut self, name: &str) {
        let Some(pos) = self.open.iter().rposition(|el| el.tag_name == name) else {
            return;
        };
        while self.open.len() > pos {
            if let Some(el) = self.open.pop() {
                self.push_node(el.into());
            }
        }
    }

    fn finish(mut self) -> Document {
        while let Some(el) = self.open.pop() {
            self.push_node(el.into());
        }
        Document::new(self.root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Vec<(String, String)>,
}

fn parse_tag(input: &str, start: usize) -> Option<(ParsedTag, usize)> {
    let bytes = input.as_bytes();
    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = input[name_start..idx].to_ascii_lowercase();

    let mut attributes = Vec::new();
    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied()? {
            b'>' => {
                return Some((
                    ParsedTag {
                        name,
                        is_end,
                        self_closing: false,
                        attributes,
                    },
                    idx.saturating_add(1),
                ));
            }
            b'/' => {
                let after = skip_spaces(bytes, idx.saturating_add(1));
                if bytes.get(after).copied() == Some(b'>') {
                    return Some((
                        ParsedTag {
                            name,
                            is_end,
                            self_closing: true,
                            attributes,
                        },
                        after.saturating_add(1),
                    ));
                }
                idx = idx.saturating_add(1);
            }
            _ => {
                let attr_start = idx;
                while idx < bytes.len() && !is_attr_name_end(bytes[idx]) {
                    idx = idx.saturating_add(1);
                }
                if idx == attr_start {
                    idx = idx.saturating_add(1);
                    continue;
                }
                let attr_name = input[attr_start..idx].to_ascii_lowercase();
                idx = skip_spaces(bytes, idx);

                if bytes.get(idx).copied() != Some(b'=') {
                    attributes.push((attr_name, String::new()));
                    continue;
                }
                idx = skip_spaces(bytes, idx.saturating_add(1));

                let (value, next) = match bytes.get(idx).copied()? {
                    quote @ (b'"' | b'\'') => {
                        let value_start = idx.saturating_add(1);
                        let end = find_byte(bytes, value_start, quote)?;
                        (&input[value_start..end], end.saturating_add(1))
                    }
                    _ => {
                        let value_start = idx;
                        while idx < bytes.len()
                            && !bytes[idx].is_ascii_whitespace()
                            && bytes[idx] != b'>'
                        {
                            idx = idx.saturating_add(1);
                        }
                        (&input[value_start..idx], idx)
                    }
                };
                attributes.push((attr_name, decode_entities(value)));
                idx = next;
            }
        }
    }
}

fn skip_raw_text(bytes: &[u8], start: usize, tag_name: &[u8]) -> usize {
    let mut idx = start;
    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_name)
        {
            return skip_to_gt(bytes, idx.saturating_add(2));
        }
        idx = idx.saturating_add(1);
    }
    bytes.len()
}

fn skip_to_gt(bytes: &[u8], from: usize) -> usize {
    find_byte(bytes, from, b'>')
        .map(|gt| gt.saturating_add(1))
        .unwrap_or(bytes.len())
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attr_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end].eq_ignore_ascii_case(pattern)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}
