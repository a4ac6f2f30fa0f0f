//! # Tree Model
//!
//! Rich-text content is a [`Document`]: an ordered list of [`Node`]s under a synthetic
//! root that never renders anything itself. Elements keep their tag name (lowercase) and
//! their attributes in source order, so an `id` or `data-*` marker survives every
//! transform that does not target it.
//!
//! Serializers never dispatch on raw tag strings. They classify an element once with
//! [`Element::tag`] and match on the closed [`Tag`] enum; anything unrecognised lands in
//! [`Tag::Other`] and renders its children only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to new notes and to notes saved with an empty title.
pub const UNTITLED_TITLE: &str = "Untitled Note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(content),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::text(text))
    }

    /// Attribute lookup; names compare case-insensitively like HTML.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn tag(&self) -> Tag {
        Tag::from_name(&self.tag_name)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Element(_)))
    }

    /// Element children classified as list items, in order.
    pub fn list_items(&self) -> impl Iterator<Item = &Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .filter(|el| el.tag() == Tag::ListItem)
    }
}

/// A tree rooted at the synthetic container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }
}

/// Closed classification of the tags the serializers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Container,
    Paragraph,
    /// Level 1 to 6.
    Heading(u8),
    UnorderedList,
    OrderedList,
    ListItem,
    Blockquote,
    LineBreak,
    Bold,
    Italic,
    Underline,
    Code,
    Preformatted,
    Link,
    Image,
    Rule,
    Other,
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "div" => Tag::Container,
            "p" => Tag::Paragraph,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "blockquote" => Tag::Blockquote,
            "br" => Tag::LineBreak,
            "b" | "strong" => Tag::Bold,
            "i" | "em" => Tag::Italic,
            "u" => Tag::Underline,
            "code" => Tag::Code,
            "pre" => Tag::Preformatted,
            "a" => Tag::Link,
            "img" => Tag::Image,
            "hr" => Tag::Rule,
            _ => Tag::Other,
        }
    }

    /// Tags that open a new line in plain-text output.
    pub fn is_text_block(self) -> bool {
        matches!(
            self,
            Tag::Container
                | Tag::Paragraph
                | Tag::Heading(_)
                | Tag::UnorderedList
                | Tag::OrderedList
                | Tag::ListItem
                | Tag::Blockquote
                | Tag::LineBreak
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, Tag::UnorderedList | Tag::OrderedList)
    }
}

/// Collapses every run of three or more newlines to exactly two.
pub(crate) fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    /// Serialized markup of the note body.
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            updated_at: Utc::now(),
        }
    }

    pub fn untitled() -> Self {
        Self::new(UNTITLED_TITLE, "")
    }

    /// Stores new title/content, falling back to the default title when empty.
    pub fn save(&mut self, title: &str, content: &str) {
        self.title = if title.is_empty() {
            UNTITLED_TITLE.to_string()
        } else {
            title.to_string()
        };
        self.content = content.to_string();
        self.updated_at = Utc::now();
    }
}
