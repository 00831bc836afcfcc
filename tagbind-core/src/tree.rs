//! Tree representation for parsed documents.
//!
//! This module provides a tree-based API layered over the event parser.
//! Every node is owned by its parent and the [`Document`] is owned by the
//! caller; there are no parent pointers. Nodes are immutable once built.
//!
//! # Example
//!
//! ```
//! use tagbind_core::tree::Document;
//!
//! let input = r#"<book id="1"><name>Java核心技术</name><tags><tag>Java</tag></tags></book>"#.as_bytes();
//! let doc = Document::parse(input).unwrap();
//!
//! let root = doc.root();
//! assert_eq!(root.attr("id"), Some("1"));
//! assert_eq!(root.find("name").map(|el| el.text()), Some("Java核心技术".to_string()));
//! for el in root.child_elements() {
//!     println!("Element: {}", el.name());
//! }
//! ```

use std::io::Read;

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::event::StructEvent;
use crate::parser::EventReader;

// ============================================================================
// Core Types
// ============================================================================

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element node.
    Element(Element),
    /// Text content, references already decoded.
    Text(String),
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element with its attributes and children, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

// ============================================================================
// Document
// ============================================================================

/// A parsed document: the sole owner of the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse input bytes into a document tree.
    pub fn parse(input: &[u8]) -> Result<Self> {
        Self::parse_with_options(input, ParseOptions::default())
    }

    /// Parse input bytes into a document tree with the given options.
    pub fn parse_with_options(input: &[u8], options: ParseOptions) -> Result<Self> {
        let mut builder = TreeBuilder::new();
        for event in EventReader::with_options(input, options) {
            builder.handle_event(event?);
        }
        builder.finish()
    }

    /// Drain `reader` and parse its contents.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        Self::parse(&input)
    }

    /// Get the root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Take ownership of the root element.
    pub fn into_root(self) -> Element {
        self.root
    }
}

// ============================================================================
// Node / Element navigation
// ============================================================================

impl Node {
    /// Check if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Get the element if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Get text content if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    fn collect_text(&self, buf: &mut String) {
        match self {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => el.collect_text(buf),
        }
    }
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get the element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attributes, in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All child nodes, in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterate over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    /// All child elements with the given name.
    pub fn find_all<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Element> + 's {
        self.child_elements().filter(move |el| el.name == name)
    }

    /// Concatenation of all descendant text, in document order.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf
    }

    /// Check if the element has no children at all.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            child.collect_text(buf);
        }
    }
}

// ============================================================================
// TreeBuilder (event consumer)
// ============================================================================

/// Builds a [`Document`] from structural events.
///
/// Partially built elements live on a construction stack; an element is
/// attached to its parent (or becomes the root) when its ElementEnd
/// arrives, after which it is never touched again.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    /// Stack of open elements.
    stack: Vec<Element>,
    root: Option<Element>,
    complete: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one structural event.
    pub fn handle_event(&mut self, event: StructEvent<'_>) {
        match event {
            StructEvent::DocumentStart => {}
            StructEvent::ElementStart {
                name, attributes, ..
            } => {
                self.stack.push(Element {
                    name: name.to_string(),
                    attributes: attributes
                        .into_iter()
                        .map(|a| Attribute {
                            name: a.name.to_string(),
                            value: a.value.into_owned(),
                        })
                        .collect(),
                    children: Vec::new(),
                });
            }
            StructEvent::Characters { text, .. } => {
                if let Some(top) = self.stack.last_mut() {
                    top.children.push(Node::Text(text.into_owned()));
                }
            }
            StructEvent::ElementEnd { .. } => {
                if let Some(done) = self.stack.pop() {
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Element(done)),
                        None => self.root = Some(done),
                    }
                }
            }
            StructEvent::DocumentEnd => self.complete = true,
        }
    }

    /// Check if DocumentEnd has been observed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Return the completed document.
    pub fn finish(self) -> Result<Document> {
        match self.root {
            Some(root) if self.complete && self.stack.is_empty() => Ok(Document { root }),
            _ => Err(Error::structure("event stream ended before DocumentEnd", 0)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
