//! Structural events - the core output of the tagbind event parser.
//!
//! This is a SAX-style event model: events describe document structure
//! independent of lexical detail (quoting style, entity form, CDATA).
//! Structure is represented by start/end event pairs.
//!
//! ## Event Sequences
//!
//! `<book id="7"><name>Go</name><tag/></book>` emits:
//! ```text
//! DocumentStart
//! ElementStart { name: "book", attributes: [("id", "7")] }
//! ElementStart { name: "name" }
//! Characters("Go")
//! ElementEnd { name: "name" }
//! ElementStart { name: "tag" }
//! ElementEnd { name: "tag" }
//! ElementEnd { name: "book" }
//! DocumentEnd
//! ```

use std::borrow::Cow;

use crate::span::Span;

/// An attribute on a start tag, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

/// Structural parser events.
///
/// The lifetime `'a` refers to the source buffer. Names are always
/// borrowed; text and attribute values are borrowed unless references
/// had to be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum StructEvent<'a> {
    /// Emitted once, immediately before the root ElementStart.
    DocumentStart,

    /// Start tag (or the opening half of a self-closing tag).
    ElementStart {
        name: &'a str,
        attributes: Vec<Attribute<'a>>,
        span: Span,
    },

    /// Character data inside an element. Adjacent runs are coalesced.
    Characters { text: Cow<'a, str>, span: Span },

    /// End tag (or the closing half of a self-closing tag).
    ElementEnd { name: &'a str, span: Span },

    /// Emitted once, after the root element closes and input is exhausted.
    DocumentEnd,
}

impl<'a> StructEvent<'a> {
    /// Get the span for this event. Document events have none.
    pub fn span(&self) -> Option<Span> {
        match self {
            StructEvent::DocumentStart | StructEvent::DocumentEnd => None,
            StructEvent::ElementStart { span, .. } => Some(*span),
            StructEvent::Characters { span, .. } => Some(*span),
            StructEvent::ElementEnd { span, .. } => Some(*span),
        }
    }

    /// Element name for ElementStart/ElementEnd.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            StructEvent::ElementStart { name, .. } | StructEvent::ElementEnd { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Check if this is an element start event.
    pub fn is_element_start(&self) -> bool {
        matches!(self, StructEvent::ElementStart { .. })
    }

    /// Check if this is an element end event.
    pub fn is_element_end(&self) -> bool {
        matches!(self, StructEvent::ElementEnd { .. })
    }
}
