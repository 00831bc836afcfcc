//! Reference serializer for round-trip tests

use tagbind_core::{Document, Element, Node};

/// Serialize a document back to markup. Empty elements use `<a/>`.
pub fn to_markup(doc: &Document) -> String {
    let mut out = String::new();
    write_element(doc.root(), &mut out);
    out
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(el.name());
    for attr in el.attributes() {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape(&attr.value, out);
        out.push('"');
    }
    if el.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in el.children() {
        match child {
            Node::Element(child) => write_element(child, out),
            Node::Text(text) => escape(text, out),
        }
    }
    out.push_str("</");
    out.push_str(el.name());
    out.push('>');
}

fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}
