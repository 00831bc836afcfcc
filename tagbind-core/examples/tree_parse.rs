//! Example: Parse a document to a tree and navigate it.
//!
//! Run with: cargo run --example tree_parse

use tagbind_core::{Document, Element, Node, ParseOptions};

fn main() {
    let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<books>
  <book id="1">
    <name>Java核心技术</name>
    <author>Cay S. Horstmann</author>
    <isbn lang="CN">1234567</isbn>
    <tags>
      <tag>Java</tag>
      <tag>Network</tag>
    </tags>
  </book>
  <book id="2">
    <name>Go &amp; You</name>
    <!-- out of print -->
    <note><![CDATA[<b>bold</b> claims]]></note>
  </book>
</books>
"#.as_bytes();

    let opts = ParseOptions::new().ignore_whitespace_text(true);
    let doc = Document::parse_with_options(input, opts).expect("parse failed");

    println!("=== Document Tree ===\n");
    print_element(doc.root(), 0);

    println!("\n=== Element Details ===\n");
    for book in doc.root().find_all("book") {
        println!("Book {}", book.attr("id").unwrap_or("?"));
        if let Some(name) = book.find("name") {
            println!("  name: {}", name.text());
        }
        let tags: Vec<String> = book
            .find("tags")
            .map(|tags| tags.find_all("tag").map(Element::text).collect())
            .unwrap_or_default();
        if !tags.is_empty() {
            println!("  tags: {:?}", tags);
        }
        println!();
    }
}

fn print_element(el: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut desc = format!("<{}", el.name());
    for attr in el.attributes() {
        desc.push_str(&format!(" {}={:?}", attr.name, attr.value));
    }
    println!("{}{}>", indent, desc);

    for child in el.children() {
        match child {
            Node::Element(child) => print_element(child, depth + 1),
            Node::Text(text) => {
                let text = text.trim();
                if text.chars().count() > 40 {
                    let cut: String = text.chars().take(40).collect();
                    println!("{}  \"{}...\"", indent, cut);
                } else {
                    println!("{}  \"{}\"", indent, text);
                }
            }
        }
    }
}
