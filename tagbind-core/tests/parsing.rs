//! Tree-building tests
//!
//! Documents are parsed into owned trees and navigated through the public
//! API only.

mod common;

use common::{to_markup, Gen};
use pretty_assertions::assert_eq;
use tagbind_core::tree::TreeBuilder;
use tagbind_core::{parse_to_tree, Document, Element, Error, EventReader, Node, ParseOptions};

const BOOKS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE books>
<books>
  <book id="1">
    <name>Java核心技术</name>
    <author>Cay S. Horstmann</author>
    <price>1,234.50</price>
    <isbn lang="CN">1234567</isbn>
    <tags>
      <tag>Java</tag>
      <tag>Network</tag>
    </tags>
    <pubDate>2016-11-01</pubDate>
  </book>
  <book id="2">
    <name>Go &amp; You</name>
    <price>59</price>
  </book>
</books>"#;

fn books() -> Document {
    Document::parse(BOOKS.as_bytes()).unwrap()
}

fn names<'a>(it: impl Iterator<Item = &'a Element>) -> Vec<&'a str> {
    it.map(Element::name).collect()
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn root_and_children() {
    let doc = books();
    let root = doc.root();
    assert_eq!(root.name(), "books");
    assert_eq!(names(root.child_elements()), vec!["book", "book"]);
    // Whitespace between books is kept as text
    assert!(root.children().iter().any(Node::is_text));
}

#[test]
fn attributes_and_find() {
    let doc = books();
    let first = doc.root().find("book").unwrap();
    assert_eq!(first.attr("id"), Some("1"));
    assert_eq!(first.find("isbn").and_then(|el| el.attr("lang")), Some("CN"));
    assert_eq!(first.find("name").map(Element::text).as_deref(), Some("Java核心技术"));
    assert!(first.find("missing").is_none());
}

#[test]
fn find_all_in_document_order() {
    let doc = books();
    let tags: Vec<String> = doc
        .root()
        .find("book")
        .and_then(|book| book.find("tags"))
        .map(|tags| tags.find_all("tag").map(Element::text).collect())
        .unwrap_or_default();
    assert_eq!(tags, vec!["Java", "Network"]);

    let ids: Vec<_> = doc
        .root()
        .find_all("book")
        .filter_map(|book| book.attr("id"))
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn text_is_descendant_concatenation() {
    let doc = Document::parse(b"<p>a<b>b<i>c</i></b>d<!-- x -->e</p>").unwrap();
    assert_eq!(doc.root().text(), "abcde");
}

#[test]
fn entities_decoded_in_tree() {
    let doc = books();
    let second = doc.root().find_all("book").nth(1).unwrap();
    assert_eq!(second.find("name").unwrap().text(), "Go & You");
}

#[test]
fn into_root_takes_ownership() {
    let root = books().into_root();
    assert_eq!(root.child_elements().count(), 2);
}

// =============================================================================
// Equivalences
// =============================================================================

#[test]
fn self_closing_equals_empty_pair() {
    let pairs = [
        ("<a/>", "<a></a>"),
        ("<a x='1'/>", "<a x=\"1\"></a>"),
        ("<r><a/><b /></r>", "<r><a></a><b></b></r>"),
    ];
    for (short, long) in pairs {
        assert_eq!(
            Document::parse(short.as_bytes()).unwrap(),
            Document::parse(long.as_bytes()).unwrap(),
            "{} vs {}",
            short,
            long
        );
    }
}

#[test]
fn quoting_style_is_not_structural() {
    assert_eq!(
        Document::parse(br#"<a x="it's"/>"#).unwrap(),
        Document::parse(b"<a x='it&apos;s'/>").unwrap()
    );
}

#[test]
fn cdata_equals_escaped_text() {
    assert_eq!(
        Document::parse(b"<a><![CDATA[1 < 2 & 3]]></a>").unwrap(),
        Document::parse(b"<a>1 &lt; 2 &amp; 3</a>").unwrap()
    );
}

// =============================================================================
// Options and entry points
// =============================================================================

#[test]
fn ignore_whitespace_text() {
    let opts = ParseOptions::new().ignore_whitespace_text(true);
    let doc = Document::parse_with_options(BOOKS.as_bytes(), opts).unwrap();
    assert!(doc.root().children().iter().all(Node::is_element));

    let book = doc.root().find("book").unwrap();
    let tags = book.find("tags").unwrap();
    assert_eq!(tags.children().len(), 2);
    // Non-whitespace text is untouched
    assert_eq!(book.find("author").unwrap().text(), "Cay S. Horstmann");
}

#[test]
fn parse_to_tree_drains_reader() {
    let doc = parse_to_tree(std::io::Cursor::new(BOOKS.as_bytes().to_vec())).unwrap();
    assert_eq!(doc, books());
}

#[test]
fn parse_to_tree_propagates_io_errors() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
        }
    }
    assert!(matches!(parse_to_tree(Broken), Err(Error::Io(_))));
}

#[test]
fn tree_builder_from_push_driver() {
    let mut builder = TreeBuilder::new();
    EventReader::new(BOOKS.as_bytes())
        .parse(|event| builder.handle_event(event))
        .unwrap();
    assert!(builder.is_complete());
    assert_eq!(builder.finish().unwrap(), books());
}

#[test]
fn no_tree_on_error() {
    let cases: [(&[u8], fn(&Error) -> bool); 4] = [
        (b"<a><b></a>", |e| matches!(e, Error::UnbalancedElement { .. })),
        (b"<a>", |e| matches!(e, Error::UnexpectedEof { .. })),
        (b"<a/><b/>", |e| matches!(e, Error::InvalidDocumentStructure { .. })),
        (b"<a>&bogus;</a>", |e| matches!(e, Error::MalformedMarkup { .. })),
    ];
    for (input, check) in cases {
        let err = Document::parse(input).unwrap_err();
        assert!(check(&err), "{:?}: {}", String::from_utf8_lossy(input), err);
    }
}

#[test]
fn deep_nesting() {
    let depth = 2000;
    let input = format!("{}{}", "<d>".repeat(depth), "</d>".repeat(depth));
    let doc = Document::parse(input.as_bytes()).unwrap();
    let mut el = doc.root();
    let mut seen = 1;
    while let Some(child) = el.child_elements().next() {
        el = child;
        seen += 1;
    }
    assert_eq!(seen, depth);
}

#[test]
fn generated_documents_round_trip() {
    let mut gen = Gen::from_env_or_random();
    for _ in 0..200 {
        let input = gen.document();
        let doc = Document::parse(input.as_bytes()).unwrap_or_else(|err| {
            panic!("{}\n{:?}\nSeed: {} (set TAGBIND_TEST_SEED to reproduce)", err, input, gen.seed)
        });
        let again = Document::parse(to_markup(&doc).as_bytes()).unwrap();
        assert_eq!(doc, again, "seed {}", gen.seed);
    }
}
