//! tagbind core
//!
//! Streaming parser for tag-structured documents with typed record binding.
//! Documents are read as structural events, as an owned tree, or as typed
//! records bound against a schema.
//!
//! # Architecture
//!
//! - **lexer.rs** - Byte-level tokenizer producing lexical events
//! - **entities.rs** - Entity and character reference decoding
//! - **parser.rs** - Event parser with the open-element stack
//! - **event.rs** - Structural event types
//! - **tree.rs** - Owned document tree built from events
//! - **bind.rs** - Typed binder (streaming and tree)
//! - **schema.rs** - Schemas, field specs and the decoder registry
//! - **value.rs** - Field values, exact decimals, default coercions
//! - **span.rs** - Span/Location types
//!
//! # Example
//!
//! ```
//! use tagbind_core::{parse_to_records, decoders, FieldSpec, FieldType, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! builder.define_schema(
//!     "book",
//!     vec![
//!         FieldSpec::new("id", FieldType::Integer).required(),
//!         FieldSpec::new("name", FieldType::Text).required(),
//!         FieldSpec::new("price", FieldType::Decimal)
//!             .required()
//!             .decoder(decoders::grouped_decimal),
//!     ],
//! );
//! let registry = builder.freeze();
//!
//! let input = "<book><id>7</id><name>Go</name><price>1,234.50</price></book>";
//! let records = parse_to_records(input.as_bytes(), &registry, "book").unwrap();
//! let book = records[0].as_ref().unwrap();
//! assert_eq!(book.integer("id"), Some(7));
//! assert_eq!(book.decimal("price").unwrap().to_string(), "1234.50");
//! ```

pub mod bind;
pub mod config;
pub mod entities;
pub mod error;
pub mod event;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod span;
pub mod tree;
pub mod value;

use std::io::Read;

pub use bind::{Binder, BoundRecord, FromRecord, Records};
pub use config::{BindOptions, DuplicatePolicy, ParseOptions};
pub use error::{DecodeError, Error, Result};
pub use event::{Attribute, StructEvent};
pub use lexer::{LexEvent, Lexer};
pub use parser::EventReader;
pub use schema::{decoders, FieldDecoder, FieldSource, FieldSpec, Registry, RegistryBuilder, Schema};
pub use span::{Location, Span};
pub use tree::{Document, Element, Node};
pub use value::{Decimal, FieldType, ParseDecimalError, Value};

/// Read all of `reader` and build a document tree.
pub fn parse_to_tree<R: Read>(reader: R) -> Result<Document> {
    Document::from_reader(reader)
}

/// Read all of `reader` and bind every record of `schema_id`.
///
/// Lexical and structural errors fail the whole call. Binding errors are
/// reported per record, in document order, alongside the records that
/// bound successfully.
pub fn parse_to_records<R: Read>(
    reader: R,
    registry: &Registry,
    schema_id: &str,
) -> Result<Vec<Result<BoundRecord>>> {
    parse_to_records_with(reader, registry, schema_id, BindOptions::default())
}

/// [`parse_to_records`] with explicit options.
pub fn parse_to_records_with<R: Read>(
    mut reader: R,
    registry: &Registry,
    schema_id: &str,
    options: BindOptions,
) -> Result<Vec<Result<BoundRecord>>> {
    let binder = Binder::new(registry, schema_id)?.with_options(options);
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut records = Vec::new();
    for record in binder.records(&input) {
        match record {
            Err(err) if !err.is_binding() => return Err(err),
            record => records.push(record),
        }
    }
    Ok(records)
}
