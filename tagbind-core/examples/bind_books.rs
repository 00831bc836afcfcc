//! Example: Bind book records onto a schema, with a custom price decoder.
//!
//! Run with: RUST_LOG=tagbind_core=debug cargo run --example bind_books

use tagbind_core::{
    decoders, parse_to_records, BoundRecord, Decimal, FieldSpec, FieldType, FromRecord,
    RegistryBuilder, Result, Schema,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Book {
    id: i64,
    name: String,
    price: Decimal,
    tags: Vec<String>,
}

impl FromRecord for Book {
    fn from_record(record: &BoundRecord) -> Result<Self> {
        Ok(Book {
            id: record.integer("id").unwrap_or_default(),
            name: record.required("name")?.to_string(),
            price: record.decimal("price").unwrap_or_default(),
            tags: record.list("tag").map(<[String]>::to_vec).unwrap_or_default(),
        })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = br#"<books>
  <book id="7">
    <name>Go</name>
    <price>1,234.50</price>
    <tag>systems</tag><tag>concurrency</tag>
  </book>
  <book id="8">
    <name>Missing a price</name>
  </book>
  <book id="9">
    <name>Rust</name>
    <price>39.95</price>
  </book>
</books>"#;

    let mut builder = RegistryBuilder::new();
    builder.define(
        Schema::new("book")
            .field(FieldSpec::new("id", FieldType::Integer).from_attribute("id").required())
            .field(FieldSpec::new("name", FieldType::Text).required())
            .field(
                FieldSpec::new("price", FieldType::Decimal)
                    .required()
                    .decoder(decoders::grouped_decimal),
            )
            .field(FieldSpec::new("tag", FieldType::TextList)),
    );
    let registry = builder.freeze();

    let records = parse_to_records(&input[..], &registry, "book").expect("document is well formed");
    for record in records {
        match record.and_then(|r| r.extract::<Book>()) {
            Ok(book) => println!("{:?}", book),
            Err(err) => println!("skipped: {}", err),
        }
    }
}
