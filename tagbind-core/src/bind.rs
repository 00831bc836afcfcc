//! Typed binding of record elements onto a schema.
//!
//! A record is an element named after the schema's record element that is
//! not nested inside another record. Its fields come from direct child
//! elements (raw text = all descendant text in document order) or from its
//! own attributes. Both the streaming path ([`Binder::records`]) and the
//! tree path ([`Binder::bind_tree`]) collect the same raw field text and
//! share one assembly step, so they agree on every input.
//!
//! A binding failure rejects only its record; the streaming iterator moves
//! on to the next one. Lexical and structural errors end the iteration.

use std::borrow::Cow;
use std::iter::FusedIterator;

use chrono::NaiveDate;

use crate::config::{BindOptions, DuplicatePolicy};
use crate::error::{Error, Result};
use crate::event::StructEvent;
use crate::parser::EventReader;
use crate::schema::{FieldSource, FieldSpec, Registry, Schema};
use crate::tree::{Document, Element};
use crate::value::{Decimal, Value};

// ============================================================================
// BoundRecord
// ============================================================================

/// Typed output of binding one record element.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRecord {
    schema: String,
    /// Field values in schema order.
    fields: Vec<(String, Value)>,
}

impl BoundRecord {
    /// Id of the schema this record was bound with.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Value of `field`, failing with `MissingRequiredField` when it is
    /// not in the schema or was absent from the input.
    pub fn required(&self, field: &str) -> Result<&Value> {
        match self.get(field) {
            Some(value) if !value.is_absent() => Ok(value),
            _ => Err(Error::MissingRequiredField {
                field: field.to_string(),
            }),
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field)?.as_integer()
    }

    pub fn decimal(&self, field: &str) -> Option<Decimal> {
        self.get(field)?.as_decimal()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_text()
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.get(field)?.as_bool()
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field)?.as_date()
    }

    pub fn list(&self, field: &str) -> Option<&[String]> {
        self.get(field)?.as_list()
    }

    /// `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a caller-defined type.
    pub fn extract<T: FromRecord>(&self) -> Result<T> {
        T::from_record(self)
    }
}

/// Conversion from a bound record into a caller-defined type.
///
/// ```
/// use tagbind_core::{BoundRecord, FromRecord, Result};
///
/// struct Book {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRecord for Book {
///     fn from_record(record: &BoundRecord) -> Result<Self> {
///         Ok(Book {
///             id: record.required("id")?.as_integer().unwrap_or_default(),
///             name: record.text("name").unwrap_or_default().to_string(),
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &BoundRecord) -> Result<Self>;
}

// ============================================================================
// Raw records
// ============================================================================

/// Text gathered for one record before any decoding.
#[derive(Debug, Default)]
struct RawRecord<'a> {
    attributes: Vec<(&'a str, Cow<'a, str>)>,
    /// Direct children as (name, descendant text), in document order.
    children: Vec<(&'a str, String)>,
}

impl<'a> RawRecord<'a> {
    fn from_element(element: &'a Element) -> Self {
        RawRecord {
            attributes: element
                .attributes()
                .iter()
                .map(|a| (a.name.as_str(), Cow::Borrowed(a.value.as_str())))
                .collect(),
            children: element
                .child_elements()
                .map(|child| (child.name(), child.text()))
                .collect(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_ref())
    }
}

/// Build a record from collected text. Shared by the streaming and tree paths.
fn assemble(
    registry: &Registry,
    schema: &Schema,
    options: &BindOptions,
    raw: &RawRecord<'_>,
) -> Result<BoundRecord> {
    if options.deny_unknown_fields {
        if let Some((name, _)) = raw.children.iter().find(|(name, _)| !schema.reads_element(name)) {
            return Err(Error::UnknownField {
                field: name.to_string(),
            });
        }
    }

    let mut fields = Vec::with_capacity(schema.fields().len());
    for spec in schema.fields() {
        let matches: Vec<&str> = match spec.source() {
            FieldSource::Attribute(attr) => raw.attribute(attr).into_iter().collect(),
            FieldSource::Element(tag) => raw
                .children
                .iter()
                .filter(|(name, _)| *name == tag.as_str())
                .map(|(_, text)| text.as_str())
                .collect(),
        };

        let value = if matches.is_empty() {
            if spec.is_required() {
                return Err(Error::MissingRequiredField {
                    field: spec.name().to_string(),
                });
            }
            spec.field_type().zero_value()
        } else if spec.field_type().is_list() {
            let mut items = Vec::with_capacity(matches.len());
            for text in matches {
                match decode(registry, schema, spec, text)? {
                    Value::List(more) => items.extend(more),
                    Value::Text(item) => items.push(item),
                    // A decoder may drop an item
                    Value::Absent => {}
                    other => items.push(other.to_string()),
                }
            }
            Value::List(items)
        } else {
            let text = match (matches.as_slice(), options.duplicates) {
                ([only], _) => *only,
                ([.., last], DuplicatePolicy::LastWins) => *last,
                _ => {
                    return Err(Error::DuplicateField {
                        field: spec.name().to_string(),
                    })
                }
            };
            decode(registry, schema, spec, text)?
        };
        fields.push((spec.name().to_string(), value));
    }

    Ok(BoundRecord {
        schema: schema.id().to_string(),
        fields,
    })
}

/// Registered decoder if there is one, else the type's default coercion.
fn decode(registry: &Registry, schema: &Schema, spec: &FieldSpec, raw: &str) -> Result<Value> {
    let decoded = match registry.lookup(schema.id(), spec.name()) {
        Some(decoder) => decoder.decode(raw),
        None => spec.field_type().coerce(raw),
    };
    decoded.map_err(|cause| Error::FieldDecodeError {
        field: spec.name().to_string(),
        raw_text: raw.to_string(),
        cause,
    })
}

fn log_outcome(schema: &Schema, outcome: &Result<BoundRecord>) {
    match outcome {
        Ok(record) => tracing::debug!(schema = schema.id(), fields = record.len(), "record bound"),
        Err(err) => tracing::debug!(schema = schema.id(), error = %err, "record rejected"),
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Binds records of one schema from documents.
#[derive(Debug, Clone)]
pub struct Binder<'r> {
    registry: &'r Registry,
    schema: &'r Schema,
    options: BindOptions,
}

impl<'r> Binder<'r> {
    /// Binder for `schema_id`, failing with `UnknownSchema` if undefined.
    pub fn new(registry: &'r Registry, schema_id: &str) -> Result<Self> {
        Ok(Binder {
            registry,
            schema: registry.schema(schema_id)?,
            options: BindOptions::default(),
        })
    }

    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &'r Schema {
        self.schema
    }

    /// Lazily bind records straight from parser events.
    pub fn records<'a>(&self, input: &'a [u8]) -> Records<'a, 'r> {
        Records {
            events: EventReader::with_options(input, self.options.parse),
            binder: self.clone(),
            current: None,
        }
    }

    /// Bind every record in a parsed document, in document order.
    pub fn bind_tree(&self, document: &Document) -> Vec<Result<BoundRecord>> {
        let mut found = Vec::new();
        self.collect_records(document.root(), &mut found);
        found
    }

    /// Bind one element as a record, whatever its name.
    pub fn bind_element(&self, element: &Element) -> Result<BoundRecord> {
        let outcome = assemble(
            self.registry,
            self.schema,
            &self.options,
            &RawRecord::from_element(element),
        );
        log_outcome(self.schema, &outcome);
        outcome
    }

    fn collect_records(&self, element: &Element, found: &mut Vec<Result<BoundRecord>>) {
        if element.name() == self.schema.record_element() {
            found.push(self.bind_element(element));
            return;
        }
        for child in element.child_elements() {
            self.collect_records(child, found);
        }
    }
}

// ============================================================================
// Streaming records
// ============================================================================

/// A record element being collected from events.
#[derive(Debug)]
struct Pending<'a> {
    raw: RawRecord<'a>,
    /// Depth relative to the record element, which is at 1.
    depth: usize,
    /// Direct child currently open, with its text so far.
    child: Option<(&'a str, String)>,
}

/// Iterator over records bound from parser events.
///
/// Holds at most one record's worth of collected text at a time.
#[derive(Debug)]
pub struct Records<'a, 'r> {
    events: EventReader<'a>,
    binder: Binder<'r>,
    current: Option<Pending<'a>>,
}

impl<'a> Records<'a, '_> {
    /// Feed one event; returns the finished record's raw text when its
    /// element closes.
    fn handle(&mut self, event: StructEvent<'a>) -> Option<RawRecord<'a>> {
        match event {
            StructEvent::ElementStart {
                name, attributes, ..
            } => {
                if let Some(pending) = self.current.as_mut() {
                    pending.depth += 1;
                    if pending.depth == 2 {
                        pending.child = Some((name, String::new()));
                    }
                } else if name == self.binder.schema.record_element() {
                    self.current = Some(Pending {
                        raw: RawRecord {
                            attributes: attributes.into_iter().map(|a| (a.name, a.value)).collect(),
                            children: Vec::new(),
                        },
                        depth: 1,
                        child: None,
                    });
                }
            }
            StructEvent::Characters { text, .. } => {
                if let Some((_, buf)) = self.current.as_mut().and_then(|p| p.child.as_mut()) {
                    buf.push_str(&text);
                }
            }
            StructEvent::ElementEnd { .. } => {
                let pending = self.current.as_mut()?;
                pending.depth -= 1;
                match pending.depth {
                    0 => return self.current.take().map(|p| p.raw),
                    1 => {
                        if let Some(child) = pending.child.take() {
                            pending.raw.children.push(child);
                        }
                    }
                    _ => {}
                }
            }
            StructEvent::DocumentStart | StructEvent::DocumentEnd => {}
        }
        None
    }
}

impl Iterator for Records<'_, '_> {
    type Item = Result<BoundRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = match self.events.next()? {
                Ok(event) => event,
                Err(err) => {
                    self.current = None;
                    return Some(Err(err));
                }
            };
            if let Some(raw) = self.handle(event) {
                let binder = &self.binder;
                let outcome = assemble(binder.registry, binder.schema, &binder.options, &raw);
                log_outcome(binder.schema, &outcome);
                return Some(outcome);
            }
        }
    }
}

// The event reader is fused, so the records iterator is too
impl FusedIterator for Records<'_, '_> {}
