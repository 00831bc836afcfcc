//! Schemas, field specs and the decoder registry.
//!
//! Registration happens on a [`RegistryBuilder`]; [`RegistryBuilder::freeze`]
//! turns it into an immutable [`Registry`] that is cheap to clone and safe to
//! share between threads. Nothing can be registered after the freeze.
//!
//! ```
//! use tagbind_core::schema::{decoders, FieldSpec, RegistryBuilder};
//! use tagbind_core::value::FieldType;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.define_schema(
//!     "book",
//!     vec![
//!         FieldSpec::new("id", FieldType::Integer).required(),
//!         FieldSpec::new("name", FieldType::Text).required(),
//!         FieldSpec::new("price", FieldType::Decimal).required(),
//!     ],
//! );
//! builder.register("book", "price", decoders::grouped_decimal);
//! let registry = builder.freeze();
//!
//! assert!(registry.lookup("book", "price").is_some());
//! assert!(registry.lookup("book", "id").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{DecodeError, Error, Result};
use crate::value::{FieldType, Value};

// ============================================================================
// Decoders
// ============================================================================

/// Converts a field's raw text into a [`Value`].
///
/// Implemented for any `Fn(&str) -> Result<Value, DecodeError>` that is
/// `Send + Sync`, so plain functions and closures work directly.
pub trait FieldDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> std::result::Result<Value, DecodeError>;
}

impl<F> FieldDecoder for F
where
    F: Fn(&str) -> std::result::Result<Value, DecodeError> + Send + Sync,
{
    #[inline]
    fn decode(&self, raw: &str) -> std::result::Result<Value, DecodeError> {
        self(raw)
    }
}

/// Ready-made decoders for common textual formats.
pub mod decoders {
    use crate::error::DecodeError;
    use crate::value::{Decimal, Value};

    /// Decimal with `,` grouping separators, e.g. `1,234.50`.
    pub fn grouped_decimal(raw: &str) -> Result<Value, DecodeError> {
        let digits: String = raw.trim().chars().filter(|&c| c != ',').collect();
        Ok(Value::Decimal(digits.parse::<Decimal>()?))
    }

    /// Integer with `,` grouping separators, e.g. `12,000`.
    pub fn grouped_integer(raw: &str) -> Result<Value, DecodeError> {
        let digits: String = raw.trim().chars().filter(|&c| c != ',').collect();
        Ok(Value::Integer(digits.parse()?))
    }

    /// Boolean from `yes`/`no` (any case) in addition to the default forms.
    pub fn yes_no(raw: &str) -> Result<Value, DecodeError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Ok(Value::Boolean(true)),
            "no" | "n" | "false" | "0" => Ok(Value::Boolean(false)),
            _ => Err(DecodeError::InvalidBoolean),
        }
    }
}

// ============================================================================
// FieldSpec / Schema
// ============================================================================

/// Where a field's raw text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Direct child element with this name.
    Element(String),
    /// Attribute with this name on the bound element.
    Attribute(String),
}

/// One field of a schema.
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    source: FieldSource,
    ty: FieldType,
    required: bool,
    decoder: Option<Arc<dyn FieldDecoder>>,
}

impl FieldSpec {
    /// Optional field read from the child element named `name`.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        FieldSpec {
            source: FieldSource::Element(name.clone()),
            name,
            ty,
            required: false,
            decoder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Read from a child element with a different name than the field.
    pub fn from_element(mut self, tag: impl Into<String>) -> Self {
        self.source = FieldSource::Element(tag.into());
        self
    }

    /// Read from an attribute of the bound element.
    pub fn from_attribute(mut self, attr: impl Into<String>) -> Self {
        self.source = FieldSource::Attribute(attr.into());
        self
    }

    /// Decoder to register for this field when the schema is defined.
    pub fn decoder(mut self, decoder: impl FieldDecoder + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &FieldSource {
        &self.source
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("ty", &self.ty)
            .field("required", &self.required)
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// A named set of fields bound from one record element.
#[derive(Debug, Clone)]
pub struct Schema {
    id: String,
    element: String,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Schema whose record element is named after `id`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Schema {
            element: id.clone(),
            id,
            fields: Vec::new(),
        }
    }

    /// Bind records from elements named `tag` instead of the schema id.
    pub fn element(mut self, tag: impl Into<String>) -> Self {
        self.element = tag.into();
        self
    }

    /// Add a field. A field with the same name is replaced in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(slot) => *slot = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn fields_from(self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        specs.into_iter().fold(self, Schema::field)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the record element.
    pub fn record_element(&self) -> &str {
        &self.element
    }

    /// Fields in definition order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// True when some element-sourced field reads children named `tag`.
    pub fn reads_element(&self, tag: &str) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(&f.source, FieldSource::Element(name) if name == tag))
    }
}

// ============================================================================
// Registry
// ============================================================================

type DecoderMap = HashMap<String, HashMap<String, Arc<dyn FieldDecoder>>>;

/// Mutable registration phase for a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    schemas: HashMap<String, Schema>,
    decoders: DecoderMap,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a schema from its fields, with the record element named `id`.
    pub fn define_schema(
        &mut self,
        id: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> &mut Self {
        self.define(Schema::new(id).fields_from(fields))
    }

    /// Define (or redefine) a schema.
    ///
    /// Decoders attached to its field specs are registered as if by
    /// [`register`](Self::register). Redefining an id replaces the schema
    /// together with every decoder registered for it so far; decoders
    /// registered after the redefinition apply as usual.
    pub fn define(&mut self, mut schema: Schema) -> &mut Self {
        tracing::debug!(
            schema = %schema.id,
            element = %schema.element,
            fields = schema.fields.len(),
            "schema defined"
        );
        if self.decoders.remove(&schema.id).is_some() {
            tracing::debug!(schema = %schema.id, "dropped decoders of previous definition");
        }
        for spec in &mut schema.fields {
            if let Some(decoder) = spec.decoder.take() {
                self.decoders
                    .entry(schema.id.clone())
                    .or_default()
                    .insert(spec.name.clone(), decoder);
            }
        }
        self.schemas.insert(schema.id.clone(), schema);
        self
    }

    /// Register a decoder for `(schema_id, field)`. The last registration wins.
    pub fn register(
        &mut self,
        schema_id: impl Into<String>,
        field: impl Into<String>,
        decoder: impl FieldDecoder + 'static,
    ) -> &mut Self {
        self.decoders
            .entry(schema_id.into())
            .or_default()
            .insert(field.into(), Arc::new(decoder));
        self
    }

    /// End the registration phase.
    pub fn freeze(self) -> Registry {
        tracing::debug!(
            schemas = self.schemas.len(),
            decoders = self.decoders.values().map(HashMap::len).sum::<usize>(),
            "registry frozen"
        );
        Registry {
            inner: Arc::new(Inner {
                schemas: self.schemas,
                decoders: self.decoders,
            }),
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

struct Inner {
    schemas: HashMap<String, Schema>,
    decoders: DecoderMap,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Frozen schemas and decoders. Clones share the same data.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up a schema by id.
    pub fn schema(&self, id: &str) -> Result<&Schema> {
        self.inner
            .schemas
            .get(id)
            .ok_or_else(|| Error::UnknownSchema(id.to_string()))
    }

    /// Decoder registered for `(schema_id, field)`, if any.
    pub fn lookup(&self, schema_id: &str, field: &str) -> Option<&dyn FieldDecoder> {
        self.inner
            .decoders
            .get(schema_id)?
            .get(field)
            .map(|decoder| decoder.as_ref())
    }

    /// Ids of all defined schemas, in no particular order.
    pub fn schema_ids(&self) -> impl Iterator<Item = &str> {
        self.inner.schemas.keys().map(String::as_str)
    }

    /// Install this registry as the process-wide one.
    ///
    /// Succeeds once; later calls hand the rejected registry back.
    pub fn install_global(self) -> std::result::Result<(), Registry> {
        GLOBAL.set(self)
    }

    /// The process-wide registry, if one was installed.
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("schemas", &self.inner.schemas.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
