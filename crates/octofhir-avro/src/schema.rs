//! Avro schema model
//!
//! A small in-memory representation of the Avro types the compiler emits:
//! scalars, the decimal logical type, arrays, unions, and named records.
//! Records are reference-counted so a converter cached under one
//! fully-qualified name shares a single schema instance with every call site
//! that embeds it.
//!
//! [`AvroSchema::to_json`] emits the `.avsc` JSON form; a named record is
//! written out in full on first occurrence and by fully-qualified name after
//! that, per the Avro named-type rules.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Value, json};

/// An Avro type as laid out by the schema compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroSchema {
    Null,
    Boolean,
    Int,
    String,
    /// `bytes` annotated with the decimal logical type
    Decimal { precision: u32, scale: u32 },
    /// Repeated form of an element type
    Array(Box<AvroSchema>),
    /// Untagged union; the nullable wrapper produces `[T, null]`
    Union(Vec<AvroSchema>),
    /// Named record; identity for caching purposes is the full name
    Record(Arc<RecordSchema>),
}

impl AvroSchema {
    /// Build a record schema.
    pub fn record(record: RecordSchema) -> Self {
        Self::Record(Arc::new(record))
    }

    /// Build an array schema over the given element type.
    pub fn array(items: AvroSchema) -> Self {
        Self::Array(Box::new(items))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Emit the `.avsc` JSON form of this schema.
    pub fn to_json(&self) -> Value {
        let mut defined = HashSet::new();
        self.json_value(&mut defined)
    }

    fn json_value(&self, defined: &mut HashSet<String>) -> Value {
        match self {
            Self::Null => json!("null"),
            Self::Boolean => json!("boolean"),
            Self::Int => json!("int"),
            Self::String => json!("string"),
            Self::Decimal { precision, scale } => json!({
                "type": "bytes",
                "logicalType": "decimal",
                "precision": precision,
                "scale": scale,
            }),
            Self::Array(items) => json!({
                "type": "array",
                "items": items.json_value(defined),
            }),
            Self::Union(branches) => Value::Array(
                branches
                    .iter()
                    .map(|branch| branch.json_value(defined))
                    .collect(),
            ),
            Self::Record(record) => {
                let full_name = record.full_name();
                if !defined.insert(full_name.clone()) {
                    // Already written out; refer to it by name.
                    return json!(full_name);
                }
                let fields: Vec<Value> = record
                    .fields
                    .iter()
                    .map(|field| {
                        json!({
                            "name": field.name,
                            "doc": field.doc,
                            "type": field.schema.json_value(defined),
                            "default": Value::Null,
                        })
                    })
                    .collect();
                json!({
                    "type": "record",
                    "name": record.name,
                    "namespace": record.namespace,
                    "doc": record.doc,
                    "fields": fields,
                })
            }
        }
    }
}

/// A named Avro record: ordered fields plus documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub namespace: String,
    pub doc: String,
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// The record's fully-qualified name, `namespace + "." + name`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Position of a field by name, if present.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// One field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub doc: String,
    pub schema: AvroSchema,
}

/// Wrap a schema as an optional union of (schema, null) with a null default.
///
/// Applied uniformly to every generated record field: source values omit
/// optional elements freely, so the serialized record must tolerate partial
/// population without per-field decisions.
pub fn nullable(schema: AvroSchema) -> AvroSchema {
    AvroSchema::Union(vec![schema, AvroSchema::Null])
}
