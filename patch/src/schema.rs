//! Entity metadata.
//!
//! An [`EntitySchema`] tells the merge engine how the JSON properties of a
//! patch document map onto an entity's fields: which are scalars, which are
//! nested entities, which are collections, and which fields form the identity
//! key of an entity that lives inside a collection.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar types a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// UTC instant
    Timestamp,
    Uuid,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Bool => write!(f, "Bool"),
            FieldType::Timestamp => write!(f, "Timestamp"),
            FieldType::Uuid => write!(f, "Uuid"),
        }
    }
}

/// Lazily names the schema of a nested entity type.
///
/// A function rather than a reference so that types can refer to themselves
/// (a category holding child categories, for instance).
pub type SchemaFn = fn() -> &'static EntitySchema;

/// Shape of a field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// A single scalar value
    Scalar(FieldType),
    /// A single nested entity, possibly null
    Object(SchemaFn),
    /// A collection of scalars
    List(FieldType),
    /// A collection of nested entities
    Entities(SchemaFn),
}

impl FieldKind {
    /// Short human-readable name of the shape.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Scalar(_) => "scalar",
            FieldKind::Object(_) => "object",
            FieldKind::List(_) => "list",
            FieldKind::Entities(_) => "entity list",
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar(t) => f.debug_tuple("Scalar").field(t).finish(),
            FieldKind::Object(schema) => f.debug_tuple("Object").field(&schema().name).finish(),
            FieldKind::List(t) => f.debug_tuple("List").field(t).finish(),
            FieldKind::Entities(schema) => {
                f.debug_tuple("Entities").field(&schema().name).finish()
            }
        }
    }
}

/// Definition of a field in an entity.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as it appears in JSON
    pub name: String,
    /// Field shape
    pub kind: FieldKind,
    /// Whether JSON `null` is accepted. For lists this applies to the items.
    pub nullable: bool,
}

impl FieldDef {
    /// A scalar field that rejects `null`.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(field_type),
            nullable: false,
        }
    }

    /// A scalar field that accepts `null`.
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar(field_type),
            nullable: true,
        }
    }

    /// A nested entity field.
    pub fn object(name: impl Into<String>, schema: SchemaFn) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Object(schema),
            nullable: true,
        }
    }

    /// A collection of scalars.
    pub fn list(name: impl Into<String>, item_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::List(item_type),
            nullable: false,
        }
    }

    /// A collection of nested entities.
    pub fn entities(name: impl Into<String>, item_schema: SchemaFn) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Entities(item_schema),
            nullable: false,
        }
    }

    /// Accept `null` values (or `null` items, for collections).
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether the field is anything other than a single scalar.
    pub fn is_complex(&self) -> bool {
        !matches!(self.kind, FieldKind::Scalar(_))
    }

    /// Whether the field holds a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self.kind, FieldKind::List(_) | FieldKind::Entities(_))
    }
}

/// One field of an identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyField<'a> {
    pub name: &'a str,
    pub field_type: FieldType,
    pub nullable: bool,
}

/// Metadata for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Entity type name
    pub name: String,
    /// Field definitions, in declaration order
    pub fields: Vec<FieldDef>,
    /// Ordered identity key field names, if the type has an identity
    pub key: Option<Vec<String>>,
}

impl EntitySchema {
    /// Create a schema with no fields and no identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            key: None,
        }
    }

    /// Add a field to the schema.
    pub fn add_field(&mut self, field: FieldDef) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Builder-style method to add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.add_field(field);
        self
    }

    /// Declare the identity key used to match items inside collections.
    pub fn with_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Get a field by its exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a JSON property name to a field, ignoring ASCII case.
    ///
    /// An exact match wins over a case-folded one.
    pub fn resolve(&self, json_name: &str) -> Option<&FieldDef> {
        match_name(self.fields.iter().map(|f| (f.name.as_str(), f)), json_name)
    }

    /// Whether this type declares an identity key.
    pub fn has_identity(&self) -> bool {
        self.key.is_some()
    }

    /// The identity key fields in key order, or `None` without an identity.
    ///
    /// Every key field must be a declared scalar.
    pub fn key_fields(&self) -> Result<Option<Vec<KeyField<'_>>>> {
        let Some(names) = &self.key else {
            return Ok(None);
        };

        if names.is_empty() {
            return Err(Error::InvalidKey {
                entity: self.name.clone(),
                reason: "key has no fields".into(),
            });
        }

        names
            .iter()
            .map(|name| {
                let field = self.field(name).ok_or_else(|| Error::InvalidKey {
                    entity: self.name.clone(),
                    reason: format!("'{}' is not a field", name),
                })?;
                match field.kind {
                    FieldKind::Scalar(field_type) => Ok(KeyField {
                        name: &field.name,
                        field_type,
                        nullable: field.nullable,
                    }),
                    _ => Err(Error::InvalidKey {
                        entity: self.name.clone(),
                        reason: format!("'{}' is not a scalar field", name),
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// Pick the candidate whose name matches `name` ignoring ASCII case.
///
/// An exact match wins over a case-folded one; otherwise the first match wins.
pub(crate) fn match_name<'c, T>(
    candidates: impl IntoIterator<Item = (&'c str, T)>,
    name: &str,
) -> Option<T> {
    candidates
        .into_iter()
        .filter_map(|(candidate, item)| {
            if candidate == name {
                Some((0u8, item))
            } else if candidate.eq_ignore_ascii_case(name) {
                Some((1u8, item))
            } else {
                None
            }
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, item)| item)
}
