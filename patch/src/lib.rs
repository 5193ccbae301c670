//! # Carry Patch
//!
//! A merge-patch engine for typed, in-memory entities.
//!
//! Given an existing entity and a partial JSON document, the engine updates
//! only the properties the document names and reports whether anything
//! actually changed. Nested objects are merged recursively, and collections
//! of entities with an identity key are reconciled item by item: new items
//! are created, matching items are merged, and items missing from the patch
//! are removed.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine only walks values handed to it
//! - **Typed targets**: Entities are ordinary Rust structs behind the [`Entity`] trait
//! - **Tri-state results**: Every merge is `Error`, `Changed` or `Unchanged`
//! - **Diagnostics, not panics**: Bad documents produce located messages
//!
//! ## Core Concepts
//!
//! ### Schemas
//!
//! An [`EntitySchema`] lists an entity type's fields and, for types that live
//! in collections, its identity key. Property names are matched ignoring case.
//!
//! ### Outcomes
//!
//! A merge returns a [`MergeOutcome`]: a [`MergeStatus`] plus every
//! [`Diagnostic`] reported, each located by a JSON [`Pointer`].
//! [`MergeOutcome::into_result`] turns a failed merge into a serializable
//! [`ValidationReport`].
//!
//! ## Quick Start
//!
//! ```rust
//! use carry_patch::{
//!     assign, merge, Entity, EntitySchema, Error, FieldDef, FieldMut, FieldType, MergeStatus,
//!     Result, Scalar, ScalarValue,
//! };
//! use serde_json::json;
//! use std::sync::OnceLock;
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     name: String,
//!     age: Option<i64>,
//! }
//!
//! impl Entity for User {
//!     fn schema(&self) -> &'static EntitySchema {
//!         static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             EntitySchema::new("User")
//!                 .with_field(FieldDef::required("name", FieldType::String))
//!                 .with_field(FieldDef::optional("age", FieldType::Int))
//!         })
//!     }
//!
//!     fn get(&self, field: &str) -> Option<Scalar> {
//!         match field {
//!             "name" => Some(self.name.to_scalar()),
//!             "age" => Some(self.age.to_scalar()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
//!         match field {
//!             "name" => assign(&mut self.name, value),
//!             "age" => assign(&mut self.age, value),
//!             _ => Err(Error::missing_accessor("User", field)),
//!         }
//!     }
//!
//!     fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
//!         None
//!     }
//! }
//!
//! let mut user = User { name: "Alice".into(), age: None };
//!
//! let outcome = merge(&json!({"age": 30}), &mut user).unwrap();
//! assert_eq!(outcome.status, MergeStatus::Changed);
//! assert_eq!(user.age, Some(30));
//!
//! // Applying the same document again changes nothing
//! let outcome = merge(&json!({"age": 30}), &mut user).unwrap();
//! assert_eq!(outcome.status, MergeStatus::Unchanged);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod merge;
pub mod outcome;
pub mod pointer;
pub mod reconcile;
pub mod scalar;
pub mod schema;

// Re-export main types at crate root
pub use config::{ConfigError, MergeConfig};
pub use entity::{assign, Entity, EntityList, FieldMut, ObjectSlot, ScalarList};
pub use error::{Error, Result};
pub use merge::{merge, merge_str, Merger};
pub use outcome::{Diagnostic, MergeOutcome, MergeStatus, Severity, ValidationReport};
pub use pointer::Pointer;
pub use scalar::{coerce, CoerceError, Scalar, ScalarValue};
pub use schema::{EntitySchema, FieldDef, FieldKind, FieldType, KeyField, SchemaFn};
