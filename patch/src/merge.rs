//! The merge driver.
//!
//! Applies a partial JSON document onto an existing entity, updating only the
//! properties the document names.
//!
//! # Algorithm
//!
//! For each property of the document, in document order:
//!
//! 1. Resolve the name against the entity's schema (ignoring case). Unknown
//!    names produce a warning and are skipped.
//! 2. Scalars are coerced to their declared type and assigned.
//! 3. Nested objects are merged recursively, created first if null.
//! 4. Collections are replaced (scalar items, or entities without an identity)
//!    or reconciled item by item (entities with an identity key, see
//!    [`reconcile`](crate::reconcile)).
//!
//! # Failure modes
//!
//! A scalar that is malformed or cannot be coerced aborts the whole merge call
//! for that object, and nothing from that object is applied: scalars are
//! staged before any field is written. Errors inside nested objects and
//! collections are recorded and the remaining properties are still merged.

use crate::{
    error::Result,
    outcome::{Diagnostic, MergeOutcome, MergeStatus, Severity},
    reconcile::KeyedReconciler,
    scalar::{coerce, json_type_name},
    Entity, EntityList, EntitySchema, Error, FieldDef, FieldKind, FieldMut, FieldType,
    MergeConfig, ObjectSlot, Pointer, Scalar, ScalarList, SchemaFn,
};
use serde_json::Value;

/// A property that survived staging.
enum Step<'d> {
    Scalar { field: &'static FieldDef, value: Scalar, path: Pointer },
    Complex { field: &'static FieldDef, value: &'d Value, path: Pointer },
}

/// Applies patch documents to entities.
pub struct Merger<'a> {
    config: MergeConfig,
    sink: Option<Box<dyn FnMut(&Diagnostic) + 'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Merger<'a> {
    /// Create a merger with the given configuration.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            sink: None,
            diagnostics: Vec::new(),
        }
    }

    /// Call `sink` with every diagnostic as it is reported.
    pub fn with_sink(mut self, sink: impl FnMut(&Diagnostic) + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `document` into `target`.
    ///
    /// Validation problems in the document are reported through the returned
    /// [`MergeOutcome`]. `Err` is reserved for an entity whose accessors
    /// disagree with its schema; the target may then be partially updated.
    pub fn merge(&mut self, document: &Value, target: &mut dyn Entity) -> Result<MergeOutcome> {
        self.diagnostics.clear();
        let entity = &target.schema().name;

        let mut status = self.merge_entity(document, target, &Pointer::root())?;
        if self.config.force_changed && !status.is_error() {
            status = MergeStatus::Changed;
        }

        tracing::debug!(
            entity = %entity,
            status = ?status,
            diagnostics = self.diagnostics.len(),
            "merge finished"
        );

        Ok(MergeOutcome {
            status,
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    /// Parse `text` as JSON and merge it into `target`.
    ///
    /// Text that is not valid JSON is reported like any malformed document.
    pub fn merge_str(&mut self, text: &str, target: &mut dyn Entity) -> Result<MergeOutcome> {
        match serde_json::from_str::<Value>(text) {
            Ok(document) => self.merge(&document, target),
            Err(err) => {
                self.diagnostics.clear();
                self.report(
                    &Pointer::root(),
                    Severity::Error,
                    format!("document is malformed: {}", err),
                );
                Ok(MergeOutcome {
                    status: MergeStatus::Error,
                    diagnostics: std::mem::take(&mut self.diagnostics),
                })
            }
        }
    }

    /// Merge one JSON object into one entity.
    pub(crate) fn merge_entity(
        &mut self,
        document: &Value,
        target: &mut dyn Entity,
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let Value::Object(properties) = document else {
            return Ok(self.report(path, Severity::Error, "document is malformed"));
        };

        let schema = target.schema();
        let mut status = MergeStatus::Unchanged;
        let mut steps = Vec::with_capacity(properties.len());

        for (name, value) in properties {
            let property_path = path.field(name);
            let Some(field) = schema.resolve(name) else {
                let warned = self.report(
                    &property_path,
                    Severity::Warning,
                    format!("path not valid for entity '{}'", schema.name),
                );
                status = status.combine(warned);
                continue;
            };

            match field.kind {
                FieldKind::Scalar(field_type) => {
                    match self.stage_scalar(field, field_type, value, &property_path) {
                        Some(value) => steps.push(Step::Scalar {
                            field,
                            value,
                            path: property_path,
                        }),
                        // Abort the whole object; nothing has been written yet.
                        None => return Ok(MergeStatus::Error),
                    }
                }
                _ => steps.push(Step::Complex {
                    field,
                    value,
                    path: property_path,
                }),
            }
        }

        for step in steps {
            let merged = match step {
                Step::Scalar { field, value, path } => {
                    tracing::trace!(path = %path, "assign scalar");
                    MergeStatus::from_changed(target.set(&field.name, value)?)
                }
                Step::Complex { field, value, path } => {
                    tracing::trace!(path = %path, kind = field.kind.describe(), "merge complex");
                    self.merge_complex(schema, field, value, target, &path)?
                }
            };
            status = status.combine(merged);
        }

        Ok(status)
    }

    fn stage_scalar(
        &mut self,
        field: &FieldDef,
        field_type: FieldType,
        value: &Value,
        path: &Pointer,
    ) -> Option<Scalar> {
        if value.is_array() || value.is_object() {
            self.report(
                path,
                Severity::Error,
                format!(
                    "token malformed: expected {}, got {}",
                    field_type,
                    json_type_name(value)
                ),
            );
            return None;
        }

        match coerce(value, field_type, field.nullable) {
            Ok(scalar) => Some(scalar),
            Err(err) => {
                self.report(path, Severity::Error, format!("invalid value: {}", err));
                None
            }
        }
    }

    fn merge_complex(
        &mut self,
        schema: &EntitySchema,
        field: &FieldDef,
        value: &Value,
        target: &mut dyn Entity,
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let slot = target
            .field_mut(&field.name)
            .ok_or_else(|| Error::missing_accessor(&schema.name, &field.name))?;

        match (field.kind, slot) {
            (FieldKind::Object(expected), FieldMut::Object(slot)) => {
                self.merge_object(slot, expected, value, path)
            }
            (FieldKind::List(item_type), FieldMut::List(list)) => {
                self.merge_list(list, item_type, field.nullable, value, path)
            }
            (FieldKind::Entities(item_schema), FieldMut::Entities(list)) => {
                self.merge_entities(list, item_schema, value, path)
            }
            (kind, slot) => Err(Error::KindMismatch {
                entity: schema.name.clone(),
                field: field.name.clone(),
                expected: kind.describe().into(),
                actual: slot.describe().into(),
            }),
        }
    }

    fn merge_object(
        &mut self,
        slot: &mut dyn ObjectSlot,
        expected: SchemaFn,
        value: &Value,
        path: &Pointer,
    ) -> Result<MergeStatus> {
        match value {
            Value::Null => Ok(MergeStatus::from_changed(slot.clear())),
            Value::Object(_) => {
                let (entity, created) = slot.get_or_create();
                check_type(entity, expected(), path)?;
                let merged = self.merge_entity(value, entity, path)?;
                Ok(merged.combine(MergeStatus::from_changed(created)))
            }
            other => Ok(self.report(
                path,
                Severity::Error,
                format!("token malformed: expected Object, got {}", json_type_name(other)),
            )),
        }
    }

    fn merge_list(
        &mut self,
        list: &mut dyn ScalarList,
        item_type: FieldType,
        nullable: bool,
        value: &Value,
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let Some(elements) = self.expect_array(value, path) else {
            return Ok(MergeStatus::Error);
        };

        let mut items = Vec::with_capacity(elements.len());
        let mut failed = false;
        for (index, element) in elements.iter().enumerate() {
            match coerce(element, item_type, nullable) {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.report(
                        &path.index(index),
                        Severity::Error,
                        format!("invalid value: {}", err),
                    );
                    failed = true;
                }
            }
        }

        if failed {
            return Ok(MergeStatus::Error);
        }
        if list.items() == items {
            return Ok(MergeStatus::Unchanged);
        }

        list.replace(items)?;
        Ok(MergeStatus::Changed)
    }

    fn merge_entities(
        &mut self,
        list: &mut dyn EntityList,
        item_schema: SchemaFn,
        value: &Value,
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let Some(elements) = self.expect_array(value, path) else {
            return Ok(MergeStatus::Error);
        };

        let schema = item_schema();
        if elements.is_empty() {
            let had_items = !list.is_empty();
            list.truncate(0);
            return Ok(MergeStatus::from_changed(had_items));
        }

        match schema.key_fields()? {
            Some(key) => KeyedReconciler::new(self, schema, key).reconcile(list, elements, path),
            None => self.replace_entities(list, schema, elements, path),
        }
    }

    /// Rebuild a collection whose items have no identity.
    ///
    /// Without an identity there is no way to tell whether the new items equal
    /// the old ones, so a successful replacement always reports `Changed`.
    fn replace_entities(
        &mut self,
        list: &mut dyn EntityList,
        schema: &EntitySchema,
        elements: &[Value],
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let original_len = list.len();
        let mut failed = false;

        for (index, element) in elements.iter().enumerate() {
            let element_path = path.index(index);
            match element {
                Value::Null => {
                    if !list.push_null() {
                        self.report(&element_path, Severity::Error, "null items are not allowed");
                        failed = true;
                    }
                }
                Value::Object(_) => {
                    let item = list.push_default();
                    let merged = check_type(item, schema, &element_path)
                        .and_then(|()| self.merge_entity(element, item, &element_path));
                    if unstage(list, original_len, merged)?.is_error() {
                        failed = true;
                    }
                }
                other => {
                    self.report(
                        &element_path,
                        Severity::Error,
                        format!("token malformed: expected Object, got {}", json_type_name(other)),
                    );
                    failed = true;
                }
            }
        }

        if failed {
            list.truncate(original_len);
            return Ok(MergeStatus::Error);
        }

        list.remove_front(original_len);
        Ok(MergeStatus::Changed)
    }

    fn expect_array<'v>(&mut self, value: &'v Value, path: &Pointer) -> Option<&'v Vec<Value>> {
        match value {
            Value::Array(elements) => Some(elements),
            other => {
                self.report(
                    path,
                    Severity::Error,
                    format!("token malformed: expected Array, got {}", json_type_name(other)),
                );
                None
            }
        }
    }

    /// Record a diagnostic and return the status it implies.
    pub(crate) fn report(
        &mut self,
        path: &Pointer,
        severity: Severity,
        message: impl Into<String>,
    ) -> MergeStatus {
        let escalated = severity == Severity::Warning && self.config.treat_warnings_as_errors;
        let severity = if escalated { Severity::Error } else { severity };
        let diagnostic = Diagnostic {
            path: path.clone(),
            severity,
            message: message.into(),
        };

        if escalated {
            tracing::warn!(%diagnostic, "warning escalated to error");
        } else {
            tracing::debug!(%diagnostic, "merge diagnostic");
        }
        if let Some(sink) = self.sink.as_mut() {
            sink(&diagnostic);
        }
        self.diagnostics.push(diagnostic);

        match severity {
            Severity::Error => MergeStatus::Error,
            Severity::Warning => MergeStatus::Unchanged,
        }
    }
}

impl Default for Merger<'_> {
    fn default() -> Self {
        Self::new(MergeConfig::default())
    }
}

pub(crate) fn check_type(entity: &dyn Entity, expected: &EntitySchema, path: &Pointer) -> Result<()> {
    let actual = entity.schema();
    if actual.name == expected.name {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: path.to_string(),
            expected: expected.name.clone(),
            actual: actual.name.clone(),
        })
    }
}

/// Pass `result` through, dropping staged items first if it is a hard error.
pub(crate) fn unstage<T>(
    list: &mut dyn EntityList,
    original_len: usize,
    result: Result<T>,
) -> Result<T> {
    if result.is_err() {
        list.truncate(original_len);
    }
    result
}

/// Merge `document` into `target` with the default configuration.
pub fn merge(document: &Value, target: &mut dyn Entity) -> Result<MergeOutcome> {
    Merger::default().merge(document, target)
}

/// Parse `text` and merge it into `target`.
pub fn merge_str(text: &str, target: &mut dyn Entity, config: MergeConfig) -> Result<MergeOutcome> {
    Merger::new(config).merge_str(text, target)
}
