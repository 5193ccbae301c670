//! Keyed collection reconciliation.
//!
//! Collections whose item type declares an identity key are not replaced
//! wholesale. Each element of the patch array is matched to an existing item
//! by key, so the caller only needs to send the items it wants to keep.
//!
//! # Algorithm
//!
//! 1. Extract the identity key from each element, coercing every key field to
//!    its declared type
//! 2. Merge the element into a copy of the matching item, or into a new
//!    default item when nothing matches
//! 3. Collect the results in document order
//! 4. If nothing changed and every existing item was referenced, keep the
//!    collection as it is; otherwise replace it with the collected items
//!
//! There is no explicit delete marker. An existing item missing from the
//! patch array is dropped, and the count mismatch is what reports the
//! collection as changed.
//!
//! Element errors (not an object, bad or missing key, a failed nested merge)
//! are reported per element and the remaining elements are still processed,
//! but the collection is then left exactly as it was.

use crate::{
    error::Result,
    merge::{check_type, unstage, Merger},
    outcome::{MergeStatus, Severity},
    scalar::{coerce, json_type_name},
    schema::match_name,
    Entity, EntityList, EntitySchema, Error, KeyField, Pointer, Scalar,
};
use serde_json::{Map, Value};
use std::fmt;

/// Identity key values, in key order.
#[derive(Debug, Clone, PartialEq)]
struct IdentityKey(Vec<Scalar>);

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            values => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reconciles one keyed collection against one patch array.
pub(crate) struct KeyedReconciler<'m, 'a> {
    merger: &'m mut Merger<'a>,
    schema: &'static EntitySchema,
    key: Vec<KeyField<'static>>,
}

impl<'m, 'a> KeyedReconciler<'m, 'a> {
    pub(crate) fn new(
        merger: &'m mut Merger<'a>,
        schema: &'static EntitySchema,
        key: Vec<KeyField<'static>>,
    ) -> Self {
        Self {
            merger,
            schema,
            key,
        }
    }

    pub(crate) fn reconcile(
        mut self,
        list: &mut dyn EntityList,
        elements: &[Value],
        path: &Pointer,
    ) -> Result<MergeStatus> {
        let original_len = list.len();

        // Null entries have no key and never match
        let existing = (0..original_len)
            .map(|index| list.item(index).map(|item| self.key_of(item)).transpose())
            .collect::<Result<Vec<_>>>()?;

        let mut seen: Vec<IdentityKey> = Vec::with_capacity(elements.len());
        let mut failed = false;
        let mut changed = false;

        for (index, element) in elements.iter().enumerate() {
            let element_path = path.index(index);

            let Value::Object(properties) = element else {
                self.merger.report(
                    &element_path,
                    Severity::Error,
                    format!(
                        "token malformed: expected Object, got {}",
                        json_type_name(element)
                    ),
                );
                failed = true;
                continue;
            };

            let Some(key) = self.extract_key(properties, &element_path) else {
                failed = true;
                continue;
            };

            if seen.contains(&key) {
                self.merger.report(
                    &element_path,
                    Severity::Error,
                    format!("duplicate identity key {}", key),
                );
                failed = true;
                continue;
            }

            let matched = existing.iter().position(|k| k.as_ref() == Some(&key));
            let item = match matched {
                Some(position) => list.push_copy(position),
                None => list.push_default(),
            };
            let merged = check_type(item, self.schema, &element_path)
                .and_then(|()| self.merger.merge_entity(element, item, &element_path));
            let merged = unstage(list, original_len, merged)?;
            tracing::trace!(
                path = %element_path,
                key = %key,
                created = matched.is_none(),
                status = ?merged,
                "reconciled item"
            );

            failed |= merged.is_error();
            changed |= matched.is_none() || merged.is_changed();
            seen.push(key);
        }

        if failed {
            list.truncate(original_len);
            return Ok(MergeStatus::Error);
        }

        if !changed && seen.len() == original_len {
            list.truncate(original_len);
            return Ok(MergeStatus::Unchanged);
        }

        tracing::debug!(
            path = %path,
            before = original_len,
            after = seen.len(),
            "keyed collection replaced"
        );
        list.remove_front(original_len);
        Ok(MergeStatus::Changed)
    }

    fn key_of(&self, item: &dyn Entity) -> Result<IdentityKey> {
        self.key
            .iter()
            .map(|field| {
                item.get(field.name)
                    .ok_or_else(|| Error::missing_accessor(&self.schema.name, field.name))
            })
            .collect::<Result<Vec<_>>>()
            .map(IdentityKey)
    }

    /// Read the key straight off the element, reporting every bad key field.
    fn extract_key(
        &mut self,
        properties: &Map<String, Value>,
        path: &Pointer,
    ) -> Option<IdentityKey> {
        let mut values = Vec::with_capacity(self.key.len());
        let mut complete = true;

        for field in &self.key {
            let Some((name, value)) = lookup(properties, field.name) else {
                self.merger.report(
                    path,
                    Severity::Error,
                    format!("missing identity key field '{}'", field.name),
                );
                complete = false;
                continue;
            };

            match coerce(value, field.field_type, field.nullable) {
                Ok(scalar) => values.push(scalar),
                Err(err) => {
                    self.merger.report(
                        &path.field(name),
                        Severity::Error,
                        format!("invalid identity key field '{}': {}", field.name, err),
                    );
                    complete = false;
                }
            }
        }

        complete.then(|| IdentityKey(values))
    }
}

fn lookup<'v>(properties: &'v Map<String, Value>, name: &str) -> Option<(&'v str, &'v Value)> {
    match_name(properties.iter().map(|(k, v)| (k.as_str(), (k.as_str(), v))), name)
}
