//! Entity capability traits.
//!
//! The merge engine never sees concrete entity types. It reads and writes
//! scalars through [`Entity`], and reaches nested objects and collections
//! through the slot traits returned by [`Entity::field_mut`]. Slot traits are
//! implemented here for the usual Rust containers (`Option<T>`, `Vec<T>`,
//! `Vec<Option<T>>`), so an entity implementation is mostly a `match` on
//! field names.
//!
//! ```rust
//! use carry_patch::{
//!     assign, Entity, EntitySchema, Error, FieldDef, FieldMut, FieldType, Result, Scalar,
//!     ScalarValue,
//! };
//! use std::sync::OnceLock;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Contact {
//!     name: String,
//!     phones: Vec<String>,
//! }
//!
//! impl Entity for Contact {
//!     fn schema(&self) -> &'static EntitySchema {
//!         static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             EntitySchema::new("Contact")
//!                 .with_field(FieldDef::required("name", FieldType::String))
//!                 .with_field(FieldDef::list("phones", FieldType::String))
//!         })
//!     }
//!
//!     fn get(&self, field: &str) -> Option<Scalar> {
//!         match field {
//!             "name" => Some(self.name.to_scalar()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
//!         match field {
//!             "name" => assign(&mut self.name, value),
//!             _ => Err(Error::missing_accessor("Contact", field)),
//!         }
//!     }
//!
//!     fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
//!         match field {
//!             "phones" => Some(FieldMut::List(&mut self.phones)),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use crate::{error::Result, EntitySchema, Scalar, ScalarValue};

/// A typed value the merge engine can patch in place.
pub trait Entity {
    /// Metadata for this entity's type.
    fn schema(&self) -> &'static EntitySchema;

    /// Read a scalar field. `None` when the entity has no such scalar.
    fn get(&self, field: &str) -> Option<Scalar>;

    /// Write a scalar field, returning whether its value changed.
    ///
    /// Implementations normally delegate to [`assign`].
    fn set(&mut self, field: &str, value: Scalar) -> Result<bool>;

    /// Access a complex (object or collection) field.
    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>>;
}

/// Mutable access to a complex field.
pub enum FieldMut<'a> {
    Object(&'a mut dyn ObjectSlot),
    List(&'a mut dyn ScalarList),
    Entities(&'a mut dyn EntityList),
}

impl FieldMut<'_> {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            FieldMut::Object(_) => "object",
            FieldMut::List(_) => "list",
            FieldMut::Entities(_) => "entity list",
        }
    }
}

/// Assign `value` to `field`, returning whether the field changed.
pub fn assign<T>(field: &mut T, value: Scalar) -> Result<bool>
where
    T: ScalarValue + PartialEq,
{
    let value = T::from_scalar(value)?;
    if *field == value {
        return Ok(false);
    }
    *field = value;
    Ok(true)
}

/// A nullable nested entity.
pub trait ObjectSlot {
    fn is_null(&self) -> bool;

    fn get(&self) -> Option<&dyn Entity>;

    /// Set to null, returning whether a value was removed.
    fn clear(&mut self) -> bool;

    /// The current entity, or a freshly attached default one.
    ///
    /// The flag is `true` when the entity was created by this call.
    fn get_or_create(&mut self) -> (&mut dyn Entity, bool);
}

impl<T: Entity + Default> ObjectSlot for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn get(&self) -> Option<&dyn Entity> {
        self.as_ref().map(|e| e as &dyn Entity)
    }

    fn clear(&mut self) -> bool {
        self.take().is_some()
    }

    fn get_or_create(&mut self) -> (&mut dyn Entity, bool) {
        let created = self.is_none();
        let entity: &mut dyn Entity = self.get_or_insert_with(T::default);
        (entity, created)
    }
}

/// A collection of scalars.
pub trait ScalarList {
    /// Current items, in order.
    fn items(&self) -> Vec<Scalar>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every item.
    fn replace(&mut self, items: Vec<Scalar>) -> Result<()>;
}

impl<T: ScalarValue> ScalarList for Vec<T> {
    fn items(&self) -> Vec<Scalar> {
        self.iter().map(ScalarValue::to_scalar).collect()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn replace(&mut self, items: Vec<Scalar>) -> Result<()> {
        *self = items
            .into_iter()
            .map(T::from_scalar)
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }
}

/// A collection of nested entities.
///
/// Merges stage new content by appending to the end of the collection, then
/// either drop the original prefix ([`remove_front`](EntityList::remove_front))
/// or roll back ([`truncate`](EntityList::truncate)).
pub trait EntityList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item at `index`; `None` when out of range or a null entry.
    fn item(&self, index: usize) -> Option<&dyn Entity>;

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Entity>;

    /// Append a default item and return it.
    fn push_default(&mut self) -> &mut dyn Entity;

    /// Append a copy of the item at `index` and return it. A null entry is
    /// copied as a default item.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn push_copy(&mut self, index: usize) -> &mut dyn Entity;

    /// Append a null entry. Returns `false` if the collection cannot hold one.
    fn push_null(&mut self) -> bool;

    fn truncate(&mut self, len: usize);

    /// Drop the first `count` entries.
    fn remove_front(&mut self, count: usize);
}

impl<T: Entity + Default + Clone> EntityList for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn Entity> {
        self.get(index).map(|e| e as &dyn Entity)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Entity> {
        self.get_mut(index).map(|e| e as &mut dyn Entity)
    }

    fn push_default(&mut self) -> &mut dyn Entity {
        let at = Vec::len(self);
        self.push(T::default());
        &mut self[at]
    }

    fn push_copy(&mut self, index: usize) -> &mut dyn Entity {
        let item = self[index].clone();
        let at = Vec::len(self);
        self.push(item);
        &mut self[at]
    }

    fn push_null(&mut self) -> bool {
        false
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn remove_front(&mut self, count: usize) {
        self.drain(..count.min(Vec::len(self)));
    }
}

impl<T: Entity + Default + Clone> EntityList for Vec<Option<T>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn Entity> {
        self.get(index)
            .and_then(Option::as_ref)
            .map(|e| e as &dyn Entity)
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Entity> {
        self.get_mut(index)
            .and_then(Option::as_mut)
            .map(|e| e as &mut dyn Entity)
    }

    fn push_default(&mut self) -> &mut dyn Entity {
        let at = Vec::len(self);
        self.push(None);
        self[at].insert(T::default())
    }

    fn push_copy(&mut self, index: usize) -> &mut dyn Entity {
        let item = self[index].clone().unwrap_or_default();
        let at = Vec::len(self);
        self.push(None);
        self[at].insert(item)
    }

    fn push_null(&mut self) -> bool {
        self.push(None);
        true
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn remove_front(&mut self, count: usize) {
        self.drain(..count.min(Vec::len(self)));
    }
}
