//! Shared fixture entities for merge tests.

#![allow(dead_code)]

use carry_patch::{
    assign, Entity, EntitySchema, Error, FieldDef, FieldMut, FieldType, Result, Scalar,
    ScalarValue,
};
use chrono::{DateTime, Utc};
use std::sync::OnceLock;
use uuid::Uuid;

/// Installs a test-friendly tracing subscriber (controlled by `RUST_LOG`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Address: nested object, no identity
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<String>,
}

impl Address {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Address")
                .with_field(FieldDef::required("street", FieldType::String))
                .with_field(FieldDef::required("city", FieldType::String))
                .with_field(FieldDef::optional("zip", FieldType::String))
        })
    }

    pub fn new(street: &str, city: &str) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            zip: None,
        }
    }
}

impl Entity for Address {
    fn schema(&self) -> &'static EntitySchema {
        Address::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "street" => Some(self.street.to_scalar()),
            "city" => Some(self.city.to_scalar()),
            "zip" => Some(self.zip.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "street" => assign(&mut self.street, value),
            "city" => assign(&mut self.city, value),
            "zip" => assign(&mut self.zip, value),
            _ => Err(Error::missing_accessor("Address", field)),
        }
    }

    fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
        None
    }
}

// ============================================================================
// Item: keyed by a single integer id
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: i64,
    pub v: String,
    pub labels: Vec<String>,
}

impl Item {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Item")
                .with_field(FieldDef::required("id", FieldType::Int))
                .with_field(FieldDef::required("v", FieldType::String))
                .with_field(FieldDef::list("labels", FieldType::String))
                .with_key(["id"])
        })
    }

    pub fn new(id: i64, v: &str) -> Self {
        Self {
            id,
            v: v.into(),
            labels: Vec::new(),
        }
    }
}

impl Entity for Item {
    fn schema(&self) -> &'static EntitySchema {
        Item::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "id" => Some(self.id.to_scalar()),
            "v" => Some(self.v.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "id" => assign(&mut self.id, value),
            "v" => assign(&mut self.v, value),
            _ => Err(Error::missing_accessor("Item", field)),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "labels" => Some(FieldMut::List(&mut self.labels)),
            _ => None,
        }
    }
}

// ============================================================================
// Phone: collection item without identity
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phone {
    pub kind: String,
    pub number: String,
}

impl Phone {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Phone")
                .with_field(FieldDef::required("kind", FieldType::String))
                .with_field(FieldDef::required("number", FieldType::String))
        })
    }

    pub fn new(kind: &str, number: &str) -> Self {
        Self {
            kind: kind.into(),
            number: number.into(),
        }
    }
}

impl Entity for Phone {
    fn schema(&self) -> &'static EntitySchema {
        Phone::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "kind" => Some(self.kind.to_scalar()),
            "number" => Some(self.number.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "kind" => assign(&mut self.kind, value),
            "number" => assign(&mut self.number, value),
            _ => Err(Error::missing_accessor("Phone", field)),
        }
    }

    fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
        None
    }
}

// ============================================================================
// Person: the main target, one field of every shape
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub active: bool,
    pub rating: f64,
    pub joined: Option<DateTime<Utc>>,
    pub address: Option<Address>,
    pub nicknames: Vec<String>,
    pub scores: Vec<i64>,
    pub phones: Vec<Phone>,
    pub contacts: Vec<Option<Phone>>,
    pub items: Vec<Item>,
}

impl Person {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Person")
                .with_field(FieldDef::required("name", FieldType::String))
                .with_field(FieldDef::required("age", FieldType::Int))
                .with_field(FieldDef::optional("email", FieldType::String))
                .with_field(FieldDef::required("active", FieldType::Bool))
                .with_field(FieldDef::required("rating", FieldType::Float))
                .with_field(FieldDef::optional("joined", FieldType::Timestamp))
                .with_field(FieldDef::object("address", Address::schema))
                .with_field(FieldDef::list("nicknames", FieldType::String))
                .with_field(FieldDef::list("scores", FieldType::Int))
                .with_field(FieldDef::entities("phones", Phone::schema))
                .with_field(FieldDef::entities("contacts", Phone::schema).nullable())
                .with_field(FieldDef::entities("items", Item::schema))
        })
    }

    pub fn alice() -> Self {
        Self {
            name: "Alice".into(),
            age: 30,
            email: Some("alice@example.com".into()),
            active: true,
            rating: 4.5,
            ..Self::default()
        }
    }
}

impl Entity for Person {
    fn schema(&self) -> &'static EntitySchema {
        Person::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "name" => Some(self.name.to_scalar()),
            "age" => Some(self.age.to_scalar()),
            "email" => Some(self.email.to_scalar()),
            "active" => Some(self.active.to_scalar()),
            "rating" => Some(self.rating.to_scalar()),
            "joined" => Some(self.joined.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "name" => assign(&mut self.name, value),
            "age" => assign(&mut self.age, value),
            "email" => assign(&mut self.email, value),
            "active" => assign(&mut self.active, value),
            "rating" => assign(&mut self.rating, value),
            "joined" => assign(&mut self.joined, value),
            _ => Err(Error::missing_accessor("Person", field)),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "address" => Some(FieldMut::Object(&mut self.address)),
            "nicknames" => Some(FieldMut::List(&mut self.nicknames)),
            "scores" => Some(FieldMut::List(&mut self.scores)),
            "phones" => Some(FieldMut::Entities(&mut self.phones)),
            "contacts" => Some(FieldMut::Entities(&mut self.contacts)),
            "items" => Some(FieldMut::Entities(&mut self.items)),
            _ => None,
        }
    }
}

// ============================================================================
// Line: composite identity key
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub order: i64,
    pub sku: String,
    pub qty: i64,
}

impl Line {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Line")
                .with_field(FieldDef::required("order", FieldType::Int))
                .with_field(FieldDef::required("sku", FieldType::String))
                .with_field(FieldDef::required("qty", FieldType::Int))
                .with_key(["order", "sku"])
        })
    }

    pub fn new(order: i64, sku: &str, qty: i64) -> Self {
        Self {
            order,
            sku: sku.into(),
            qty,
        }
    }
}

impl Entity for Line {
    fn schema(&self) -> &'static EntitySchema {
        Line::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "order" => Some(self.order.to_scalar()),
            "sku" => Some(self.sku.to_scalar()),
            "qty" => Some(self.qty.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "order" => assign(&mut self.order, value),
            "sku" => assign(&mut self.sku, value),
            "qty" => assign(&mut self.qty, value),
            _ => Err(Error::missing_accessor("Line", field)),
        }
    }

    fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoice {
    pub number: String,
    pub lines: Vec<Line>,
}

impl Invoice {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Invoice")
                .with_field(FieldDef::required("number", FieldType::String))
                .with_field(FieldDef::entities("lines", Line::schema))
        })
    }
}

impl Entity for Invoice {
    fn schema(&self) -> &'static EntitySchema {
        Invoice::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "number" => Some(self.number.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "number" => assign(&mut self.number, value),
            _ => Err(Error::missing_accessor("Invoice", field)),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "lines" => Some(FieldMut::Entities(&mut self.lines)),
            _ => None,
        }
    }
}

// ============================================================================
// Category: self-referential, keyed by UUID
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub children: Vec<Category>,
}

impl Category {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Category")
                .with_field(FieldDef::required("id", FieldType::Uuid))
                .with_field(FieldDef::required("name", FieldType::String))
                .with_field(FieldDef::entities("children", Category::schema))
                .with_key(["id"])
        })
    }

    pub fn new(id: Uuid, name: &str) -> Self {
        Self {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }
}

impl Entity for Category {
    fn schema(&self) -> &'static EntitySchema {
        Category::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "id" => Some(self.id.to_scalar()),
            "name" => Some(self.name.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "id" => assign(&mut self.id, value),
            "name" => assign(&mut self.name, value),
            _ => Err(Error::missing_accessor("Category", field)),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "children" => Some(FieldMut::Entities(&mut self.children)),
            _ => None,
        }
    }
}

// ============================================================================
// Misconfigured entities
// ============================================================================

/// Declares fields its accessors do not handle, or handle with the wrong shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Broken {
    pub label: String,
    pub tags: Vec<String>,
}

impl Broken {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Broken")
                .with_field(FieldDef::required("label", FieldType::Int))
                .with_field(FieldDef::object("ghost", Address::schema))
                .with_field(FieldDef::entities("tags", Item::schema))
        })
    }
}

impl Entity for Broken {
    fn schema(&self) -> &'static EntitySchema {
        Broken::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "label" => Some(self.label.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "label" => assign(&mut self.label, value),
            _ => Err(Error::missing_accessor("Broken", field)),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "tags" => Some(FieldMut::List(&mut self.tags)),
            _ => None,
        }
    }
}

/// Keyed item declaring `note` without an accessor for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub id: i64,
}

impl Row {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Row")
                .with_field(FieldDef::required("id", FieldType::Int))
                .with_field(FieldDef::optional("note", FieldType::String))
                .with_key(["id"])
        })
    }
}

impl Entity for Row {
    fn schema(&self) -> &'static EntitySchema {
        Row::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "id" => Some(self.id.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "id" => assign(&mut self.id, value),
            _ => Err(Error::missing_accessor("Row", field)),
        }
    }

    fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
        None
    }
}

/// Unkeyed item declaring `note` without an accessor for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: i64,
}

impl Cell {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Cell")
                .with_field(FieldDef::required("value", FieldType::Int))
                .with_field(FieldDef::optional("note", FieldType::String))
        })
    }
}

impl Entity for Cell {
    fn schema(&self) -> &'static EntitySchema {
        Cell::schema()
    }

    fn get(&self, field: &str) -> Option<Scalar> {
        match field {
            "value" => Some(self.value.to_scalar()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: Scalar) -> Result<bool> {
        match field {
            "value" => assign(&mut self.value, value),
            _ => Err(Error::missing_accessor("Cell", field)),
        }
    }

    fn field_mut(&mut self, _field: &str) -> Option<FieldMut<'_>> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub rows: Vec<Row>,
    pub cells: Vec<Cell>,
}

impl Ledger {
    pub fn schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::new("Ledger")
                .with_field(FieldDef::entities("rows", Row::schema))
                .with_field(FieldDef::entities("cells", Cell::schema))
        })
    }
}

impl Entity for Ledger {
    fn schema(&self) -> &'static EntitySchema {
        Ledger::schema()
    }

    fn get(&self, _field: &str) -> Option<Scalar> {
        None
    }

    fn set(&mut self, field: &str, _value: Scalar) -> Result<bool> {
        Err(Error::missing_accessor("Ledger", field))
    }

    fn field_mut(&mut self, field: &str) -> Option<FieldMut<'_>> {
        match field {
            "rows" => Some(FieldMut::Entities(&mut self.rows)),
            "cells" => Some(FieldMut::Entities(&mut self.cells)),
            _ => None,
        }
    }
}
