//! Naming for content types and their instances.
//!
//! A tracker only ever sees items through [`Trackable`]: a canonical model
//! name, an instance id unique within that model, and optional named fields
//! from which a modification time can be read.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Width of the `model` column in every marker table.
pub const MAX_MODEL_NAME_LEN: usize = 256;

/// Canonical model name, e.g. a table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Result<Self, InputError> {
        let name = name.into();
        let len = name.chars().count();
        if name.trim().is_empty() || len > MAX_MODEL_NAME_LEN {
            return Err(InputError::InvalidModelName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one item within a model. Stored as text so integer and
/// string keys share a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Result<Self, InputError> {
        let id = id.into();
        if id.is_empty() {
            return Err(InputError::InvalidInstanceId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for InstanceId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for InstanceId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for InstanceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A content type known at compile time.
pub trait Model {
    const MODEL_NAME: &'static str;
}

/// Runtime handle on a [`Model`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    model_name: &'static str,
}

impl TypeDescriptor {
    pub fn of<M: Model + ?Sized>() -> Self {
        Self {
            model_name: M::MODEL_NAME,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model_name
    }
}

/// Anything that names a model: a type descriptor or a raw model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRef<'a> {
    Type(TypeDescriptor),
    Name(&'a str),
}

impl<'a> ModelRef<'a> {
    pub fn of<M: Model + ?Sized>() -> Self {
        ModelRef::Type(TypeDescriptor::of::<M>())
    }

    /// The model an item belongs to.
    pub fn of_item<T: Trackable + ?Sized>(item: &'a T) -> Self {
        ModelRef::Name(item.model_name())
    }

    pub fn normalize(&self) -> Result<ModelName, InputError> {
        match self {
            ModelRef::Type(descriptor) => ModelName::new(descriptor.model_name()),
            ModelRef::Name(name) => ModelName::new(*name),
        }
    }
}

impl<'a> From<&'a str> for ModelRef<'a> {
    fn from(name: &'a str) -> Self {
        ModelRef::Name(name)
    }
}

impl From<TypeDescriptor> for ModelRef<'_> {
    fn from(descriptor: TypeDescriptor) -> Self {
        ModelRef::Type(descriptor)
    }
}

/// Shape of a named field read off an item.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Timestamp(DateTime<Utc>),
    /// Zone-less timestamp, taken as UTC.
    Naive(NaiveDateTime),
    Text(String),
    Integer(i64),
    Null,
}

impl FieldValue {
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Naive(naive) => Some(naive.and_utc()),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Naive(_) => "naive timestamp",
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Null => "null",
        }
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(ts: Option<DateTime<Utc>>) -> Self {
        ts.map_or(FieldValue::Null, FieldValue::Timestamp)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(ts: NaiveDateTime) -> Self {
        FieldValue::Naive(ts)
    }
}

/// Content whose views can be tracked.
///
/// `field` exposes named attributes for `last_update` resolution. Computed
/// values are just accessors that compute when asked; return `None` for
/// names the item does not have.
pub trait Trackable {
    fn model_name(&self) -> &str;

    fn instance_id(&self) -> InstanceId;

    fn field(&self, _name: &str) -> Option<FieldValue> {
        None
    }
}

impl<T: Trackable + ?Sized> Trackable for &T {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn instance_id(&self) -> InstanceId {
        (**self).instance_id()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }
}
