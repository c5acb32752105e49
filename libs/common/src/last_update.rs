use chrono::{DateTime, Utc};

use crate::error::InputError;
use crate::model::Trackable;

/// Conventional modification-time field names, tried in order when the
/// caller gives neither a value nor a field name.
pub const MODIFICATION_FIELD_NAMES: [&str; 6] = [
    "last_modified",
    "last_updated",
    "modified",
    "updated",
    "changed",
    "created",
];

/// How to find out when an item was last modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastUpdate<'a> {
    /// The caller already knows.
    At(DateTime<Utc>),
    /// Read this field off the item.
    Field(&'a str),
    /// Probe [`MODIFICATION_FIELD_NAMES`].
    #[default]
    Infer,
}

impl<'a> LastUpdate<'a> {
    pub fn resolve<T: Trackable + ?Sized>(&self, item: &T) -> Result<DateTime<Utc>, InputError> {
        match self {
            LastUpdate::At(ts) => Ok(*ts),
            LastUpdate::Field(name) => read_field(item, name),
            LastUpdate::Infer => MODIFICATION_FIELD_NAMES
                .iter()
                .find_map(|name| read_field(item, name).ok())
                .ok_or(InputError::Unresolvable),
        }
    }
}

impl From<DateTime<Utc>> for LastUpdate<'_> {
    fn from(ts: DateTime<Utc>) -> Self {
        LastUpdate::At(ts)
    }
}

impl From<Option<DateTime<Utc>>> for LastUpdate<'_> {
    fn from(ts: Option<DateTime<Utc>>) -> Self {
        ts.map_or(LastUpdate::Infer, LastUpdate::At)
    }
}

fn read_field<T: Trackable + ?Sized>(item: &T, name: &str) -> Result<DateTime<Utc>, InputError> {
    let value = item
        .field(name)
        .ok_or_else(|| InputError::MissingField(name.to_string()))?;
    value.as_timestamp().ok_or_else(|| InputError::NotATimestamp {
        field: name.to_string(),
        found: value.kind(),
    })
}
