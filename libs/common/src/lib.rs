pub mod error;
pub mod identity;
pub mod last_update;
pub mod model;

pub use error::InputError;
pub use identity::{Identity, UserId};
pub use last_update::{LastUpdate, MODIFICATION_FIELD_NAMES};
pub use model::{FieldValue, InstanceId, Model, ModelName, ModelRef, Trackable, TypeDescriptor};
