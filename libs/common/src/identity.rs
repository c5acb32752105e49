use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Opaque user key supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Surrounding whitespace is stripped, matching [`Identity::from_header`].
    pub fn new(id: impl Into<String>) -> Result<Self, InputError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(InputError::InvalidUserId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is asking. Anonymous callers have nothing to key markers on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(UserId),
    Anonymous,
}

impl Identity {
    /// Map a raw identity value (e.g. a header forwarded by the identity
    /// provider) to an identity. Absent or blank values are anonymous.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Identity::User(UserId(v.to_string())),
            _ => Identity::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(id) => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

impl From<UserId> for Identity {
    fn from(id: UserId) -> Self {
        Identity::User(id)
    }
}
