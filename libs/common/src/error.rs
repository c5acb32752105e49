/// Caller-supplied input that cannot be turned into a tracker query or write.
///
/// Always surfaced to the caller; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("model name must be between 1 and {max} characters", max = crate::model::MAX_MODEL_NAME_LEN)]
    InvalidModelName,

    #[error("instance id must not be empty")]
    InvalidInstanceId,

    #[error("user id must not be empty")]
    InvalidUserId,

    #[error("no field `{0}` was found on the instance")]
    MissingField(String),

    #[error("field `{field}` must be a timestamp, found {found}")]
    NotATimestamp { field: String, found: &'static str },

    #[error("no last_update was supplied and none of the conventional modification fields resolved")]
    Unresolvable,
}
