use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::model_markers;

/// The user has viewed every instance of `model` up to `last_view`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = model_markers)]
pub struct ModelMarker {
    pub user_id: String,
    pub model: String,
    pub last_view: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = model_markers)]
pub struct NewModelMarker<'a> {
    pub user_id: &'a str,
    pub model: &'a str,
    pub last_view: DateTime<Utc>,
}
