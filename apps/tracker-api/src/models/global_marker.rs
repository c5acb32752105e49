use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::global_markers;

/// The user has viewed everything up to `last_view`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = global_markers)]
pub struct GlobalMarker {
    pub user_id: String,
    pub last_view: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = global_markers)]
pub struct NewGlobalMarker<'a> {
    pub user_id: &'a str,
    pub last_view: DateTime<Utc>,
}
