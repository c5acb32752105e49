use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::instance_markers;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = instance_markers)]
pub struct InstanceMarker {
    pub user_id: String,
    pub model: String,
    pub instance_id: String,
    pub last_view: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = instance_markers)]
pub struct NewInstanceMarker<'a> {
    pub user_id: &'a str,
    pub model: &'a str,
    pub instance_id: &'a str,
    pub last_view: DateTime<Utc>,
}
