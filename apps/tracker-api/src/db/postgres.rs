//! PostgreSQL marker store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel_async::AsyncConnection;
use scoped_futures::ScopedFutureExt;
use viewtracker_common::{InstanceId, ModelName, UserId};

use crate::db::pool::DbPool;
use crate::db::schema::{global_markers, instance_markers, model_markers};
use crate::db::store::{MarkerStore, Pruned};
use crate::error::TrackerError;
use crate::models::global_marker::NewGlobalMarker;
use crate::models::instance_marker::NewInstanceMarker;
use crate::models::model_marker::NewModelMarker;
use crate::models::{GlobalMarker, InstanceMarker, ModelMarker, Tier};

#[derive(Clone)]
pub struct PgMarkerStore {
    db: DbPool,
}

impl PgMarkerStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &DbPool {
        &self.db
    }
}

#[async_trait]
impl MarkerStore for PgMarkerStore {
    async fn upsert_global(
        &self,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(GlobalMarker, Pruned), TrackerError> {
        let mut conn = self.db.get().await?;
        let user_id = user_id.as_str();

        // Transaction: upsert global marker + drop every finer marker for the user.
        conn.transaction::<_, TrackerError, _>(|conn| {
            async move {
                let marker: GlobalMarker = diesel_async::RunQueryDsl::get_result(
                    diesel::insert_into(global_markers::table)
                        .values(NewGlobalMarker {
                            user_id,
                            last_view: viewed_at,
                        })
                        .on_conflict(global_markers::user_id)
                        .do_update()
                        .set(global_markers::last_view.eq(viewed_at))
                        .returning(GlobalMarker::as_returning()),
                    conn,
                )
                .await?;

                let model_markers = diesel_async::RunQueryDsl::execute(
                    diesel::delete(model_markers::table.filter(model_markers::user_id.eq(user_id))),
                    conn,
                )
                .await?;

                let instance_markers = diesel_async::RunQueryDsl::execute(
                    diesel::delete(
                        instance_markers::table.filter(instance_markers::user_id.eq(user_id)),
                    ),
                    conn,
                )
                .await?;

                Ok((
                    marker,
                    Pruned {
                        model_markers,
                        instance_markers,
                    },
                ))
            }
            .scope_boxed()
        })
        .await
    }

    async fn upsert_model(
        &self,
        user_id: &UserId,
        model: &ModelName,
        viewed_at: DateTime<Utc>,
    ) -> Result<(ModelMarker, Pruned), TrackerError> {
        let mut conn = self.db.get().await?;
        let user_id = user_id.as_str();
        let model = model.as_str();

        conn.transaction::<_, TrackerError, _>(|conn| {
            async move {
                let marker: ModelMarker = diesel_async::RunQueryDsl::get_result(
                    diesel::insert_into(model_markers::table)
                        .values(NewModelMarker {
                            user_id,
                            model,
                            last_view: viewed_at,
                        })
                        .on_conflict((model_markers::user_id, model_markers::model))
                        .do_update()
                        .set(model_markers::last_view.eq(viewed_at))
                        .returning(ModelMarker::as_returning()),
                    conn,
                )
                .await?;

                let instance_markers = diesel_async::RunQueryDsl::execute(
                    diesel::delete(
                        instance_markers::table
                            .filter(instance_markers::user_id.eq(user_id))
                            .filter(instance_markers::model.eq(model)),
                    ),
                    conn,
                )
                .await?;

                Ok((
                    marker,
                    Pruned {
                        model_markers: 0,
                        instance_markers,
                    },
                ))
            }
            .scope_boxed()
        })
        .await
    }

    async fn upsert_instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
        viewed_at: DateTime<Utc>,
    ) -> Result<InstanceMarker, TrackerError> {
        let mut conn = self.db.get().await?;

        let marker = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(instance_markers::table)
                .values(NewInstanceMarker {
                    user_id: user_id.as_str(),
                    model: model.as_str(),
                    instance_id: instance_id.as_str(),
                    last_view: viewed_at,
                })
                .on_conflict((
                    instance_markers::user_id,
                    instance_markers::model,
                    instance_markers::instance_id,
                ))
                .do_update()
                .set(instance_markers::last_view.eq(viewed_at))
                .returning(InstanceMarker::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(marker)
    }

    async fn global(&self, user_id: &UserId) -> Result<Option<GlobalMarker>, TrackerError> {
        let mut conn = self.db.get().await?;

        let marker = diesel_async::RunQueryDsl::get_result(
            global_markers::table
                .find(user_id.as_str())
                .select(GlobalMarker::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(marker)
    }

    async fn model(
        &self,
        user_id: &UserId,
        model: &ModelName,
    ) -> Result<Option<ModelMarker>, TrackerError> {
        let mut conn = self.db.get().await?;

        let marker = diesel_async::RunQueryDsl::get_result(
            model_markers::table
                .find((user_id.as_str(), model.as_str()))
                .select(ModelMarker::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(marker)
    }

    async fn instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
    ) -> Result<Option<InstanceMarker>, TrackerError> {
        let mut conn = self.db.get().await?;

        let marker = diesel_async::RunQueryDsl::get_result(
            instance_markers::table
                .find((user_id.as_str(), model.as_str(), instance_id.as_str()))
                .select(InstanceMarker::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(marker)
    }

    async fn latest_view(
        &self,
        tier: Tier,
        user_id: &UserId,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Option<DateTime<Utc>>, TrackerError> {
        let mut conn = self.db.get().await?;
        let user_id = user_id.as_str();

        let latest: Option<DateTime<Utc>> = match tier {
            Tier::Global => {
                let mut query = global_markers::table
                    .select(max(global_markers::last_view))
                    .filter(global_markers::user_id.eq(user_id))
                    .into_boxed();
                if let Some(after) = newer_than {
                    query = query.filter(global_markers::last_view.gt(after));
                }
                diesel_async::RunQueryDsl::get_result(query, &mut conn).await?
            }
            Tier::Model => {
                let mut query = model_markers::table
                    .select(max(model_markers::last_view))
                    .filter(model_markers::user_id.eq(user_id))
                    .into_boxed();
                if let Some(after) = newer_than {
                    query = query.filter(model_markers::last_view.gt(after));
                }
                diesel_async::RunQueryDsl::get_result(query, &mut conn).await?
            }
            Tier::Instance => {
                let mut query = instance_markers::table
                    .select(max(instance_markers::last_view))
                    .filter(instance_markers::user_id.eq(user_id))
                    .into_boxed();
                if let Some(after) = newer_than {
                    query = query.filter(instance_markers::last_view.gt(after));
                }
                diesel_async::RunQueryDsl::get_result(query, &mut conn).await?
            }
        };

        Ok(latest)
    }
}
