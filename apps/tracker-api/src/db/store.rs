use async_trait::async_trait;
use chrono::{DateTime, Utc};
use viewtracker_common::{InstanceId, ModelName, UserId};

use crate::error::TrackerError;
use crate::models::{GlobalMarker, InstanceMarker, ModelMarker, Tier};

/// Finer-tier markers removed by a coarse write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pruned {
    pub model_markers: usize,
    pub instance_markers: usize,
}

/// Persistence for the three marker tiers.
///
/// Each upsert and the cascade it implies must commit atomically. Lookups
/// return `None` when no marker exists; that is never an error.
///
/// Backed by PostgreSQL in production and an in-memory map in tests.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// Upsert the user's global marker and drop all of their model and
    /// instance markers.
    async fn upsert_global(
        &self,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(GlobalMarker, Pruned), TrackerError>;

    /// Upsert a model marker and drop the user's instance markers for that model.
    async fn upsert_model(
        &self,
        user_id: &UserId,
        model: &ModelName,
        viewed_at: DateTime<Utc>,
    ) -> Result<(ModelMarker, Pruned), TrackerError>;

    async fn upsert_instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
        viewed_at: DateTime<Utc>,
    ) -> Result<InstanceMarker, TrackerError>;

    async fn global(&self, user_id: &UserId) -> Result<Option<GlobalMarker>, TrackerError>;

    async fn model(
        &self,
        user_id: &UserId,
        model: &ModelName,
    ) -> Result<Option<ModelMarker>, TrackerError>;

    async fn instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
    ) -> Result<Option<InstanceMarker>, TrackerError>;

    /// Most recent `last_view` in one tier for the user, restricted to values
    /// strictly after `newer_than` when given.
    async fn latest_view(
        &self,
        tier: Tier,
        user_id: &UserId,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Option<DateTime<Utc>>, TrackerError>;
}
