use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use viewtracker_common::{InstanceId, ModelName, UserId};

use crate::db::store::{MarkerStore, Pruned};
use crate::error::TrackerError;
use crate::models::{GlobalMarker, InstanceMarker, ModelMarker, Tier};

type ModelKey = (String, String);
type InstanceKey = (String, String, String);

#[derive(Default)]
struct Markers {
    global: HashMap<String, DateTime<Utc>>,
    model: HashMap<ModelKey, DateTime<Utc>>,
    instance: HashMap<InstanceKey, DateTime<Utc>>,
}

/// In-memory marker store for tests and database-less runs.
///
/// A single lock covers all three tiers, so every upsert and its cascade
/// land together.
#[derive(Default)]
pub struct MemoryMarkerStore {
    inner: Mutex<Markers>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored markers across all tiers and users.
    pub fn len(&self) -> usize {
        let markers = self.inner.lock();
        markers.global.len() + markers.model.len() + markers.instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MarkerStore for MemoryMarkerStore {
    async fn upsert_global(
        &self,
        user_id: &UserId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(GlobalMarker, Pruned), TrackerError> {
        let mut markers = self.inner.lock();
        let user = user_id.as_str();

        markers.global.insert(user.to_string(), viewed_at);

        let models_before = markers.model.len();
        markers.model.retain(|(u, _), _| u != user);
        let instances_before = markers.instance.len();
        markers.instance.retain(|(u, _, _), _| u != user);

        let pruned = Pruned {
            model_markers: models_before - markers.model.len(),
            instance_markers: instances_before - markers.instance.len(),
        };

        Ok((
            GlobalMarker {
                user_id: user.to_string(),
                last_view: viewed_at,
            },
            pruned,
        ))
    }

    async fn upsert_model(
        &self,
        user_id: &UserId,
        model: &ModelName,
        viewed_at: DateTime<Utc>,
    ) -> Result<(ModelMarker, Pruned), TrackerError> {
        let mut markers = self.inner.lock();
        let (user, model) = (user_id.as_str(), model.as_str());

        markers
            .model
            .insert((user.to_string(), model.to_string()), viewed_at);

        let instances_before = markers.instance.len();
        markers
            .instance
            .retain(|(u, m, _), _| !(u == user && m == model));

        let pruned = Pruned {
            model_markers: 0,
            instance_markers: instances_before - markers.instance.len(),
        };

        Ok((
            ModelMarker {
                user_id: user.to_string(),
                model: model.to_string(),
                last_view: viewed_at,
            },
            pruned,
        ))
    }

    async fn upsert_instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
        viewed_at: DateTime<Utc>,
    ) -> Result<InstanceMarker, TrackerError> {
        let key = (
            user_id.as_str().to_string(),
            model.as_str().to_string(),
            instance_id.as_str().to_string(),
        );
        self.inner.lock().instance.insert(key.clone(), viewed_at);

        let (user_id, model, instance_id) = key;
        Ok(InstanceMarker {
            user_id,
            model,
            instance_id,
            last_view: viewed_at,
        })
    }

    async fn global(&self, user_id: &UserId) -> Result<Option<GlobalMarker>, TrackerError> {
        let markers = self.inner.lock();
        Ok(markers
            .global
            .get(user_id.as_str())
            .map(|last_view| GlobalMarker {
                user_id: user_id.as_str().to_string(),
                last_view: *last_view,
            }))
    }

    async fn model(
        &self,
        user_id: &UserId,
        model: &ModelName,
    ) -> Result<Option<ModelMarker>, TrackerError> {
        let key = (user_id.as_str().to_string(), model.as_str().to_string());
        let markers = self.inner.lock();
        Ok(markers.model.get(&key).map(|last_view| ModelMarker {
            user_id: key.0.clone(),
            model: key.1.clone(),
            last_view: *last_view,
        }))
    }

    async fn instance(
        &self,
        user_id: &UserId,
        model: &ModelName,
        instance_id: &InstanceId,
    ) -> Result<Option<InstanceMarker>, TrackerError> {
        let key = (
            user_id.as_str().to_string(),
            model.as_str().to_string(),
            instance_id.as_str().to_string(),
        );
        let markers = self.inner.lock();
        Ok(markers.instance.get(&key).map(|last_view| InstanceMarker {
            user_id: key.0.clone(),
            model: key.1.clone(),
            instance_id: key.2.clone(),
            last_view: *last_view,
        }))
    }

    async fn latest_view(
        &self,
        tier: Tier,
        user_id: &UserId,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Option<DateTime<Utc>>, TrackerError> {
        let markers = self.inner.lock();
        let user = user_id.as_str();

        let views: Vec<DateTime<Utc>> = match tier {
            Tier::Global => markers.global.get(user).copied().into_iter().collect(),
            Tier::Model => markers
                .model
                .iter()
                .filter(|((u, _), _)| u == user)
                .map(|(_, ts)| *ts)
                .collect(),
            Tier::Instance => markers
                .instance
                .iter()
                .filter(|((u, _, _), _)| u == user)
                .map(|(_, ts)| *ts)
                .collect(),
        };

        Ok(views
            .into_iter()
            .filter(|ts| newer_than.map_or(true, |after| *ts > after))
            .max())
    }
}
