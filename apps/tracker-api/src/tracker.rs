//! Per-user view tracking.
//!
//! A [`Tracker`] answers "has this user seen this item since it last
//! changed?" from three marker tiers. Coarse writes prune the finer markers
//! they subsume, so a coarse hit is always conclusive and lookups go
//! coarsest first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use viewtracker_common::{
    Identity, InputError, InstanceId, LastUpdate, ModelRef, Trackable, UserId,
};

use crate::db::store::MarkerStore;
use crate::error::TrackerError;
use crate::models::Tier;

pub enum Tracker {
    User {
        user_id: UserId,
        store: Arc<dyn MarkerStore>,
    },
    /// No identity to key markers on: writes are no-ops and everything
    /// counts as viewed. Never touches the store.
    Anonymous,
}

impl Tracker {
    pub fn new(identity: Identity, store: Arc<dyn MarkerStore>) -> Self {
        match identity {
            Identity::User(user_id) => Tracker::User { user_id, store },
            Identity::Anonymous => Tracker::Anonymous,
        }
    }

    pub fn for_user(user_id: UserId, store: Arc<dyn MarkerStore>) -> Self {
        Tracker::User { user_id, store }
    }

    /// Mark everything as viewed.
    pub async fn mark_all_viewed(&self) -> Result<(), TrackerError> {
        let Tracker::User { user_id, store } = self else {
            return Ok(());
        };

        let (marker, pruned) = store.upsert_global(user_id, Utc::now()).await?;
        tracing::debug!(
            user_id = %user_id,
            last_view = %marker.last_view,
            pruned_models = pruned.model_markers,
            pruned_instances = pruned.instance_markers,
            "marked all viewed"
        );
        Ok(())
    }

    /// Mark every instance of a model as viewed.
    pub async fn mark_model_viewed<'a>(
        &self,
        model: impl Into<ModelRef<'a>>,
    ) -> Result<(), TrackerError> {
        let Tracker::User { user_id, store } = self else {
            return Ok(());
        };

        let model = model.into().normalize()?;
        let (marker, pruned) = store.upsert_model(user_id, &model, Utc::now()).await?;
        tracing::debug!(
            user_id = %user_id,
            model = %marker.model,
            last_view = %marker.last_view,
            pruned_instances = pruned.instance_markers,
            "marked model viewed"
        );
        Ok(())
    }

    pub async fn mark_instance_viewed<T: Trackable + ?Sized>(
        &self,
        instance: &T,
    ) -> Result<(), TrackerError> {
        let Tracker::User { user_id, store } = self else {
            return Ok(());
        };

        let model = ModelRef::of_item(instance).normalize()?;
        let instance_id = checked_instance_id(instance)?;
        let marker = store
            .upsert_instance(user_id, &model, &instance_id, Utc::now())
            .await?;
        tracing::debug!(
            user_id = %user_id,
            model = %marker.model,
            instance_id = %marker.instance_id,
            last_view = %marker.last_view,
            "marked instance viewed"
        );
        Ok(())
    }

    /// Whether the user has viewed `instance` since it was last updated.
    ///
    /// A tier counts when its marker's `last_view` is at or after the
    /// resolved `last_update`.
    pub async fn has_viewed<T: Trackable + ?Sized>(
        &self,
        instance: &T,
        last_update: LastUpdate<'_>,
    ) -> Result<bool, TrackerError> {
        let Tracker::User { user_id, store } = self else {
            return Ok(true);
        };

        let last_update = last_update.resolve(instance)?;
        let model = ModelRef::of_item(instance).normalize()?;
        let instance_id = checked_instance_id(instance)?;

        // Stage 1: everything viewed since the update.
        if let Some(marker) = store.global(user_id).await? {
            if marker.last_view >= last_update {
                return Ok(true);
            }
        }

        // Stage 2: the whole model viewed since the update.
        if let Some(marker) = store.model(user_id, &model).await? {
            if marker.last_view >= last_update {
                return Ok(true);
            }
        }

        // Stage 3: this instance viewed since the update.
        let viewed = store
            .instance(user_id, &model, &instance_id)
            .await?
            .is_some_and(|marker| marker.last_view >= last_update);

        Ok(viewed)
    }

    /// When the user last viewed anything, across all tiers. `None` when
    /// they have no markers at all.
    pub async fn last_activity(&self) -> Result<Option<DateTime<Utc>>, TrackerError> {
        let Tracker::User { user_id, store } = self else {
            return Ok(None);
        };

        let mut last_view = None;
        for tier in Tier::COARSEST_FIRST {
            if let Some(newer) = store.latest_view(tier, user_id, last_view).await? {
                last_view = Some(newer);
            }
        }
        Ok(last_view)
    }
}

fn checked_instance_id<T: Trackable + ?Sized>(instance: &T) -> Result<InstanceId, TrackerError> {
    let id = instance.instance_id();
    if id.as_str().is_empty() {
        return Err(InputError::InvalidInstanceId.into());
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use viewtracker_common::{FieldValue, Model};

    use super::*;
    use crate::db::memory::MemoryMarkerStore;

    struct Post {
        id: i64,
        modified: Option<DateTime<Utc>>,
        created: Option<DateTime<Utc>>,
    }

    impl Model for Post {
        const MODEL_NAME: &'static str = "Post";
    }

    impl Post {
        fn new(id: i64) -> Self {
            Self {
                id,
                modified: None,
                created: None,
            }
        }
    }

    impl Trackable for Post {
        fn model_name(&self) -> &str {
            Self::MODEL_NAME
        }

        fn instance_id(&self) -> InstanceId {
            self.id.into()
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "modified" => Some(self.modified.into()),
                "created" => Some(self.created.into()),
                _ => None,
            }
        }
    }

    struct Comment(i64);

    impl Trackable for Comment {
        fn model_name(&self) -> &str {
            "Comment"
        }

        fn instance_id(&self) -> InstanceId {
            self.0.into()
        }
    }

    fn setup() -> (Tracker, Arc<MemoryMarkerStore>) {
        let store = Arc::new(MemoryMarkerStore::new());
        let tracker = Tracker::for_user(UserId::new("usr_test").unwrap(), store.clone());
        (tracker, store)
    }

    #[tokio::test]
    async fn instance_marker_goes_stale_after_later_update() {
        let (tracker, _) = setup();
        let post = Post::new(5);
        let t = Utc::now() - Duration::seconds(1);

        assert!(!tracker.has_viewed(&post, LastUpdate::At(t)).await.unwrap());

        tracker.mark_instance_viewed(&post).await.unwrap();

        assert!(tracker.has_viewed(&post, LastUpdate::At(t)).await.unwrap());
        let later = Utc::now() + Duration::seconds(60);
        assert!(!tracker.has_viewed(&post, LastUpdate::At(later)).await.unwrap());
    }

    #[tokio::test]
    async fn model_marker_covers_unvisited_instances() {
        let (tracker, _) = setup();
        let t = Utc::now() - Duration::seconds(1);

        tracker.mark_model_viewed(ModelRef::of::<Post>()).await.unwrap();

        assert!(tracker.has_viewed(&Post::new(5), LastUpdate::At(t)).await.unwrap());
        assert!(tracker.has_viewed(&Post::new(6), LastUpdate::At(t)).await.unwrap());
        assert!(!tracker.has_viewed(&Comment(5), LastUpdate::At(t)).await.unwrap());
    }

    #[tokio::test]
    async fn global_marker_covers_every_model() {
        let (tracker, store) = setup();
        let t = Utc::now() - Duration::seconds(1);

        tracker.mark_instance_viewed(&Post::new(1)).await.unwrap();
        tracker.mark_model_viewed("Comment").await.unwrap();
        tracker.mark_all_viewed().await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(tracker.has_viewed(&Post::new(9), LastUpdate::At(t)).await.unwrap());
        assert!(tracker.has_viewed(&Comment(9), LastUpdate::At(t)).await.unwrap());
    }

    #[tokio::test]
    async fn coarse_tier_dominates_stale_fine_tier() {
        let (tracker, store) = setup();
        let user = UserId::new("usr_test").unwrap();
        let model = viewtracker_common::ModelName::new("Post").unwrap();
        let now = Utc::now();

        // A stale instance marker next to a fresh model marker; the store
        // would normally have pruned it.
        store.upsert_model(&user, &model, now).await.unwrap();
        store
            .upsert_instance(&user, &model, &InstanceId::from(5i64), now - Duration::days(1))
            .await
            .unwrap();

        let t = now - Duration::hours(1);
        assert!(tracker.has_viewed(&Post::new(5), LastUpdate::At(t)).await.unwrap());
    }

    #[tokio::test]
    async fn inferred_last_update_uses_modified_before_created() {
        let (tracker, _) = setup();
        let mut post = Post::new(5);

        tracker.mark_instance_viewed(&post).await.unwrap();

        post.created = Some(Utc::now() - Duration::days(1));
        post.modified = Some(Utc::now() + Duration::days(1));
        assert!(!tracker.has_viewed(&post, LastUpdate::Infer).await.unwrap());

        post.modified = None;
        assert!(tracker.has_viewed(&post, LastUpdate::Infer).await.unwrap());
    }

    #[tokio::test]
    async fn unresolvable_last_update_is_input_error() {
        let (tracker, _) = setup();

        let err = tracker
            .has_viewed(&Comment(1), LastUpdate::Infer)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Input(InputError::Unresolvable)));

        let err = tracker
            .has_viewed(&Post::new(1), LastUpdate::Field("published"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Input(InputError::MissingField(_))));
    }

    #[tokio::test]
    async fn invalid_model_name_is_rejected_before_any_write() {
        let (tracker, store) = setup();

        let err = tracker.mark_model_viewed("").await.unwrap_err();
        assert!(matches!(err, TrackerError::Input(InputError::InvalidModelName)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn repeated_marks_refresh_one_marker() {
        let (tracker, store) = setup();
        let user = UserId::new("usr_test").unwrap();

        tracker.mark_all_viewed().await.unwrap();
        let first = store.global(&user).await.unwrap().unwrap().last_view;
        tracker.mark_all_viewed().await.unwrap();
        let second = store.global(&user).await.unwrap().unwrap().last_view;

        assert_eq!(store.len(), 1);
        assert!(second >= first);
    }

    #[tokio::test]
    async fn last_activity_is_maximum_across_tiers() {
        let (tracker, store) = setup();
        let user = UserId::new("usr_test").unwrap();
        let model = viewtracker_common::ModelName::new("Post").unwrap();
        let now = Utc::now();

        assert_eq!(tracker.last_activity().await.unwrap(), None);

        store.upsert_global(&user, now - Duration::hours(2)).await.unwrap();
        store
            .upsert_model(&user, &model, now - Duration::hours(3))
            .await
            .unwrap();
        store
            .upsert_instance(&user, &model, &InstanceId::from(1i64), now)
            .await
            .unwrap();

        assert_eq!(tracker.last_activity().await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn last_activity_keeps_coarse_value_when_finer_is_older() {
        let (tracker, store) = setup();
        let user = UserId::new("usr_test").unwrap();
        let model = viewtracker_common::ModelName::new("Post").unwrap();
        let now = Utc::now();

        store.upsert_global(&user, now).await.unwrap();
        store
            .upsert_model(&user, &model, now - Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(tracker.last_activity().await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn anonymous_tracker_is_inert() {
        let store = Arc::new(MemoryMarkerStore::new());
        let tracker = Tracker::new(Identity::Anonymous, store.clone());

        tracker.mark_all_viewed().await.unwrap();
        tracker.mark_model_viewed("Post").await.unwrap();
        tracker.mark_instance_viewed(&Post::new(1)).await.unwrap();
        assert!(store.is_empty());

        // No last_update can be resolved off a Comment, yet the answer is still "viewed".
        assert!(tracker.has_viewed(&Comment(1), LastUpdate::Infer).await.unwrap());
        assert_eq!(tracker.last_activity().await.unwrap(), None);
    }
}
