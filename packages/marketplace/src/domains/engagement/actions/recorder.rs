use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::common::{ListingId, MarketplaceError, MarketplaceResult, MemberId, TimeRange};
use crate::domains::engagement::models::{
    EngagementEvent, EventFilter, FavoriteFilter, NewEngagementEvent,
};
use crate::domains::listings::actions::get_listing;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone)]
pub enum ViewOutcome {
    Recorded(EngagementEvent),
    /// This session already counted a view of the listing
    AlreadyTracked,
}

impl ViewOutcome {
    pub fn was_recorded(&self) -> bool {
        matches!(self, ViewOutcome::Recorded(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub is_favorite: bool,
}

type FavoriteKey = (ListingId, MemberId);
type ViewKey = (ListingId, String);

/// A `(listing, session)` slot in the tracked set.
///
/// Released on drop unless the view was stored, so an error or a cancelled
/// caller leaves the session free to count the view on retry.
struct ViewClaim<'a> {
    tracked: &'a DashSet<ViewKey>,
    key: Option<ViewKey>,
}

impl<'a> ViewClaim<'a> {
    fn take(tracked: &'a DashSet<ViewKey>, listing_id: ListingId, session_id: &str) -> Option<Self> {
        let key = (listing_id, session_id.to_string());
        if !tracked.insert(key.clone()) {
            return None;
        }
        Some(Self {
            tracked,
            key: Some(key),
        })
    }

    fn keep(mut self) {
        self.key = None;
    }
}

impl Drop for ViewClaim<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.tracked.remove(&key);
        }
    }
}

/// Records views and favorite toggles.
///
/// Holds the per-process session memory used to count at most one view per
/// `(listing, session)`. A member browsing from two sessions counts twice.
/// Favorite toggles are serialized per `(listing, member)` so a double click
/// can never insert twice or observe a half-applied toggle.
pub struct EngagementRecorder {
    deps: ServerDeps,
    tracked_views: DashSet<ViewKey>,
    favorite_locks: DashMap<FavoriteKey, Arc<Mutex<()>>>,
}

impl EngagementRecorder {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps,
            tracked_views: DashSet::new(),
            favorite_locks: DashMap::new(),
        }
    }

    pub async fn record_view(
        &self,
        listing_id: ListingId,
        session_id: &str,
        actor_id: Option<MemberId>,
    ) -> MarketplaceResult<ViewOutcome> {
        if session_id.trim().is_empty() {
            return Err(MarketplaceError::validation("a session id is required"));
        }
        get_listing(&self.deps, listing_id).await?;

        let Some(claim) = ViewClaim::take(&self.tracked_views, listing_id, session_id) else {
            debug!(listing_id = %listing_id, session_id, "View already tracked for session");
            return Ok(ViewOutcome::AlreadyTracked);
        };

        let event = NewEngagementEvent::view(listing_id, session_id, actor_id);
        let event = self.deps.store(self.deps.engagement.insert_event(&event)).await?;
        claim.keep();

        debug!(listing_id = %listing_id, session_id, "View recorded");
        Ok(ViewOutcome::Recorded(event))
    }

    pub async fn toggle_favorite(
        &self,
        listing_id: ListingId,
        actor_id: MemberId,
    ) -> MarketplaceResult<FavoriteToggle> {
        get_listing(&self.deps, listing_id).await?;

        let key = (listing_id, actor_id);
        let lock = self.favorite_locks.entry(key).or_default().clone();
        let guard = lock.lock().await;
        let result = self.apply_toggle(listing_id, actor_id).await;
        drop(guard);
        drop(lock);
        self.favorite_locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn apply_toggle(
        &self,
        listing_id: ListingId,
        actor_id: MemberId,
    ) -> MarketplaceResult<FavoriteToggle> {
        let engagement = &self.deps.engagement;

        let is_favorite = if self
            .deps
            .store(engagement.favorite_exists(listing_id, actor_id))
            .await?
        {
            self.deps
                .store(engagement.delete_favorite(listing_id, actor_id))
                .await?;
            false
        } else {
            self.deps
                .store(engagement.upsert_favorite(listing_id, actor_id))
                .await?;
            true
        };

        // The membership row is authoritative; the event is history only.
        let event = NewEngagementEvent::favorite(listing_id, actor_id, is_favorite);
        if let Err(err) = self.deps.store(engagement.insert_event(&event)).await {
            warn!(
                listing_id = %listing_id,
                actor_id = %actor_id,
                error = %err,
                "Favorite toggled but event was not recorded"
            );
        }

        info!(listing_id = %listing_id, actor_id = %actor_id, is_favorite, "Favorite toggled");
        Ok(FavoriteToggle { is_favorite })
    }

    pub async fn is_favorite(
        &self,
        listing_id: ListingId,
        actor_id: MemberId,
    ) -> MarketplaceResult<bool> {
        self.deps
            .store(self.deps.engagement.favorite_exists(listing_id, actor_id))
            .await
    }

    /// Views of a listing, optionally only those at or after `since`
    pub async fn count_views(
        &self,
        listing_id: ListingId,
        since: Option<DateTime<Utc>>,
    ) -> MarketplaceResult<u64> {
        get_listing(&self.deps, listing_id).await?;
        let filter = EventFilter::views()
            .for_listing(listing_id)
            .occurred_in(TimeRange {
                start: since,
                end: None,
            });
        self.deps
            .store(self.deps.engagement.count_events(&filter))
            .await
    }

    /// Current favorite memberships of a listing
    pub async fn count_favorites(&self, listing_id: ListingId) -> MarketplaceResult<u64> {
        get_listing(&self.deps, listing_id).await?;
        self.deps
            .store(
                self.deps
                    .engagement
                    .count_favorites(&FavoriteFilter::for_listing(listing_id)),
            )
            .await
    }

    /// Drop view memory for a session that has ended
    pub fn forget_session(&self, session_id: &str) {
        self.tracked_views.retain(|(_, tracked)| tracked != session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::listings::actions::create_listing;
    use crate::domains::listings::models::{ListingType, NewListing, PropertyType};
    use crate::kernel::TestDependencies;
    use rust_decimal::Decimal;
    use std::time::Duration;

    async fn setup() -> (TestDependencies, EngagementRecorder, ListingId) {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        let listing = create_listing(
            &deps,
            NewListing::builder()
                .owner_id(MemberId::new())
                .title("Studio")
                .property_type(PropertyType::Apartment)
                .listing_type(ListingType::Rent)
                .price(Decimal::from(650))
                .location("Coimbra")
                .build(),
        )
        .await
        .unwrap();
        (test_deps, EngagementRecorder::new(deps), listing.id)
    }

    #[tokio::test]
    async fn test_same_session_counts_once() {
        let (_deps, recorder, listing_id) = setup().await;

        for _ in 0..5 {
            recorder.record_view(listing_id, "session-a", None).await.unwrap();
        }

        assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_each_session_counts() {
        let (_deps, recorder, listing_id) = setup().await;
        let member = MemberId::new();

        for n in 0..4 {
            let outcome = recorder
                .record_view(listing_id, &format!("session-{}", n), Some(member))
                .await
                .unwrap();
            assert!(outcome.was_recorded());
        }

        assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_failed_insert_releases_session_claim() {
        let (test_deps, recorder, listing_id) = setup().await;

        test_deps.store.fail_events(true);
        assert!(recorder.record_view(listing_id, "s", None).await.is_err());

        test_deps.store.fail_events(false);
        let outcome = recorder.record_view(listing_id, "s", None).await.unwrap();
        assert!(outcome.was_recorded());
    }

    #[tokio::test]
    async fn test_cancelled_view_can_be_retried() {
        let (test_deps, recorder, listing_id) = setup().await;

        test_deps.store.set_event_latency(Some(Duration::from_millis(50)));
        let cancelled = tokio::time::timeout(
            Duration::from_millis(10),
            recorder.record_view(listing_id, "s", None),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(recorder.tracked_views.is_empty());

        test_deps.store.set_event_latency(None);
        let outcome = recorder.record_view(listing_id, "s", None).await.unwrap();
        assert!(outcome.was_recorded());
        assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_forgotten_session_counts_again() {
        let (_deps, recorder, listing_id) = setup().await;

        recorder.record_view(listing_id, "s", None).await.unwrap();
        recorder.forget_session("s");
        recorder.record_view(listing_id, "s", None).await.unwrap();

        assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_views_since_excludes_older_events() {
        let (_deps, recorder, listing_id) = setup().await;

        recorder.record_view(listing_id, "early", None).await.unwrap();
        let cutoff = Utc::now() + chrono::Duration::seconds(1);

        assert_eq!(recorder.count_views(listing_id, Some(cutoff)).await.unwrap(), 0);
        assert_eq!(recorder.count_views(listing_id, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_toggle_alternates() {
        let (test_deps, recorder, listing_id) = setup().await;
        let member = MemberId::new();

        assert!(recorder.toggle_favorite(listing_id, member).await.unwrap().is_favorite);
        assert!(!recorder.toggle_favorite(listing_id, member).await.unwrap().is_favorite);
        assert!(!recorder.is_favorite(listing_id, member).await.unwrap());
        assert!(recorder.toggle_favorite(listing_id, member).await.unwrap().is_favorite);

        assert_eq!(recorder.count_favorites(listing_id).await.unwrap(), 1);
        assert_eq!(test_deps.store.events().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_are_linearized() {
        let (_deps, recorder, listing_id) = setup().await;
        let recorder = Arc::new(recorder);
        let member = MemberId::new();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let recorder = recorder.clone();
                tokio::spawn(async move { recorder.toggle_favorite(listing_id, member).await })
            })
            .collect();

        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_favorite {
                added += 1;
            }
        }

        // Ten serialized toggles: five adds, five removes, ending absent.
        assert_eq!(added, 5);
        assert_eq!(recorder.count_favorites(listing_id).await.unwrap(), 0);
        assert!(recorder.favorite_locks.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_listing_is_not_found() {
        let (_deps, recorder, _) = setup().await;

        let err = recorder
            .record_view(ListingId::new(), "s", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::NotFound { .. }));

        let err = recorder
            .toggle_favorite(ListingId::new(), MemberId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::NotFound { .. }));
    }
}
