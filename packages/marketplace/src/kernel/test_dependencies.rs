// TestDependencies - in-memory implementations for testing
//
// Provides an in-memory store that can stand in for Postgres in tests and
// local runs, plus knobs to backdate records and inject failures.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{
    BaseEngagementStore, BaseListingStore, BaseMemberDirectory, BaseNotificationStore, ServerDeps,
};
use crate::common::{EngagementEventId, ListingId, MemberId, NotificationId, TimeRange};
use crate::domains::engagement::models::{
    EngagementEvent, EventFilter, Favorite, FavoriteFilter, NewEngagementEvent,
};
use crate::domains::listings::models::{
    Listing, ListingFilter, ListingStatus, LocationGroup, NewListing, PropertyType, StatusUpdate,
};
use crate::domains::notifications::models::{NewNotification, Notification};

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct State {
    listings: Vec<Listing>,
    events: Vec<EngagementEvent>,
    favorites: Vec<Favorite>,
    notifications: Vec<Notification>,
    members: Vec<(MemberId, DateTime<Utc>)>,
}

impl State {
    fn owner_of(&self, listing_id: ListingId) -> Option<MemberId> {
        self.listings
            .iter()
            .find(|l| l.id == listing_id)
            .map(|l| l.owner_id)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_notifications: AtomicBool,
    fail_events: AtomicBool,
    latency: Mutex<Option<Duration>>,
    event_latency: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    async fn simulate_latency(&self) {
        Self::sleep_for(&self.latency).await;
    }

    async fn sleep_for(latency: &Mutex<Option<Duration>>) {
        let latency = latency.lock().ok().and_then(|l| *l);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Make every `insert_notification` fail
    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    /// Make every `insert_event` fail
    pub fn fail_events(&self, fail: bool) {
        self.fail_events.store(fail, Ordering::SeqCst);
    }

    /// Delay every listing lookup (exercises request deadlines)
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut current) = self.latency.lock() {
            *current = latency;
        }
    }

    /// Delay every `insert_event` before it is stored
    pub fn set_event_latency(&self, latency: Option<Duration>) {
        if let Ok(mut current) = self.event_latency.lock() {
            *current = latency;
        }
    }

    /// Insert a listing as if it had been created at `created_at`
    pub fn insert_listing_at(&self, input: &NewListing, created_at: DateTime<Utc>) -> Result<Listing> {
        let listing = Listing {
            id: ListingId::new(),
            owner_id: input.owner_id,
            title: input.title.clone(),
            property_type: input.property_type,
            listing_type: input.listing_type,
            price: input.price,
            location: input.location.clone(),
            status: ListingStatus::Pending,
            featured: input.featured,
            reviewed_by: None,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        };
        self.state()?.listings.push(listing.clone());
        Ok(listing)
    }

    /// Overwrite a listing's status without going through moderation
    pub fn force_status(&self, id: ListingId, status: ListingStatus) -> Result<()> {
        let mut state = self.state()?;
        let listing = state
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| anyhow!("listing {} not found", id))?;
        listing.status = status;
        Ok(())
    }

    /// Add a favorite membership created at `created_at`
    pub fn insert_favorite_at(
        &self,
        listing_id: ListingId,
        member_id: MemberId,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state()?;
        if !state
            .favorites
            .iter()
            .any(|f| f.listing_id == listing_id && f.member_id == member_id)
        {
            state.favorites.push(Favorite {
                listing_id,
                member_id,
                created_at,
            });
        }
        Ok(())
    }

    /// Register a member who joined at `joined_at`
    pub fn add_member(&self, joined_at: DateTime<Utc>) -> Result<MemberId> {
        let id = MemberId::new();
        self.state()?.members.push((id, joined_at));
        Ok(id)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state()
            .map(|s| s.notifications.clone())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<EngagementEvent> {
        self.state().map(|s| s.events.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BaseListingStore for InMemoryStore {
    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing> {
        self.insert_listing_at(listing, Utc::now())
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>> {
        self.simulate_latency().await;
        Ok(self.state()?.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn update_listing_status(&self, update: &StatusUpdate) -> Result<Option<Listing>> {
        let mut state = self.state()?;
        let Some(listing) = state.listings.iter_mut().find(|l| l.id == update.id) else {
            return Ok(None);
        };
        listing.status = update.status;
        listing.updated_at = update.updated_at;
        listing.reviewed_by = update.reviewed_by;
        listing.rejection_reason = update.rejection_reason.clone();
        Ok(Some(listing.clone()))
    }

    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64> {
        let state = self.state()?;
        Ok(state.listings.iter().filter(|l| filter.matches(l)).count() as u64)
    }

    async fn count_listings_by_type(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<(PropertyType, u64)>> {
        let state = self.state()?;
        let mut groups: Vec<(PropertyType, u64)> = Vec::new();
        for listing in state.listings.iter().filter(|l| filter.matches(l)) {
            match groups.iter_mut().find(|(t, _)| *t == listing.property_type) {
                Some((_, count)) => *count += 1,
                None => groups.push((listing.property_type, 1)),
            }
        }
        Ok(groups)
    }

    async fn count_listings_by_location(&self, filter: &ListingFilter) -> Result<Vec<LocationGroup>> {
        let state = self.state()?;
        let mut groups: Vec<LocationGroup> = Vec::new();
        for listing in state.listings.iter().filter(|l| filter.matches(l)) {
            match groups.iter_mut().find(|g| g.location == listing.location) {
                Some(group) => {
                    group.count += 1;
                    group.first_seen = group.first_seen.min(listing.created_at);
                }
                None => groups.push(LocationGroup {
                    location: listing.location.clone(),
                    count: 1,
                    first_seen: listing.created_at,
                }),
            }
        }
        groups.sort_by_key(|g| g.first_seen);
        Ok(groups)
    }
}

#[async_trait]
impl BaseEngagementStore for InMemoryStore {
    async fn insert_event(&self, event: &NewEngagementEvent) -> Result<EngagementEvent> {
        Self::sleep_for(&self.event_latency).await;
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(anyhow!("engagement_events insert failed"));
        }
        let event = EngagementEvent {
            id: EngagementEventId::new(),
            kind: event.kind,
            listing_id: event.listing_id,
            actor_id: event.actor_id,
            session_id: event.session_id.clone(),
            occurred_at: event.occurred_at,
        };
        self.state()?.events.push(event.clone());
        Ok(event)
    }

    async fn count_events(&self, filter: &EventFilter) -> Result<u64> {
        let state = self.state()?;
        Ok(state
            .events
            .iter()
            .filter(|e| filter.matches(e, state.owner_of(e.listing_id)))
            .count() as u64)
    }

    async fn favorite_exists(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool> {
        Ok(self
            .state()?
            .favorites
            .iter()
            .any(|f| f.listing_id == listing_id && f.member_id == member_id))
    }

    async fn upsert_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<()> {
        self.insert_favorite_at(listing_id, member_id, Utc::now())
    }

    async fn delete_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool> {
        let mut state = self.state()?;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.listing_id == listing_id && f.member_id == member_id));
        Ok(state.favorites.len() < before)
    }

    async fn count_favorites(&self, filter: &FavoriteFilter) -> Result<u64> {
        let state = self.state()?;
        Ok(state
            .favorites
            .iter()
            .filter(|f| filter.matches(f, state.owner_of(f.listing_id)))
            .count() as u64)
    }
}

#[async_trait]
impl BaseNotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(anyhow!("notifications insert failed"));
        }
        let notification = Notification {
            id: NotificationId::new(),
            member_id: notification.member_id,
            listing_id: notification.listing_id,
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            message: notification.message.clone(),
            created_at: Utc::now(),
        };
        self.state()?.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, member_id: MemberId, limit: u32) -> Result<Vec<Notification>> {
        let state = self.state()?;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.member_id == member_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseMemberDirectory for InMemoryStore {
    async fn count_members(&self, joined: TimeRange) -> Result<u64> {
        let state = self.state()?;
        Ok(state
            .members
            .iter()
            .filter(|(_, joined_at)| joined.contains(*joined_at))
            .count() as u64)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<InMemoryStore>,
    pub store_timeout: Option<Duration>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            store_timeout: None,
        }
    }

    /// Apply a deadline to every store call
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        let mut deps = ServerDeps::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        );
        deps.store_timeout = self.store_timeout;
        deps
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
