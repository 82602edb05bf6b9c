// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Moderation rules, dedup and rollups live in the domains and talk to the
// store through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseListingStore)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{ListingId, MemberId, TimeRange};
use crate::domains::engagement::models::{
    EngagementEvent, EventFilter, FavoriteFilter, NewEngagementEvent,
};
use crate::domains::listings::models::{
    Listing, ListingFilter, LocationGroup, NewListing, PropertyType, StatusUpdate,
};
use crate::domains::notifications::models::{NewNotification, Notification};

// =============================================================================
// Listing Store
// =============================================================================

#[async_trait]
pub trait BaseListingStore: Send + Sync {
    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing>;

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>>;

    /// Single-row write. None if the listing no longer exists.
    async fn update_listing_status(&self, update: &StatusUpdate) -> Result<Option<Listing>>;

    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64>;

    /// Group-by over `property_type`. Types without rows may be absent.
    async fn count_listings_by_type(&self, filter: &ListingFilter)
        -> Result<Vec<(PropertyType, u64)>>;

    /// Group-by over `location`, each group carrying its earliest `created_at`.
    async fn count_listings_by_location(&self, filter: &ListingFilter)
        -> Result<Vec<LocationGroup>>;
}

// =============================================================================
// Engagement Store
// =============================================================================

#[async_trait]
pub trait BaseEngagementStore: Send + Sync {
    async fn insert_event(&self, event: &NewEngagementEvent) -> Result<EngagementEvent>;

    async fn count_events(&self, filter: &EventFilter) -> Result<u64>;

    async fn favorite_exists(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool>;

    /// Idempotent insert backed by the unique `(listing_id, member_id)` key
    async fn upsert_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<()>;

    /// Returns true when a membership was removed
    async fn delete_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool>;

    async fn count_favorites(&self, filter: &FavoriteFilter) -> Result<u64>;
}

// =============================================================================
// Notification Store
// =============================================================================

#[async_trait]
pub trait BaseNotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification>;

    /// Newest first
    async fn list_notifications(&self, member_id: MemberId, limit: u32)
        -> Result<Vec<Notification>>;
}

// =============================================================================
// Member Directory (read-only view of the auth collaborator's accounts)
// =============================================================================

#[async_trait]
pub trait BaseMemberDirectory: Send + Sync {
    async fn count_members(&self, joined: TimeRange) -> Result<u64>;
}
