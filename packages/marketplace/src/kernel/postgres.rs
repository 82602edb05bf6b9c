// PgStore - Postgres implementation of the store traits
//
// Thin adapter: every query lives on the models, this only converts types.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{BaseEngagementStore, BaseListingStore, BaseMemberDirectory, BaseNotificationStore};
use crate::common::{ListingId, MemberId, TimeRange};
use crate::domains::engagement::models::{
    EngagementEvent, EventFilter, Favorite, FavoriteFilter, NewEngagementEvent,
};
use crate::domains::listings::models::{
    Listing, ListingFilter, LocationGroup, NewListing, PropertyType, StatusUpdate,
};
use crate::domains::member::Member;
use crate::domains::notifications::models::{NewNotification, Notification};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[async_trait]
impl BaseListingStore for PgStore {
    async fn insert_listing(&self, listing: &NewListing) -> Result<Listing> {
        Listing::create(listing, &self.pool).await
    }

    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>> {
        Listing::find_by_id_optional(id, &self.pool).await
    }

    async fn update_listing_status(&self, update: &StatusUpdate) -> Result<Option<Listing>> {
        Listing::update_status(update, &self.pool).await
    }

    async fn count_listings(&self, filter: &ListingFilter) -> Result<u64> {
        Listing::count_with_filter(filter, &self.pool)
            .await
            .map(to_count)
    }

    async fn count_listings_by_type(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<(PropertyType, u64)>> {
        let rows = Listing::count_by_property_type(filter, &self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(property_type, count)| (property_type, to_count(count)))
            .collect())
    }

    async fn count_listings_by_location(&self, filter: &ListingFilter) -> Result<Vec<LocationGroup>> {
        Listing::count_by_location(filter, &self.pool).await
    }
}

#[async_trait]
impl BaseEngagementStore for PgStore {
    async fn insert_event(&self, event: &NewEngagementEvent) -> Result<EngagementEvent> {
        EngagementEvent::insert(event, &self.pool).await
    }

    async fn count_events(&self, filter: &EventFilter) -> Result<u64> {
        EngagementEvent::count_with_filter(filter, &self.pool)
            .await
            .map(to_count)
    }

    async fn favorite_exists(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool> {
        Favorite::exists(listing_id, member_id, &self.pool).await
    }

    async fn upsert_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<()> {
        Favorite::upsert(listing_id, member_id, &self.pool).await
    }

    async fn delete_favorite(&self, listing_id: ListingId, member_id: MemberId) -> Result<bool> {
        Favorite::delete(listing_id, member_id, &self.pool).await
    }

    async fn count_favorites(&self, filter: &FavoriteFilter) -> Result<u64> {
        Favorite::count_with_filter(filter, &self.pool)
            .await
            .map(to_count)
    }
}

#[async_trait]
impl BaseNotificationStore for PgStore {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<Notification> {
        Notification::create(notification, &self.pool).await
    }

    async fn list_notifications(&self, member_id: MemberId, limit: u32) -> Result<Vec<Notification>> {
        Notification::find_for_member(member_id, i64::from(limit), &self.pool).await
    }
}

#[async_trait]
impl BaseMemberDirectory for PgStore {
    async fn count_members(&self, joined: TimeRange) -> Result<u64> {
        Member::count_joined(joined, &self.pool).await.map(to_count)
    }
}
