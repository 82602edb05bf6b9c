use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::debug;

use crate::common::{MarketplaceResult, MemberId, TimeRange};
use crate::domains::analytics::buckets::price_buckets;
use crate::domains::analytics::models::{
    DeltaComparison, LocationCount, MonthlyPoint, OwnerSummary, PriceBucketCount, StatusCount,
    Totals, TypeShare, WindowedDeltas,
};
use crate::domains::analytics::window::{calendar_months, ReferenceWindow};
use crate::domains::engagement::models::{EventFilter, FavoriteFilter};
use crate::domains::listings::models::{ListingFilter, ListingStatus, PropertyType};
use crate::kernel::ServerDeps;

pub const DEFAULT_TOP_LOCATIONS: usize = 5;
pub const DEFAULT_MONTHS_BACK: u32 = 6;

/// Read-only dashboard queries.
///
/// Every operation issues a fixed number of filtered counts or group-bys;
/// nothing is cached and nothing is written.
#[derive(Clone)]
pub struct AggregationEngine {
    deps: ServerDeps,
}

impl AggregationEngine {
    pub fn new(deps: ServerDeps) -> Self {
        Self { deps }
    }

    pub async fn totals(&self) -> MarketplaceResult<Totals> {
        let deps = &self.deps;
        let all = ListingFilter::all();
        let active = ListingFilter::with_status(ListingStatus::Active);
        let featured = ListingFilter {
            featured: Some(true),
            ..ListingFilter::all()
        };
        let all_views = EventFilter::views();
        let memberships = FavoriteFilter::all();

        let (listings, active_listings, featured_listings, views, favorites, users) = tokio::try_join!(
            deps.store(deps.listings.count_listings(&all)),
            deps.store(deps.listings.count_listings(&active)),
            deps.store(deps.listings.count_listings(&featured)),
            deps.store(deps.engagement.count_events(&all_views)),
            deps.store(deps.engagement.count_favorites(&memberships)),
            deps.store(deps.members.count_members(TimeRange::default())),
        )?;

        Ok(Totals {
            listings,
            active_listings,
            featured_listings,
            views,
            favorites,
            users,
        })
    }

    pub async fn windowed_deltas(&self, window: &ReferenceWindow) -> MarketplaceResult<WindowedDeltas> {
        let deps = &self.deps;
        let range = window.range();
        let listings = ListingFilter::created_in(range);
        let views = EventFilter::views().occurred_in(range);
        let favorites = EventFilter::favorite_adds().occurred_in(range);

        let (new_listings, new_views, new_favorites, new_users) = tokio::try_join!(
            deps.store(deps.listings.count_listings(&listings)),
            deps.store(deps.engagement.count_events(&views)),
            deps.store(deps.engagement.count_events(&favorites)),
            deps.store(deps.members.count_members(range)),
        )?;

        debug!(
            start = %window.start(),
            end = %window.end(),
            new_listings,
            new_views,
            "Computed windowed deltas"
        );

        Ok(WindowedDeltas {
            new_listings,
            new_views,
            new_favorites,
            new_users,
        })
    }

    /// `window` against the adjacent window of equal length before it
    pub async fn compare_windows(&self, window: &ReferenceWindow) -> MarketplaceResult<DeltaComparison> {
        let previous = window.previous();
        let (current, before) = tokio::try_join!(
            self.windowed_deltas(window),
            self.windowed_deltas(&previous),
        )?;
        Ok(DeltaComparison::new(*window, current, before))
    }

    /// Share of each property type among listings in `status`.
    /// Types with no listings are left out.
    pub async fn distribution_by_type(
        &self,
        status: ListingStatus,
    ) -> MarketplaceResult<Vec<TypeShare>> {
        let groups = self
            .deps
            .store(
                self.deps
                    .listings
                    .count_listings_by_type(&ListingFilter::with_status(status)),
            )
            .await?;

        let total: u64 = groups.iter().map(|(_, count)| count).sum();
        let count_of = |property_type: PropertyType| {
            groups
                .iter()
                .find(|(t, _)| *t == property_type)
                .map_or(0, |(_, count)| *count)
        };

        Ok(PropertyType::ALL
            .iter()
            .map(|&property_type| (property_type, count_of(property_type)))
            .filter(|(_, count)| *count > 0)
            .map(|(property_type, count)| TypeShare {
                property_type,
                count,
                percent_of_total: (count as f64 / total as f64 * 100.0).round() as u32,
            })
            .collect())
    }

    /// Busiest locations, ties going to the location listed first
    pub async fn top_locations(&self, limit: usize) -> MarketplaceResult<Vec<LocationCount>> {
        let mut groups = self
            .deps
            .store(
                self.deps
                    .listings
                    .count_listings_by_location(&ListingFilter::all()),
            )
            .await?;

        groups.sort_by_key(|g| g.first_seen);
        groups.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(groups
            .into_iter()
            .take(limit)
            .map(|g| LocationCount {
                location: g.location,
                count: u64::try_from(g.count).unwrap_or(0),
            })
            .collect())
    }

    pub async fn price_distribution(&self) -> MarketplaceResult<Vec<PriceBucketCount>> {
        let deps = &self.deps;
        let buckets = price_buckets();

        let counts = try_join_all(buckets.iter().map(|bucket| {
            let filter = ListingFilter {
                listing_type: Some(bucket.listing_type),
                price: bucket.range,
                ..ListingFilter::all()
            };
            async move { deps.store(deps.listings.count_listings(&filter)).await }
        }))
        .await?;

        Ok(buckets
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(bucket, count)| PriceBucketCount {
                bucket_label: bucket.label.to_string(),
                count,
            })
            .collect())
    }

    pub async fn monthly_series(&self, months_back: u32) -> MarketplaceResult<Vec<MonthlyPoint>> {
        self.monthly_series_at(Utc::now(), months_back).await
    }

    /// One point per calendar month (UTC), oldest first, ending with the
    /// month containing `now`.
    pub async fn monthly_series_at(
        &self,
        now: DateTime<Utc>,
        months_back: u32,
    ) -> MarketplaceResult<Vec<MonthlyPoint>> {
        let deps = &self.deps;

        try_join_all(calendar_months(now, months_back).into_iter().map(|month| async move {
            let range = month.range();
            let listings = ListingFilter::created_in(range);
            let views = EventFilter::views().occurred_in(range);
            let (new_listings, new_users, new_views) = tokio::try_join!(
                deps.store(deps.listings.count_listings(&listings)),
                deps.store(deps.members.count_members(range)),
                deps.store(deps.engagement.count_events(&views)),
            )?;
            MarketplaceResult::Ok(MonthlyPoint {
                month_label: month.start().format("%b %Y").to_string(),
                new_listings,
                new_users,
                new_views,
            })
        }))
        .await
    }

    pub async fn owner_summary(&self, owner_id: MemberId) -> MarketplaceResult<OwnerSummary> {
        let deps = &self.deps;
        let owned = ListingFilter {
            owner_id: Some(owner_id),
            ..ListingFilter::all()
        };

        let by_status = try_join_all(ListingStatus::ALL.iter().map(|&status| {
            let filter = ListingFilter {
                status: Some(status),
                ..owned.clone()
            };
            async move {
                let count = deps.store(deps.listings.count_listings(&filter)).await?;
                MarketplaceResult::Ok(StatusCount { status, count })
            }
        }));

        let owned_views = EventFilter::views().for_owner(owner_id);
        let owned_favorites = FavoriteFilter::for_owner(owner_id);

        let (by_status, views, favorites) = tokio::try_join!(
            by_status,
            deps.store(deps.engagement.count_events(&owned_views)),
            deps.store(deps.engagement.count_favorites(&owned_favorites)),
        )?;

        Ok(OwnerSummary {
            owner_id,
            listings: by_status.iter().map(|s| s.count).sum(),
            by_status,
            views,
            favorites,
        })
    }
}
