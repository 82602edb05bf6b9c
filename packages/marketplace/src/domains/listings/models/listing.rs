use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;

use crate::common::{ListingId, MarketplaceError, MemberId, TimeRange};

/// Listing - a property offered for sale or rent
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: MemberId,

    // Content
    pub title: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub price: Decimal,
    pub location: String,

    // Moderation
    pub status: ListingStatus,
    pub featured: bool,
    pub reviewed_by: Option<MemberId>,
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Enums for type-safe edges
// =============================================================================

/// Moderation status. See `machines` for the allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Active,
    Inactive,
    Rejected,
    Sold,
    Rented,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 6] = [
        ListingStatus::Pending,
        ListingStatus::Active,
        ListingStatus::Inactive,
        ListingStatus::Rejected,
        ListingStatus::Sold,
        ListingStatus::Rented,
    ];
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Pending => write!(f, "pending"),
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::Inactive => write!(f, "inactive"),
            ListingStatus::Rejected => write!(f, "rejected"),
            ListingStatus::Sold => write!(f, "sold"),
            ListingStatus::Rented => write!(f, "rented"),
        }
    }
}

impl std::str::FromStr for ListingStatus {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ListingStatus::Pending),
            "active" => Ok(ListingStatus::Active),
            "inactive" => Ok(ListingStatus::Inactive),
            "rejected" => Ok(ListingStatus::Rejected),
            "sold" => Ok(ListingStatus::Sold),
            "rented" => Ok(ListingStatus::Rented),
            _ => Err(MarketplaceError::validation(format!(
                "Invalid listing status: {}",
                s
            ))),
        }
    }
}

/// Property type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Land,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Commercial,
    ];
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Apartment => write!(f, "apartment"),
            PropertyType::House => write!(f, "house"),
            PropertyType::Land => write!(f, "land"),
            PropertyType::Commercial => write!(f, "commercial"),
        }
    }
}

impl std::str::FromStr for PropertyType {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" => Ok(PropertyType::Apartment),
            "house" => Ok(PropertyType::House),
            "land" => Ok(PropertyType::Land),
            "commercial" => Ok(PropertyType::Commercial),
            _ => Err(MarketplaceError::validation(format!(
                "Invalid property type: {}",
                s
            ))),
        }
    }
}

/// Listing type enum (decides which price buckets apply)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Sale,
    Rent,
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingType::Sale => write!(f, "sale"),
            ListingType::Rent => write!(f, "rent"),
        }
    }
}

impl std::str::FromStr for ListingType {
    type Err = MarketplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(ListingType::Sale),
            "rent" => Ok(ListingType::Rent),
            _ => Err(MarketplaceError::validation(format!(
                "Invalid listing type: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// Inputs and filters
// =============================================================================

/// Input for creating a new listing. Listings always start out `pending`.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewListing {
    pub owner_id: MemberId,
    pub title: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub price: Decimal,
    pub location: String,
    #[builder(default)]
    pub featured: bool,
}

/// A single-row moderation write.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub id: ListingId,
    pub status: ListingStatus,
    pub updated_at: DateTime<Utc>,
    pub reviewed_by: Option<MemberId>,
    pub rejection_reason: Option<String>,
}

/// Half-open price interval `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price < max)
    }
}

/// Filter pushed down to the store for listing counts and group-bys.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub listing_type: Option<ListingType>,
    pub owner_id: Option<MemberId>,
    pub featured: Option<bool>,
    pub created: TimeRange,
    pub price: PriceRange,
}

impl ListingFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: ListingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn created_in(range: TimeRange) -> Self {
        Self {
            created: range,
            ..Self::default()
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.status.map_or(true, |s| listing.status == s)
            && self.listing_type.map_or(true, |t| listing.listing_type == t)
            && self.owner_id.map_or(true, |o| listing.owner_id == o)
            && self.featured.map_or(true, |f| listing.featured == f)
            && self.created.contains(listing.created_at)
            && self.price.contains(listing.price)
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE TRUE");
        if let Some(status) = self.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(listing_type) = self.listing_type {
            builder.push(" AND listing_type = ").push_bind(listing_type);
        }
        if let Some(owner_id) = self.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(featured) = self.featured {
            builder.push(" AND featured = ").push_bind(featured);
        }
        if let Some(start) = self.created.start {
            builder.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = self.created.end {
            builder.push(" AND created_at < ").push_bind(end);
        }
        if let Some(min) = self.price.min {
            builder.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = self.price.max {
            builder.push(" AND price < ").push_bind(max);
        }
    }
}

/// Row of a group-by over `location`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LocationGroup {
    pub location: String,
    pub count: i64,
    pub first_seen: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Listing {
    /// Find listing by ID, returning None if not found
    pub async fn find_by_id_optional(id: ListingId, pool: &PgPool) -> Result<Option<Self>> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(listing)
    }

    /// Create a new listing in `pending`
    pub async fn create(input: &NewListing, pool: &PgPool) -> Result<Self> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                id, owner_id, title, property_type, listing_type,
                price, location, featured, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING *
            "#,
        )
        .bind(ListingId::new())
        .bind(input.owner_id)
        .bind(&input.title)
        .bind(input.property_type)
        .bind(input.listing_type)
        .bind(input.price)
        .bind(&input.location)
        .bind(input.featured)
        .fetch_one(pool)
        .await?;
        Ok(listing)
    }

    /// Apply a moderation write; None if the row no longer exists
    pub async fn update_status(update: &StatusUpdate, pool: &PgPool) -> Result<Option<Self>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET status = $2,
                updated_at = $3,
                reviewed_by = $4,
                rejection_reason = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(update.id)
        .bind(update.status)
        .bind(update.updated_at)
        .bind(update.reviewed_by)
        .bind(&update.rejection_reason)
        .fetch_optional(pool)
        .await?;
        Ok(listing)
    }

    /// Count listings matching a filter
    pub async fn count_with_filter(filter: &ListingFilter, pool: &PgPool) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings");
        filter.push_where(&mut builder);
        let count = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    /// Count listings per property type
    pub async fn count_by_property_type(
        filter: &ListingFilter,
        pool: &PgPool,
    ) -> Result<Vec<(PropertyType, i64)>> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT property_type, COUNT(*) FROM listings");
        filter.push_where(&mut builder);
        builder.push(" GROUP BY property_type");
        let rows = builder
            .build_query_as::<(PropertyType, i64)>()
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// Count listings per location label, with the earliest creation time per label
    pub async fn count_by_location(
        filter: &ListingFilter,
        pool: &PgPool,
    ) -> Result<Vec<LocationGroup>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT location, COUNT(*) AS count, MIN(created_at) AS first_seen FROM listings",
        );
        filter.push_where(&mut builder);
        builder.push(" GROUP BY location ORDER BY first_seen ASC");
        let rows = builder
            .build_query_as::<LocationGroup>()
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(status: ListingStatus, listing_type: ListingType, price: i64) -> Listing {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        Listing {
            id: ListingId::new(),
            owner_id: MemberId::new(),
            title: "Loft".to_string(),
            property_type: PropertyType::Apartment,
            listing_type,
            price: Decimal::from(price),
            location: "Lisbon".to_string(),
            status,
            featured: false,
            reviewed_by: None,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_status_parses_and_displays() {
        for status in ListingStatus::ALL {
            assert_eq!(status.to_string().parse::<ListingStatus>().unwrap(), status);
        }
        assert!(matches!(
            "archived".parse::<ListingStatus>(),
            Err(MarketplaceError::Validation(_))
        ));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ListingStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(serde_json::to_string(&ListingType::Rent).unwrap(), "\"rent\"");
    }

    #[test]
    fn test_filter_matches_on_every_field() {
        let active_sale = listing(ListingStatus::Active, ListingType::Sale, 75_000);

        assert!(ListingFilter::all().matches(&active_sale));
        assert!(ListingFilter::with_status(ListingStatus::Active).matches(&active_sale));
        assert!(!ListingFilter::with_status(ListingStatus::Pending).matches(&active_sale));

        let rent_only = ListingFilter {
            listing_type: Some(ListingType::Rent),
            ..ListingFilter::default()
        };
        assert!(!rent_only.matches(&active_sale));

        let price_band = ListingFilter {
            price: PriceRange {
                min: Some(Decimal::from(50_000)),
                max: Some(Decimal::from(100_000)),
            },
            ..ListingFilter::default()
        };
        assert!(price_band.matches(&active_sale));

        let before_creation = ListingFilter::created_in(TimeRange {
            start: None,
            end: Some(active_sale.created_at),
        });
        assert!(!before_creation.matches(&active_sale));
    }

    #[test]
    fn test_price_range_upper_bound_is_exclusive() {
        let range = PriceRange {
            min: Some(Decimal::from(50_000)),
            max: Some(Decimal::from(100_000)),
        };
        assert!(range.contains(Decimal::from(50_000)));
        assert!(!range.contains(Decimal::from(100_000)));
    }
}
