use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{ListingId, MemberId};

/// Current favorite membership. `(listing_id, member_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub listing_id: ListingId,
    pub member_id: MemberId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct FavoriteFilter {
    pub listing_id: Option<ListingId>,
    pub owner_id: Option<MemberId>,
}

impl FavoriteFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_listing(listing_id: ListingId) -> Self {
        Self {
            listing_id: Some(listing_id),
            ..Self::default()
        }
    }

    pub fn for_owner(owner_id: MemberId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, favorite: &Favorite, listing_owner: Option<MemberId>) -> bool {
        self.listing_id.map_or(true, |l| favorite.listing_id == l)
            && self.owner_id.map_or(true, |o| listing_owner == Some(o))
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Favorite {
    pub async fn exists(listing_id: ListingId, member_id: MemberId, pool: &PgPool) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE listing_id = $1 AND member_id = $2)",
        )
        .bind(listing_id)
        .bind(member_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Insert membership; a concurrent duplicate is absorbed by the unique key
    pub async fn upsert(listing_id: ListingId, member_id: MemberId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (listing_id, member_id)
            VALUES ($1, $2)
            ON CONFLICT (listing_id, member_id) DO NOTHING
            "#,
        )
        .bind(listing_id)
        .bind(member_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Returns true when a row was removed
    pub async fn delete(listing_id: ListingId, member_id: MemberId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE listing_id = $1 AND member_id = $2")
            .bind(listing_id)
            .bind(member_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_with_filter(filter: &FavoriteFilter, pool: &PgPool) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM favorites WHERE TRUE");
        if let Some(listing_id) = filter.listing_id {
            builder.push(" AND listing_id = ").push_bind(listing_id);
        }
        if let Some(owner_id) = filter.owner_id {
            builder
                .push(" AND listing_id IN (SELECT id FROM listings WHERE owner_id = ")
                .push_bind(owner_id)
                .push(")");
        }
        let count = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }
}
