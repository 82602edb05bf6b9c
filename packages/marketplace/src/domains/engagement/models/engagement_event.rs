use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::{EngagementEventId, ListingId, MemberId, TimeRange};

/// What happened to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "engagement_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    View,
    FavoriteAdd,
    FavoriteRemove,
}

impl std::fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementKind::View => write!(f, "view"),
            EngagementKind::FavoriteAdd => write!(f, "favorite_add"),
            EngagementKind::FavoriteRemove => write!(f, "favorite_remove"),
        }
    }
}

/// Immutable engagement fact. Views are never deduplicated at this level.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EngagementEvent {
    pub id: EngagementEventId,
    pub kind: EngagementKind,
    pub listing_id: ListingId,
    pub actor_id: Option<MemberId>,
    pub session_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEngagementEvent {
    pub kind: EngagementKind,
    pub listing_id: ListingId,
    pub actor_id: Option<MemberId>,
    pub session_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl NewEngagementEvent {
    pub fn view(listing_id: ListingId, session_id: &str, actor_id: Option<MemberId>) -> Self {
        Self {
            kind: EngagementKind::View,
            listing_id,
            actor_id,
            session_id: Some(session_id.to_string()),
            occurred_at: Utc::now(),
        }
    }

    pub fn favorite(listing_id: ListingId, actor_id: MemberId, added: bool) -> Self {
        Self {
            kind: if added {
                EngagementKind::FavoriteAdd
            } else {
                EngagementKind::FavoriteRemove
            },
            listing_id,
            actor_id: Some(actor_id),
            session_id: None,
            occurred_at: Utc::now(),
        }
    }
}

/// Filter for event counts. `owner_id` restricts to listings of one owner.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub kind: Option<EngagementKind>,
    pub listing_id: Option<ListingId>,
    pub owner_id: Option<MemberId>,
    pub occurred: TimeRange,
}

impl EventFilter {
    pub fn views() -> Self {
        Self {
            kind: Some(EngagementKind::View),
            ..Self::default()
        }
    }

    /// Favorite additions; removals later on do not erase them
    pub fn favorite_adds() -> Self {
        Self {
            kind: Some(EngagementKind::FavoriteAdd),
            ..Self::default()
        }
    }

    pub fn for_listing(mut self, listing_id: ListingId) -> Self {
        self.listing_id = Some(listing_id);
        self
    }

    pub fn for_owner(mut self, owner_id: MemberId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn occurred_in(mut self, range: TimeRange) -> Self {
        self.occurred = range;
        self
    }

    /// `listing_owner` is the owner of `event.listing_id`, if known.
    pub fn matches(&self, event: &EngagementEvent, listing_owner: Option<MemberId>) -> bool {
        self.kind.map_or(true, |k| event.kind == k)
            && self.listing_id.map_or(true, |l| event.listing_id == l)
            && self.owner_id.map_or(true, |o| listing_owner == Some(o))
            && self.occurred.contains(event.occurred_at)
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl EngagementEvent {
    pub async fn insert(event: &NewEngagementEvent, pool: &PgPool) -> Result<Self> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO engagement_events (id, kind, listing_id, actor_id, session_id, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(EngagementEventId::new())
        .bind(event.kind)
        .bind(event.listing_id)
        .bind(event.actor_id)
        .bind(&event.session_id)
        .bind(event.occurred_at)
        .fetch_one(pool)
        .await?;
        Ok(event)
    }

    pub async fn count_with_filter(filter: &EventFilter, pool: &PgPool) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM engagement_events WHERE TRUE");
        if let Some(kind) = filter.kind {
            builder.push(" AND kind = ").push_bind(kind);
        }
        if let Some(listing_id) = filter.listing_id {
            builder.push(" AND listing_id = ").push_bind(listing_id);
        }
        if let Some(owner_id) = filter.owner_id {
            builder
                .push(" AND listing_id IN (SELECT id FROM listings WHERE owner_id = ")
                .push_bind(owner_id)
                .push(")");
        }
        if let Some(start) = filter.occurred.start {
            builder.push(" AND occurred_at >= ").push_bind(start);
        }
        if let Some(end) = filter.occurred.end {
            builder.push(" AND occurred_at < ").push_bind(end);
        }
        let count = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }
}
