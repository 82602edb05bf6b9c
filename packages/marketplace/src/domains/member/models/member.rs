use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{MemberId, TimeRange};

/// Member as seen by the marketplace core.
///
/// Accounts belong to the auth collaborator; this side only reads enough to
/// count sign-ups on dashboards.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Member {
    pub id: MemberId,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Count members who joined within `range`
    pub async fn count_joined(range: TimeRange, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM members
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
