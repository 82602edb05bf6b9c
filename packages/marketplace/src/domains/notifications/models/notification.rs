use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ListingId, MemberId, NotificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Approval,
    Rejection,
    StatusChange,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::Approval => write!(f, "approval"),
            NotificationType::Rejection => write!(f, "rejection"),
            NotificationType::StatusChange => write!(f, "status_change"),
        }
    }
}

/// Notification record addressed to a listing owner. Written once; delivery
/// happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub member_id: MemberId,
    pub listing_id: ListingId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub member_id: MemberId,
    pub listing_id: ListingId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub async fn create(input: &NewNotification, pool: &PgPool) -> Result<Self> {
        let notification = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (id, member_id, listing_id, notification_type, title, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(input.member_id)
        .bind(input.listing_id)
        .bind(input.notification_type)
        .bind(&input.title)
        .bind(&input.message)
        .fetch_one(pool)
        .await?;
        Ok(notification)
    }

    /// Newest first
    pub async fn find_for_member(
        member_id: MemberId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM notifications
            WHERE member_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(member_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(notifications)
    }
}
