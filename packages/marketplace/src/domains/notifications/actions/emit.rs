//! Notification emitter - turns a moderation outcome into a stored notice.

use tracing::{debug, info};

use crate::common::{ListingId, MarketplaceResult, MemberId};
use crate::domains::listings::models::{Listing, ListingStatus};
use crate::domains::notifications::models::{NewNotification, Notification, NotificationType};
use crate::kernel::ServerDeps;

/// Title and body for the notice sent after a status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
}

impl NotificationTemplate {
    pub fn for_transition(listing: &Listing, target: ListingStatus, reason: Option<&str>) -> Self {
        match target {
            ListingStatus::Active => Self {
                notification_type: NotificationType::Approval,
                title: "Property approved".to_string(),
                message: format!(
                    "Your property \"{}\" has been approved and is now live.",
                    listing.title
                ),
            },
            ListingStatus::Rejected => Self {
                notification_type: NotificationType::Rejection,
                title: "Property rejected".to_string(),
                message: format!(
                    "Your property \"{}\" was rejected: {}",
                    listing.title,
                    reason.unwrap_or("no reason given")
                ),
            },
            other => Self {
                notification_type: NotificationType::StatusChange,
                title: "Property status updated".to_string(),
                message: format!("Your property \"{}\" is now {}.", listing.title, other),
            },
        }
    }
}

/// Persist a notification. Creates exactly one record; never retries.
pub async fn emit(
    deps: &ServerDeps,
    member_id: MemberId,
    notification_type: NotificationType,
    title: impl Into<String>,
    message: impl Into<String>,
    listing_id: ListingId,
) -> MarketplaceResult<Notification> {
    let input = NewNotification {
        member_id,
        listing_id,
        notification_type,
        title: title.into(),
        message: message.into(),
    };

    let notification = deps
        .store(deps.notifications.insert_notification(&input))
        .await?;

    info!(
        notification_id = %notification.id,
        member_id = %member_id,
        listing_id = %listing_id,
        notification_type = %notification_type,
        "Notification created"
    );

    Ok(notification)
}

/// A member's notifications, newest first
pub async fn notifications_for(
    deps: &ServerDeps,
    member_id: MemberId,
    limit: u32,
) -> MarketplaceResult<Vec<Notification>> {
    debug!(member_id = %member_id, limit, "Listing notifications");
    deps.store(deps.notifications.list_notifications(member_id, limit))
        .await
}
