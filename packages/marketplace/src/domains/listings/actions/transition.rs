//! Moderation transitions - the only path that mutates a listing's status.

use chrono::Utc;
use tracing::{info, warn};

use super::get_listing;
use crate::common::{Actor, ListingId, MarketplaceError, MarketplaceResult};
use crate::domains::listings::machines::{decide, TransitionDecision};
use crate::domains::listings::models::{Listing, ListingStatus, StatusUpdate};
use crate::domains::notifications::{emit, NotificationTemplate};
use crate::kernel::ServerDeps;

/// Move a listing to `target`.
///
/// Non-administrators are held to the natural edge set; administrators may
/// override it. On success the owner is notified, but a failed notification
/// never undoes the status change.
pub async fn transition(
    deps: &ServerDeps,
    actor: &Actor,
    listing_id: ListingId,
    target: ListingStatus,
    reason: Option<&str>,
) -> MarketplaceResult<Listing> {
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if target == ListingStatus::Rejected && reason.is_none() {
        return Err(MarketplaceError::validation("a rejection reason is required"));
    }

    let listing = get_listing(deps, listing_id).await?;
    let from = listing.status;

    let decision = match decide(actor, from, target) {
        Ok(decision) => decision,
        Err(err) => {
            info!(
                listing_id = %listing_id,
                actor_id = %actor.member_id(),
                from = %from,
                to = %target,
                "Transition refused"
            );
            return Err(err);
        }
    };

    if decision == TransitionDecision::AdminOverride {
        warn!(
            listing_id = %listing_id,
            actor_id = %actor.member_id(),
            from = %from,
            to = %target,
            admin_override = true,
            "Administrative status override"
        );
    }

    let update = StatusUpdate {
        id: listing_id,
        status: target,
        updated_at: Utc::now(),
        reviewed_by: Some(actor.member_id()),
        rejection_reason: if target == ListingStatus::Rejected {
            reason.map(str::to_string)
        } else {
            None
        },
    };

    let updated = deps
        .store(deps.listings.update_listing_status(&update))
        .await?
        .ok_or_else(|| MarketplaceError::listing_not_found(listing_id))?;

    info!(
        listing_id = %listing_id,
        actor_id = %actor.member_id(),
        from = %from,
        to = %target,
        "Listing status changed"
    );

    notify_owner(deps, &updated, target, reason).await;

    Ok(updated)
}

/// Fire-and-forget: the status write above is already committed.
async fn notify_owner(
    deps: &ServerDeps,
    listing: &Listing,
    target: ListingStatus,
    reason: Option<&str>,
) {
    let template = NotificationTemplate::for_transition(listing, target, reason);
    if let Err(err) = emit(
        deps,
        listing.owner_id,
        template.notification_type,
        template.title,
        template.message,
        listing.id,
    )
    .await
    {
        warn!(
            listing_id = %listing.id,
            owner_id = %listing.owner_id,
            error = %err,
            "Status changed but owner notification failed"
        );
    }
}
