use crate::common::{Actor, AdminCapability, MarketplaceError, MarketplaceResult};
use crate::domains::listings::models::ListingStatus;

/// Listing moderation state machine
/// Pure decision logic - NO IO, only transition rules
///
/// ```text
/// pending  -> active | rejected
/// active   -> inactive | sold | rented
/// inactive -> active
/// ```
///
/// Nothing returns to `pending` once approved. Administrators may move any
/// status to any status.
impl ListingStatus {
    /// Targets reachable from this status without administrative override
    pub fn allowed_targets(&self) -> &'static [ListingStatus] {
        match self {
            ListingStatus::Pending => &[ListingStatus::Active, ListingStatus::Rejected],
            ListingStatus::Active => &[
                ListingStatus::Inactive,
                ListingStatus::Sold,
                ListingStatus::Rented,
            ],
            ListingStatus::Inactive => &[ListingStatus::Active],
            ListingStatus::Rejected | ListingStatus::Sold | ListingStatus::Rented => &[],
        }
    }

    pub fn can_transition_to(&self, target: ListingStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// No natural transition leaves this status
    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }
}

/// How a requested transition was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    /// On the natural edge set
    Natural,
    /// Outside the edge set, allowed because the actor is an administrator
    AdminOverride,
}

/// Decide whether `actor` may move a listing from `from` to `to`.
pub fn decide(
    actor: &Actor,
    from: ListingStatus,
    to: ListingStatus,
) -> MarketplaceResult<TransitionDecision> {
    if from.can_transition_to(to) {
        return Ok(TransitionDecision::Natural);
    }

    actor
        .can(AdminCapability::OverrideListingStatus)
        .check()
        .map(|_| TransitionDecision::AdminOverride)
        .map_err(|_| MarketplaceError::InvalidTransition { from, to })
}
