//! Typed ID definitions for the marketplace entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for property listings.
pub struct Listing;

/// Marker type for members (users). Owned by the auth collaborator.
pub struct Member;

/// Marker type for engagement events (views, favorite toggles).
pub struct EngagementEvent;

/// Marker type for notification records.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type ListingId = Id<Listing>;

pub type MemberId = Id<Member>;

pub type EngagementEventId = Id<EngagementEvent>;

pub type NotificationId = Id<Notification>;
