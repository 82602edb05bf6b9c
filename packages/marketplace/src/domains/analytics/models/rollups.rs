//! Dashboard rollups. Plain serializable values, computed on demand.

use serde::{Deserialize, Serialize};

use crate::common::MemberId;
use crate::domains::analytics::window::{percent_change, ReferenceWindow};
use crate::domains::listings::models::{ListingStatus, PropertyType};

/// All-time counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub listings: u64,
    pub active_listings: u64,
    pub featured_listings: u64,
    pub views: u64,
    /// Current favorite memberships, not toggle history
    pub favorites: u64,
    pub users: u64,
}

/// What happened inside one reference window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowedDeltas {
    pub new_listings: u64,
    pub new_views: u64,
    pub new_favorites: u64,
    pub new_users: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub current: u64,
    pub previous: u64,
    pub percent_change: f64,
}

impl MetricChange {
    pub fn new(current: u64, previous: u64) -> Self {
        Self {
            current,
            previous,
            percent_change: percent_change(current, previous),
        }
    }
}

/// A window compared against the one immediately before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaComparison {
    pub window: ReferenceWindow,
    pub previous_window: ReferenceWindow,
    pub listings: MetricChange,
    pub views: MetricChange,
    pub favorites: MetricChange,
    pub users: MetricChange,
}

impl DeltaComparison {
    pub fn new(
        window: ReferenceWindow,
        current: WindowedDeltas,
        previous: WindowedDeltas,
    ) -> Self {
        Self {
            window,
            previous_window: window.previous(),
            listings: MetricChange::new(current.new_listings, previous.new_listings),
            views: MetricChange::new(current.new_views, previous.new_views),
            favorites: MetricChange::new(current.new_favorites, previous.new_favorites),
            users: MetricChange::new(current.new_users, previous.new_users),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShare {
    pub property_type: PropertyType,
    pub count: u64,
    /// Rounded to the nearest integer; shares may not sum to exactly 100
    pub percent_of_total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBucketCount {
    pub bucket_label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// e.g. `Oct 2026`
    pub month_label: String,
    pub new_listings: u64,
    pub new_users: u64,
    pub new_views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ListingStatus,
    pub count: u64,
}

/// One owner's listings at a glance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub owner_id: MemberId,
    pub listings: u64,
    pub by_status: Vec<StatusCount>,
    pub views: u64,
    pub favorites: u64,
}
