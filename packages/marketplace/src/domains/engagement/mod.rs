//! Engagement domain - listing views and favorites
pub mod actions;
pub mod models;

pub use actions::{EngagementRecorder, FavoriteToggle, ViewOutcome};
pub use models::{EngagementEvent, EngagementKind, EventFilter, Favorite, FavoriteFilter};
