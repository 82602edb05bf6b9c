//! Analytics domain - dashboard rollups over listings, engagement and members
pub mod actions;
pub mod buckets;
pub mod models;
pub mod window;

pub use actions::{AggregationEngine, DEFAULT_MONTHS_BACK, DEFAULT_TOP_LOCATIONS};
pub use models::*;
pub use window::{percent_change, ReferenceWindow, WindowPreset};
