mod recorder;

pub use recorder::{EngagementRecorder, FavoriteToggle, ViewOutcome};
