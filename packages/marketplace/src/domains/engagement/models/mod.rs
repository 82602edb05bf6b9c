pub mod engagement_event;
pub mod favorite;

pub use engagement_event::{EngagementEvent, EngagementKind, EventFilter, NewEngagementEvent};
pub use favorite::{Favorite, FavoriteFilter};
