//! Notifications domain - records created in reaction to moderation changes

pub mod actions;
pub mod models;

pub use actions::{emit, notifications_for, NotificationTemplate};
pub use models::{Notification, NotificationType};
