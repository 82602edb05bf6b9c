pub mod emit;

pub use emit::{emit, notifications_for, NotificationTemplate};
