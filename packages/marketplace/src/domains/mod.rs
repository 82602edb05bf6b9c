// Business domains
pub mod analytics;
pub mod engagement;
pub mod listings;
pub mod member;
pub mod notifications;
