// Property Marketplace - Lifecycle & Engagement Core
//
// Listing moderation, view and favorite tracking, owner notifications and
// dashboard rollups. Persistence sits behind the kernel store traits, with a
// Postgres implementation for production and an in-memory one for tests.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
