//! Listings domain - property records and their moderation lifecycle

pub mod actions;
pub mod machines;
pub mod models;

pub use actions::{create_listing, get_listing, transition};
pub use machines::{decide, TransitionDecision};
pub use models::{Listing, ListingStatus, ListingType, NewListing, PropertyType};
