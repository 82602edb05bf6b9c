pub mod listing;

pub use listing::{
    Listing, ListingFilter, ListingStatus, ListingType, LocationGroup, NewListing, PriceRange,
    PropertyType, StatusUpdate,
};
