//! Test fixtures for creating listings and engagement.
//!
//! Fixtures go through the public actions so every listing starts `pending`
//! exactly as it would in production.

#![allow(dead_code)]

use marketplace_core::common::{Actor, MemberId};
use marketplace_core::domains::listings::{
    create_listing, transition, Listing, ListingStatus, ListingType, NewListing, PropertyType,
};
use marketplace_core::kernel::ServerDeps;
use rust_decimal::Decimal;

pub fn new_listing(
    property_type: PropertyType,
    listing_type: ListingType,
    price: i64,
    location: &str,
) -> NewListing {
    NewListing::builder()
        .owner_id(MemberId::new())
        .title(format!("{} in {}", property_type, location))
        .property_type(property_type)
        .listing_type(listing_type)
        .price(Decimal::from(price))
        .location(location)
        .build()
}

/// Create a pending sale listing
pub async fn create_pending_listing(deps: &ServerDeps, price: i64, location: &str) -> Listing {
    create_listing(
        deps,
        new_listing(PropertyType::House, ListingType::Sale, price, location),
    )
    .await
    .expect("Failed to create listing")
}

/// Create a listing and approve it
pub async fn create_active_listing(deps: &ServerDeps, input: NewListing) -> Listing {
    let listing = create_listing(deps, input)
        .await
        .expect("Failed to create listing");
    transition(
        deps,
        &Actor::member(MemberId::new()),
        listing.id,
        ListingStatus::Active,
        None,
    )
    .await
    .expect("Failed to approve listing")
}
