use rust_decimal::Decimal;
use tracing::info;

use crate::common::{ListingId, MarketplaceError, MarketplaceResult};
use crate::domains::listings::models::{Listing, NewListing};
use crate::kernel::ServerDeps;

/// Create a listing. It always enters moderation as `pending`.
pub async fn create_listing(deps: &ServerDeps, input: NewListing) -> MarketplaceResult<Listing> {
    if input.price < Decimal::ZERO {
        return Err(MarketplaceError::validation("price must not be negative"));
    }
    if input.title.trim().is_empty() {
        return Err(MarketplaceError::validation("a title is required"));
    }

    let listing = deps.store(deps.listings.insert_listing(&input)).await?;

    info!(
        listing_id = %listing.id,
        owner_id = %listing.owner_id,
        property_type = %listing.property_type,
        listing_type = %listing.listing_type,
        "Listing created"
    );

    Ok(listing)
}

/// Load a listing or fail with `NotFound`
pub async fn get_listing(deps: &ServerDeps, id: ListingId) -> MarketplaceResult<Listing> {
    deps.store(deps.listings.get_listing(id))
        .await?
        .ok_or_else(|| MarketplaceError::listing_not_found(id))
}
