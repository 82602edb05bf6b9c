// Common types and utilities shared across the marketplace domains

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod types;

pub use auth::{Actor, AdminCapability, AuthError};
pub use entity_ids::*;
pub use errors::{MarketplaceError, MarketplaceResult};
pub use id::Id;
pub use types::*;
