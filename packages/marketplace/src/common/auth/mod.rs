//! Authorization for moderation actions.
//!
//! The auth collaborator resolves the caller into an `Actor`; moderation code
//! asks it for capabilities instead of reading any global admin flag:
//!
//! ```rust
//! use marketplace_core::common::{Actor, AdminCapability, MemberId};
//!
//! let actor = Actor::new(MemberId::new(), true);
//! assert!(actor.can(AdminCapability::OverrideListingStatus).check().is_ok());
//! ```

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::AdminCapability;
pub use errors::AuthError;
