//! Listings domain actions - entry-point business logic
//!
//! Actions take already-authenticated input (an `Actor`), consult the pure
//! transition rules in `machines`, and write through `ServerDeps`.

pub mod create;
pub mod transition;

pub use create::{create_listing, get_listing};
pub use transition::transition;
