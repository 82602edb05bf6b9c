//! Kernel module - store seams and the dependency container.

pub mod deps;
pub mod postgres;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use postgres::PgStore;
pub use test_dependencies::{InMemoryStore, TestDependencies};
pub use traits::*;
