//! Member domain - read-only view of the accounts owned by the auth collaborator

pub mod models;

pub use models::member::Member;
