use thiserror::Error;

/// Authorization errors for moderation actions
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Admin access required")]
    AdminRequired,
}
