use thiserror::Error;
use uuid::Uuid;

use crate::domains::listings::models::ListingStatus;

/// Errors surfaced by every public marketplace operation.
///
/// Only `Storage` is worth retrying; the other variants describe a request that
/// will fail the same way again.
#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ListingStatus,
        to: ListingStatus,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type MarketplaceResult<T> = std::result::Result<T, MarketplaceError>;

impl MarketplaceError {
    pub fn listing_not_found(id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity: "listing",
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Message suitable for showing to the person who triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => format!("{} not found", entity),
            Self::Validation(message) => message.clone(),
            Self::InvalidTransition { from, to } => {
                format!("a {} listing cannot be moved to {}", from, to)
            }
            Self::Storage(_) => "something went wrong, please try again".to_string(),
        }
    }
}
