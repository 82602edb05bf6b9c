//! Server dependencies for domain actions (using traits for testability)
//!
//! Every store round trip goes through [`ServerDeps::store`], which applies the
//! request deadline and turns collaborator failures into `StorageError`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::common::{MarketplaceError, MarketplaceResult};
use crate::kernel::postgres::PgStore;
use crate::kernel::{
    BaseEngagementStore, BaseListingStore, BaseMemberDirectory, BaseNotificationStore,
};

// =============================================================================
// ServerDeps
// =============================================================================

/// Collaborators available to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub listings: Arc<dyn BaseListingStore>,
    pub engagement: Arc<dyn BaseEngagementStore>,
    pub notifications: Arc<dyn BaseNotificationStore>,
    pub members: Arc<dyn BaseMemberDirectory>,
    /// Deadline applied to each store call. None waits indefinitely.
    pub store_timeout: Option<Duration>,
}

impl ServerDeps {
    pub fn new(
        listings: Arc<dyn BaseListingStore>,
        engagement: Arc<dyn BaseEngagementStore>,
        notifications: Arc<dyn BaseNotificationStore>,
        members: Arc<dyn BaseMemberDirectory>,
    ) -> Self {
        Self {
            listings,
            engagement,
            notifications,
            members,
            store_timeout: None,
        }
    }

    /// All collaborators backed by one Postgres pool
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    /// Request-scoped copy with a different deadline
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            store_timeout: Some(timeout),
            ..self.clone()
        }
    }

    /// Run one store call under the configured deadline.
    pub async fn store<T, F>(&self, call: F) -> MarketplaceResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let result = match self.store_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Store call timed out");
                    return Err(MarketplaceError::Storage(anyhow::anyhow!(
                        "store call timed out after {}ms",
                        timeout.as_millis()
                    )));
                }
            },
            None => call.await,
        };
        result.map_err(MarketplaceError::Storage)
    }
}
