use serde::{Deserialize, Serialize};

use super::{AdminCapability, AuthError};
use crate::common::entity_ids::MemberId;

/// The member on whose behalf an operation runs.
///
/// Usage:
/// ```
/// # use marketplace_core::common::{Actor, AdminCapability, MemberId};
/// let moderator = Actor::new(MemberId::new(), false);
/// assert!(moderator.can(AdminCapability::OverrideListingStatus).check().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    member_id: MemberId,
    is_admin: bool,
}

impl Actor {
    /// # Arguments
    /// * `member_id` - The member ID of the caller
    /// * `is_admin` - Admin flag from the session (already validated during authentication)
    pub fn new(member_id: MemberId, is_admin: bool) -> Self {
        Self {
            member_id,
            is_admin,
        }
    }

    pub fn member(member_id: MemberId) -> Self {
        Self::new(member_id, false)
    }

    pub fn admin(member_id: MemberId) -> Self {
        Self::new(member_id, true)
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    pub fn check(self) -> Result<(), AuthError> {
        if self.capability.requires_admin() && !self.actor.is_admin {
            return Err(AuthError::AdminRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_holds_override_capability() {
        let result = Actor::admin(MemberId::new())
            .can(AdminCapability::OverrideListingStatus)
            .check();
        assert!(result.is_ok());
    }

    #[test]
    fn test_member_is_denied_override_capability() {
        let result = Actor::member(MemberId::new())
            .can(AdminCapability::OverrideListingStatus)
            .check();
        assert_eq!(result, Err(AuthError::AdminRequired));
    }
}
