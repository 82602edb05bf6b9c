/// Capabilities that only administrators hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Move a listing between any two statuses, bypassing the natural edges
    OverrideListingStatus,
}

impl AdminCapability {
    pub fn requires_admin(&self) -> bool {
        match self {
            AdminCapability::OverrideListingStatus => true,
        }
    }
}
