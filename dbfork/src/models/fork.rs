//! Fork record created during a demo run.

use super::ServiceId;

/// A fork created by the external CLI.
///
/// Lives for a single run: created, queried, then deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkRecord {
    /// Identifier the platform assigned to the fork.
    pub service_id: ServiceId,
    /// Name requested when the fork was created.
    pub name: String,
}

impl ForkRecord {
    pub const fn new(service_id: ServiceId, name: String) -> Self {
        Self { service_id, name }
    }

    /// Whether the platform id differs from the requested name.
    pub fn has_distinct_id(&self) -> bool {
        self.service_id.as_str() != self.name
    }
}
