//! Service identifier newtype.

use std::fmt;

use crate::error::DemoError;

/// Opaque identifier of a managed database service.
///
/// Always non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a service id, rejecting empty or whitespace-only input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, DemoError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(DemoError::EmptyServiceId);
        }
        Ok(Self(id.to_string()))
    }

    /// Build from an optional configured value, treating blank as unset.
    pub fn from_setting(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
