use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resolved delivery location for a single request.
///
/// `location` is the opaque descriptor returned by the upstream's
/// delivery-location lookup; it is replayed verbatim (as a cookie) on every
/// listing and storefront request made on behalf of the same request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationToken {
    pub place_id: String,
    pub location: Value,
}

/// Opaque upstream storefront identifier (a UUID string in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorefrontId(String);

impl StorefrontId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorefrontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StorefrontId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
