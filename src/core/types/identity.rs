//! Check identity
//!
//! Every check evaluated by the agent is identified by the environment it
//! runs in, the tenant that owns it, the service it belongs to and its name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable identity of a configured check
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckIdentity {
    /// Environment the agent is deployed in
    pub environment: String,
    /// Tenant owning the check
    pub tenant: String,
    /// Service the check belongs to
    pub service: String,
    /// Check name, unique within the service
    pub name: String,
}

impl CheckIdentity {
    /// Create a new identity
    pub fn new(
        environment: impl Into<String>,
        tenant: impl Into<String>,
        service: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            tenant: tenant.into(),
            service: service.into(),
            name: name.into(),
        }
    }

    /// Slash-delimited path, e.g. `prod/acme/web/homepage`
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CheckIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.environment, self.tenant, self.service, self.name
        )
    }
}
