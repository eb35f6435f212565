use serde::{Deserialize, Serialize};

/// Surrogate key assigned by storage.
pub type TenantId = i64;

/// Business number of a tenant, unique across the ledger.
pub type TenantNumber = i64;

/// Top-level organizational unit owning customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub number: TenantNumber,
    pub name: String,
}

impl Tenant {
    /// Create an unsaved tenant. The id is assigned by the repository.
    pub fn new(number: TenantNumber, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            number,
            name: name.into(),
        }
    }
}
