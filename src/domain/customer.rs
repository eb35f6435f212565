use serde::{Deserialize, Serialize};

use super::TenantId;

/// Surrogate key assigned by storage.
pub type CustomerId = i64;

/// Business number of a customer. Only unique together with its tenant's number.
pub type CustomerNumber = i64;

/// A customer belongs to exactly one tenant and owns transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub tenant_id: TenantId,
    pub number: CustomerNumber,
    pub name: String,
}

impl Customer {
    /// Create an unsaved customer under `tenant_id`. The id is assigned by the repository.
    pub fn new(tenant_id: TenantId, number: CustomerNumber, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            tenant_id,
            number,
            name: name.into(),
        }
    }
}
