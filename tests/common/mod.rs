// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tempfile::TempDir;
use tenant_ledger::application::LedgerService;
use tenant_ledger::domain::PageRequest;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// A page request that is known to be valid.
pub fn page(page: u32, size: u32) -> PageRequest {
    PageRequest::new(page, size).unwrap()
}

/// Test fixture: tenants and customers without any bookings
pub struct StandardTenants;

impl StandardTenants {
    pub const ENTERPRISE: i64 = 1;
    pub const BETRIEB: i64 = 2;

    /// Two tenants that both use customer numbers 1 and 2.
    pub async fn create(service: &LedgerService) -> Result<()> {
        service
            .create_tenant(Self::ENTERPRISE, "enterprise-all-inclusive.com".into())
            .await?;
        service
            .create_tenant(Self::BETRIEB, "betrieb-alles-inklusive.de".into())
            .await?;

        service
            .create_customer(Self::ENTERPRISE, 1, "enterprise customer one".into())
            .await?;
        service
            .create_customer(Self::ENTERPRISE, 2, "enterprise customer two".into())
            .await?;
        service
            .create_customer(Self::BETRIEB, 1, "betrieb customer one".into())
            .await?;
        service
            .create_customer(Self::BETRIEB, 2, "betrieb customer two".into())
            .await?;
        Ok(())
    }
}
