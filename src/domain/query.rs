use serde::{Deserialize, Serialize};

use super::{CustomerNumber, TenantNumber};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Zero-based page of transactions, ordered by transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Returns `None` when `size` is zero or the row offset does not fit an `i64`.
    pub fn new(page: u32, size: u32) -> Option<Self> {
        let request = Self { page, size };
        (size > 0 && request.offset().is_some()).then_some(request)
    }

    /// Row offset for the storage query, `None` on overflow.
    pub fn offset(&self) -> Option<i64> {
        i64::from(self.page).checked_mul(i64::from(self.size))
    }

    /// Row limit for the storage query.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Which transactions a read covers. Zero numbers mean "no filter".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionScope {
    All,
    Tenant(TenantNumber),
    Customer {
        customer_number: CustomerNumber,
        tenant_number: TenantNumber,
    },
}

impl TransactionScope {
    /// A non-zero customer number takes precedence over a tenant-only filter.
    pub fn select(tenant_number: TenantNumber, customer_number: CustomerNumber) -> Self {
        if customer_number != 0 {
            TransactionScope::Customer {
                customer_number,
                tenant_number,
            }
        } else if tenant_number != 0 {
            TransactionScope::Tenant(tenant_number)
        } else {
            TransactionScope::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_rejects_zero_size() {
        assert!(PageRequest::new(0, 0).is_none());
        assert_eq!(PageRequest::new(3, 1), Some(PageRequest { page: 3, size: 1 }));
    }

    #[test]
    fn test_page_offset() {
        let page = PageRequest::new(2, 25).unwrap();
        assert_eq!(page.offset(), Some(50));
        assert_eq!(page.limit(), 25);
        assert_eq!(PageRequest::default().offset(), Some(0));
    }

    #[test]
    fn test_page_offset_overflow_is_rejected() {
        assert!(PageRequest::new(u32::MAX, u32::MAX).is_none());

        let page = PageRequest {
            page: u32::MAX,
            size: u32::MAX,
        };
        assert_eq!(page.offset(), None);

        // Largest page that still fits stays usable.
        let page = PageRequest::new(u32::MAX, 1).unwrap();
        assert_eq!(page.offset(), Some(i64::from(u32::MAX)));
    }

    #[test]
    fn test_scope_precedence() {
        assert_eq!(TransactionScope::select(0, 0), TransactionScope::All);
        assert_eq!(TransactionScope::select(2, 0), TransactionScope::Tenant(2));
        assert_eq!(
            TransactionScope::select(2, 1),
            TransactionScope::Customer {
                customer_number: 1,
                tenant_number: 2
            }
        );
        // Customer path is taken even without a tenant number; resolution then fails.
        assert_eq!(
            TransactionScope::select(0, 1),
            TransactionScope::Customer {
                customer_number: 1,
                tenant_number: 0
            }
        );
    }
}
