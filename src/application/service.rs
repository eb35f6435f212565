use chrono::Utc;

use crate::domain::{
    build_audit_trail, build_statements, format_cents, is_bookable_amount, AccountStatement,
    AuditRecord, Cents, Customer, CustomerNumber, LedgerEntry, PageRequest, Tenant, TenantNumber,
    Transaction, TransactionId, TransactionScope, MAX_AMOUNT_CENTS,
};
use crate::storage::{is_unique_violation, Repository};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// Sample tenants provisioned by `seed_sample_data`: (number, name).
const SAMPLE_TENANTS: [(TenantNumber, &str); 2] = [
    (1, "enterprise-all-inclusive.com"),
    (2, "betrieb-alles-inklusive.de"),
];

/// Sample customers: (tenant number, customer number, name, opening booking).
const SAMPLE_CUSTOMERS: [(TenantNumber, CustomerNumber, &str, Cents); 4] = [
    (1, 1, "enterprise customer one", 10000),
    (1, 2, "enterprise customer two", 20000),
    (2, 1, "betrieb customer one", 30000),
    (2, 2, "betrieb customer two", 40000),
];

/// What `seed_sample_data` created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub tenants: usize,
    pub customers: usize,
    pub transactions: usize,
}

/// Build a page request, rejecting an empty page size or an offset out of range.
pub fn page_request(page: u32, size: u32) -> Result<PageRequest, AppError> {
    validate_page(PageRequest { page, size })
}

fn validate_page(page: PageRequest) -> Result<PageRequest, AppError> {
    if page.size == 0 {
        return Err(AppError::Validation(
            "size must be a positive integer.".to_string(),
        ));
    }
    if page.offset().is_none() {
        return Err(AppError::Validation(format!(
            "page {} of size {} is out of range.",
            page.page, page.size
        )));
    }
    Ok(page)
}

fn require_non_negative(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::Validation(format!(
            "{field} must be a non-negative integer."
        )));
    }
    Ok(())
}

fn require_positive(value: i64, field: &str) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::Validation(format!(
            "{field} must be greater than or equal to 1"
        )));
    }
    Ok(())
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Resolver
    // ========================

    /// Look up a tenant by its business number.
    pub async fn resolve_tenant(&self, tenant_number: TenantNumber) -> Result<Tenant, AppError> {
        self.repo
            .find_tenant_by_number(tenant_number)
            .await?
            .ok_or(AppError::TenantNotFound(tenant_number))
    }

    /// Look up a customer by (customer number, tenant number).
    pub async fn resolve_customer(
        &self,
        customer_number: CustomerNumber,
        tenant_number: TenantNumber,
    ) -> Result<Customer, AppError> {
        self.repo
            .find_customer_by_numbers(customer_number, tenant_number)
            .await?
            .ok_or(AppError::CustomerNotFound {
                customer_number,
                tenant_number,
            })
    }

    // ========================
    // Provisioning
    // ========================

    /// Create a tenant with a unique number.
    pub async fn create_tenant(
        &self,
        number: TenantNumber,
        name: String,
    ) -> Result<Tenant, AppError> {
        require_positive(number, "tenantNumber")?;
        if self.repo.find_tenant_by_number(number).await?.is_some() {
            return Err(AppError::TenantAlreadyExists(number));
        }

        // A concurrent insert can still hit the UNIQUE constraint.
        let mut tenant = Tenant::new(number, name);
        self.repo
            .save_tenant(&mut tenant)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::TenantAlreadyExists(number)
                } else {
                    AppError::Database(err)
                }
            })?;
        Ok(tenant)
    }

    /// Create a customer with a number unique within its tenant.
    pub async fn create_customer(
        &self,
        tenant_number: TenantNumber,
        number: CustomerNumber,
        name: String,
    ) -> Result<Customer, AppError> {
        require_positive(number, "customerNumber")?;
        let tenant = self.resolve_tenant(tenant_number).await?;
        if self
            .repo
            .find_customer_by_numbers(number, tenant_number)
            .await?
            .is_some()
        {
            return Err(AppError::CustomerAlreadyExists {
                customer_number: number,
                tenant_number,
            });
        }

        let mut customer = Customer::new(tenant.id, number, name);
        self.repo
            .save_customer(&mut customer)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::CustomerAlreadyExists {
                        customer_number: number,
                        tenant_number,
                    }
                } else {
                    AppError::Database(err)
                }
            })?;
        Ok(customer)
    }

    /// List all tenants.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        Ok(self.repo.list_tenants().await?)
    }

    /// List the customers of a tenant.
    pub async fn list_customers(
        &self,
        tenant_number: TenantNumber,
    ) -> Result<Vec<Customer>, AppError> {
        let tenant = self.resolve_tenant(tenant_number).await?;
        Ok(self.repo.list_customers(tenant.id).await?)
    }

    /// Provision the sample tenants, customers and one booking per customer.
    /// Fails without writing anything if any sample tenant already exists.
    pub async fn seed_sample_data(&self) -> Result<SeedSummary, AppError> {
        for (number, _) in SAMPLE_TENANTS {
            if self.repo.find_tenant_by_number(number).await?.is_some() {
                return Err(AppError::TenantAlreadyExists(number));
            }
        }

        for (number, name) in SAMPLE_TENANTS {
            self.create_tenant(number, name.to_string()).await?;
        }
        for (tenant_number, customer_number, name, amount) in SAMPLE_CUSTOMERS {
            self.create_customer(tenant_number, customer_number, name.to_string())
                .await?;
            self.book(tenant_number, customer_number, amount).await?;
        }

        Ok(SeedSummary {
            tenants: SAMPLE_TENANTS.len(),
            customers: SAMPLE_CUSTOMERS.len(),
            transactions: SAMPLE_CUSTOMERS.len(),
        })
    }

    // ========================
    // Ledger operations
    // ========================

    /// Book a new transaction for the customer identified by the two numbers.
    /// Duplicate submissions create duplicate transactions.
    pub async fn book(
        &self,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        amount_cents: Cents,
    ) -> Result<Transaction, AppError> {
        require_non_negative(tenant_number, "tenantNumber")?;
        require_non_negative(customer_number, "customerNumber")?;
        if !is_bookable_amount(amount_cents) {
            return Err(AppError::Validation(format!(
                "amount must be between -{max} and {max}",
                max = format_cents(MAX_AMOUNT_CENTS)
            )));
        }

        let customer = self.resolve_customer(customer_number, tenant_number).await?;

        let mut transaction = Transaction::book(customer.id, amount_cents, Utc::now());
        self.repo.save_transaction(&mut transaction).await?;
        Ok(transaction)
    }

    /// Mark a transaction as rolled back.
    ///
    /// Rolling back an already rolled-back transaction succeeds and returns
    /// it unchanged; the first rollback timestamp is kept.
    pub async fn rollback(&self, id: TransactionId) -> Result<Transaction, AppError> {
        require_positive(id, "Transaction ID")?;
        self.repo
            .mark_rolled_back(id, Utc::now())
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Get a single transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        require_positive(id, "Transaction ID")?;
        self.repo
            .get_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Fetch one page of transactions.
    ///
    /// A non-zero customer number selects that customer within the tenant;
    /// otherwise a non-zero tenant number selects the whole tenant; otherwise
    /// all transactions. A filter that does not resolve fails with NotFound.
    pub async fn fetch_page(
        &self,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        page: PageRequest,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        require_non_negative(tenant_number, "tenantNumber")?;
        require_non_negative(customer_number, "customerNumber")?;
        let page = validate_page(page)?;

        let scope = TransactionScope::select(tenant_number, customer_number);
        match scope {
            TransactionScope::Customer {
                customer_number,
                tenant_number,
            } => {
                self.resolve_customer(customer_number, tenant_number).await?;
            }
            TransactionScope::Tenant(tenant_number) => {
                self.resolve_tenant(tenant_number).await?;
            }
            TransactionScope::All => {}
        }

        Ok(self.repo.fetch_entries(scope, page).await?)
    }

    /// Account statements with page-scoped balances.
    pub async fn list(
        &self,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        page: PageRequest,
    ) -> Result<Vec<AccountStatement>, AppError> {
        let entries = self.fetch_page(tenant_number, customer_number, page).await?;
        Ok(build_statements(&entries))
    }

    /// Flat audit records, one per transaction in the page.
    pub async fn audit(
        &self,
        tenant_number: TenantNumber,
        customer_number: CustomerNumber,
        page: PageRequest,
    ) -> Result<Vec<AuditRecord>, AppError> {
        let entries = self.fetch_page(tenant_number, customer_number, page).await?;
        Ok(build_audit_trail(&entries))
    }
}
