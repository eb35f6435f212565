use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::error::DatabaseError;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{
    Customer, CustomerNumber, LedgerEntry, PageRequest, Tenant, TenantId, TenantNumber,
    Transaction, TransactionId, TransactionScope,
};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str = "id, customer_id, amount_cents, booked_at, rollback_at";

/// True when `err` is an insert rejected by a UNIQUE constraint.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .is_some_and(DatabaseError::is_unique_violation)
}

/// Repository for persisting and querying tenants, customers and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        debug!("running migration 001_initial");
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Tenant operations
    // ========================

    /// Insert a tenant and assign its id.
    pub async fn save_tenant(&self, tenant: &mut Tenant) -> Result<()> {
        let result = sqlx::query("INSERT INTO tenants (number, name) VALUES (?, ?)")
            .bind(tenant.number)
            .bind(&tenant.name)
            .execute(&self.pool)
            .await
            .context("Failed to save tenant")?;
        tenant.id = result.last_insert_rowid();
        Ok(())
    }

    /// Find a tenant by business number. The lowest id wins if several match.
    pub async fn find_tenant_by_number(&self, number: TenantNumber) -> Result<Option<Tenant>> {
        let row = sqlx::query(
            "SELECT id, number, name FROM tenants WHERE number = ? ORDER BY id LIMIT 1",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch tenant by number")?;

        Ok(row.as_ref().map(Self::row_to_tenant))
    }

    /// List all tenants ordered by number.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT id, number, name FROM tenants ORDER BY number, id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tenants")?;

        Ok(rows.iter().map(Self::row_to_tenant).collect())
    }

    fn row_to_tenant(row: &sqlx::sqlite::SqliteRow) -> Tenant {
        Tenant {
            id: row.get("id"),
            number: row.get("number"),
            name: row.get("name"),
        }
    }

    // ========================
    // Customer operations
    // ========================

    /// Insert a customer and assign its id.
    pub async fn save_customer(&self, customer: &mut Customer) -> Result<()> {
        let result = sqlx::query("INSERT INTO customers (tenant_id, number, name) VALUES (?, ?, ?)")
            .bind(customer.tenant_id)
            .bind(customer.number)
            .bind(&customer.name)
            .execute(&self.pool)
            .await
            .context("Failed to save customer")?;
        customer.id = result.last_insert_rowid();
        Ok(())
    }

    /// Find a customer by its number within the tenant with `tenant_number`.
    /// The lowest id wins if several match.
    pub async fn find_customer_by_numbers(
        &self,
        customer_number: CustomerNumber,
        tenant_number: TenantNumber,
    ) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.tenant_id, c.number, c.name
            FROM customers c
            JOIN tenants t ON t.id = c.tenant_id
            WHERE c.number = ? AND t.number = ?
            ORDER BY c.id
            LIMIT 1
            "#,
        )
        .bind(customer_number)
        .bind(tenant_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer by numbers")?;

        Ok(row.as_ref().map(Self::row_to_customer))
    }

    /// List customers of a tenant ordered by number.
    pub async fn list_customers(&self, tenant_id: TenantId) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT id, tenant_id, number, name FROM customers WHERE tenant_id = ? ORDER BY number, id",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")?;

        Ok(rows.iter().map(Self::row_to_customer).collect())
    }

    fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Customer {
        Customer {
            id: row.get("id"),
            tenant_id: row.get("tenant_id"),
            number: row.get("number"),
            name: row.get("name"),
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Insert a transaction and assign its id.
    pub async fn save_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (customer_id, amount_cents, booked_at, rollback_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(transaction.customer_id)
        .bind(transaction.amount_cents)
        .bind(transaction.booked_at.to_rfc3339())
        .bind(transaction.rollback_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        transaction.id = result.last_insert_rowid();
        Ok(())
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// Set `rollback_at` unless it is already set, in a single statement.
    /// Returns the stored transaction, or `None` if the id does not exist.
    pub async fn mark_rolled_back(
        &self,
        id: TransactionId,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE transactions
            SET rollback_at = COALESCE(rollback_at, ?)
            WHERE id = ?
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(at.to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to roll back transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// Fetch one page of transactions in `scope`, joined with their customer
    /// and tenant, ordered by transaction id.
    pub async fn fetch_entries(
        &self,
        scope: TransactionScope,
        page: PageRequest,
    ) -> Result<Vec<LedgerEntry>> {
        let offset = page.offset().context("Page offset out of range")?;
        let mut query = String::from(
            r#"
            SELECT
                tx.id, tx.customer_id, tx.amount_cents, tx.booked_at, tx.rollback_at,
                c.number AS customer_number, c.name AS customer_name,
                t.number AS tenant_number, t.name AS tenant_name
            FROM transactions tx
            JOIN customers c ON c.id = tx.customer_id
            JOIN tenants t ON t.id = c.tenant_id
            "#,
        );

        match scope {
            TransactionScope::All => {}
            TransactionScope::Tenant(_) => query.push_str(" WHERE t.number = ?"),
            TransactionScope::Customer { .. } => {
                query.push_str(" WHERE c.number = ? AND t.number = ?")
            }
        }
        query.push_str(" ORDER BY tx.id LIMIT ? OFFSET ?");

        let mut sql_query = sqlx::query(&query);
        match scope {
            TransactionScope::All => {}
            TransactionScope::Tenant(tenant_number) => {
                sql_query = sql_query.bind(tenant_number);
            }
            TransactionScope::Customer {
                customer_number,
                tenant_number,
            } => {
                sql_query = sql_query.bind(customer_number).bind(tenant_number);
            }
        }

        let rows = sql_query
            .bind(page.limit())
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch transaction page")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        Ok(LedgerEntry {
            transaction: Self::row_to_transaction(row)?,
            customer_number: row.get("customer_number"),
            customer_name: row.get("customer_name"),
            tenant_number: row.get("tenant_number"),
            tenant_name: row.get("tenant_name"),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let booked_at_str: String = row.get("booked_at");
        let rollback_at_str: Option<String> = row.get("rollback_at");

        Ok(Transaction {
            id: row.get("id"),
            customer_id: row.get("customer_id"),
            amount_cents: row.get("amount_cents"),
            booked_at: DateTime::parse_from_rfc3339(&booked_at_str)
                .context("Invalid booked_at timestamp")?
                .with_timezone(&Utc),
            rollback_at: rollback_at_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid rollback_at timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }
}
