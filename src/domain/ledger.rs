use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    serialize_decimal, Cents, CustomerNumber, Operation, TenantNumber, Transaction, TransactionId,
};

/// Display format for timestamps in statements and audit records.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A transaction together with the customer and tenant it belongs to,
/// as returned by a page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub transaction: Transaction,
    pub customer_number: CustomerNumber,
    pub customer_name: String,
    pub tenant_number: TenantNumber,
    pub tenant_name: String,
}

impl LedgerEntry {
    /// Composite grouping key. Customer numbers repeat across tenants.
    pub fn account_key(&self) -> AccountKey {
        AccountKey {
            customer_number: self.customer_number,
            tenant_number: self.tenant_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountKey {
    pub customer_number: CustomerNumber,
    pub tenant_number: TenantNumber,
}

/// One line of an account statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementItem {
    pub id: TransactionId,
    #[serde(rename = "amount", serialize_with = "serialize_decimal")]
    pub amount_cents: Cents,
    pub operation: Operation,
    pub booked_at: String,
    /// Empty string while the transaction is active
    pub rollback_at: String,
}

/// Balance of one (customer, tenant) account over the fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatement {
    pub tenant_name: String,
    pub customer_name: String,
    #[serde(rename = "accountBalance", serialize_with = "serialize_decimal")]
    pub account_balance_cents: Cents,
    pub transactions: Vec<StatementItem>,
}

/// One flat audit line per transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub tenant_name: String,
    pub customer_name: String,
    #[serde(rename = "amount", serialize_with = "serialize_decimal")]
    pub amount_cents: Cents,
    pub operation: Operation,
    pub time: String,
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Group entries by account, keeping groups in order of first appearance
/// and entries in page order within each group.
pub fn group_entries(entries: &[LedgerEntry]) -> Vec<Vec<&LedgerEntry>> {
    let mut index: HashMap<AccountKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&LedgerEntry>> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.account_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(entry);
    }

    groups
}

/// Compute the balance of a group: booked amounts minus rolled-back amounts.
pub fn compute_balance<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Cents {
    entries
        .into_iter()
        .fold(0, |balance, entry| balance + entry.transaction.signed_amount())
}

/// Build the list view: one statement per account present in the page.
///
/// The balance only covers the transactions in `entries`. A caller that
/// wants the full history balance must fetch a page that holds all of it.
pub fn build_statements(entries: &[LedgerEntry]) -> Vec<AccountStatement> {
    group_entries(entries)
        .into_iter()
        .filter_map(|group| {
            let first = group.first()?;
            Some(AccountStatement {
                tenant_name: first.tenant_name.clone(),
                customer_name: first.customer_name.clone(),
                account_balance_cents: compute_balance(group.iter().copied()),
                transactions: group.iter().map(|e| statement_item(&e.transaction)).collect(),
            })
        })
        .collect()
}

/// Build the audit view: every transaction flattened, accounts contiguous.
pub fn build_audit_trail(entries: &[LedgerEntry]) -> Vec<AuditRecord> {
    group_entries(entries)
        .into_iter()
        .flatten()
        .map(|entry| AuditRecord {
            tenant_name: entry.tenant_name.clone(),
            customer_name: entry.customer_name.clone(),
            amount_cents: entry.transaction.amount_cents,
            operation: entry.transaction.operation(),
            time: format_timestamp(&entry.transaction.booked_at),
        })
        .collect()
}

fn statement_item(transaction: &Transaction) -> StatementItem {
    StatementItem {
        id: transaction.id,
        amount_cents: transaction.amount_cents,
        operation: transaction.operation(),
        booked_at: format_timestamp(&transaction.booked_at),
        rollback_at: transaction
            .rollback_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default(),
    }
}
