use clap::ValueEnum;
use serde::Serialize;

use crate::application::AppError;
use crate::domain::{format_cents, format_timestamp, AccountStatement, AuditRecord, Transaction};

/// How read commands print their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Response wrapper used for every JSON reply, successful or not.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            status: "OK",
            data,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Envelope<String> {
    pub fn from_error(err: &AppError) -> Self {
        let kind = err.kind();
        Self {
            code: kind.status_code(),
            status: kind.status(),
            data: err.public_message(),
        }
    }
}

pub fn print_transaction(transaction: &Transaction) {
    println!("Transaction: {}", transaction.id);
    println!("  Amount:      {}", format_cents(transaction.amount_cents));
    println!("  Operation:   {}", transaction.operation());
    println!("  Booked at:   {}", format_timestamp(&transaction.booked_at));
    if let Some(rollback_at) = &transaction.rollback_at {
        println!("  Rollback at: {}", format_timestamp(rollback_at));
    }
}

pub fn print_statements(statements: &[AccountStatement]) {
    if statements.is_empty() {
        println!("No transactions found.");
        return;
    }

    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} / {}  balance: {}",
            statement.tenant_name,
            statement.customer_name,
            format_cents(statement.account_balance_cents)
        );
        println!(
            "  {:>8} {:>12} {:<9} {:<20} {:<20}",
            "ID", "AMOUNT", "OPERATION", "BOOKED AT", "ROLLBACK AT"
        );
        println!("  {}", "-".repeat(72));
        for item in &statement.transactions {
            println!(
                "  {:>8} {:>12} {:<9} {:<20} {:<20}",
                item.id,
                format_cents(item.amount_cents),
                item.operation,
                item.booked_at,
                item.rollback_at
            );
        }
    }
}

pub fn print_audit(records: &[AuditRecord]) {
    if records.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<20} {:<30} {:<30} {:>12} {:<9}",
        "TIME", "TENANT", "CUSTOMER", "AMOUNT", "OPERATION"
    );
    println!("{}", "-".repeat(105));
    for record in records {
        println!(
            "{:<20} {:<30} {:<30} {:>12} {:<9}",
            record.time,
            truncate(&record.tenant_name, 30),
            truncate(&record.customer_name, 30),
            format_cents(record.amount_cents),
            record.operation
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
