use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, CustomerId};

pub type TransactionId = i64;

/// Operation tag derived from a transaction's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Active booking, `rollback_at` is unset.
    Book,
    /// Reversed booking, contributes its amount with inverted sign.
    Rollback,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Book => "BOOK",
            Operation::Rollback => "ROLLBACK",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A signed monetary entry owned by one customer.
///
/// Transactions are never deleted. The only mutation is the one-way
/// transition from booked to rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    /// Signed amount in cents; negative bookings are legal.
    pub amount_cents: Cents,
    /// Set at creation, never changed afterwards
    pub booked_at: DateTime<Utc>,
    /// Set at most once by a rollback
    pub rollback_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new booking. The id is assigned by the repository.
    pub fn book(customer_id: CustomerId, amount_cents: Cents, booked_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            customer_id,
            amount_cents,
            booked_at,
            rollback_at: None,
        }
    }

    pub fn is_rolled_back(&self) -> bool {
        self.rollback_at.is_some()
    }

    pub fn operation(&self) -> Operation {
        if self.is_rolled_back() {
            Operation::Rollback
        } else {
            Operation::Book
        }
    }

    /// Contribution of this transaction to an account balance.
    pub fn signed_amount(&self) -> Cents {
        match self.operation() {
            Operation::Book => self.amount_cents,
            Operation::Rollback => -self.amount_cents,
        }
    }

    /// Mark as rolled back at `at`. A transaction that is already rolled back
    /// keeps its original timestamp. Returns true if the state changed.
    pub fn mark_rolled_back(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_rolled_back() {
            return false;
        }
        self.rollback_at = Some(at);
        true
    }
}
