use thiserror::Error;

use crate::domain::{CustomerNumber, TenantNumber, TransactionId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Tenant with tenantNumber {0} not found")]
    TenantNotFound(TenantNumber),

    #[error(
        "Customer with tenantNumber {tenant_number} and customerNumber {customer_number} not found"
    )]
    CustomerNotFound {
        customer_number: CustomerNumber,
        tenant_number: TenantNumber,
    },

    #[error("Transaction with id {0} not found")]
    TransactionNotFound(TransactionId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Tenant already exists: {0}")]
    TenantAlreadyExists(TenantNumber),

    #[error(
        "Customer {customer_number} already exists in tenant {tenant_number}"
    )]
    CustomerAlreadyExists {
        customer_number: CustomerNumber,
        tenant_number: TenantNumber,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Coarse failure category a boundary translates into its own protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "BAD_REQUEST",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::TenantNotFound(_)
            | AppError::CustomerNotFound { .. }
            | AppError::TransactionNotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::TenantAlreadyExists(_) | AppError::CustomerAlreadyExists { .. } => {
                ErrorKind::Conflict
            }
            AppError::Database(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Message safe to show to a client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal Server Error".to_string(),
            _ => self.to_string(),
        }
    }
}
