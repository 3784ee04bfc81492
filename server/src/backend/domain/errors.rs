//! Error taxonomy shared by every domain operation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No meal credit remaining")]
    InsufficientBalance,

    #[error("Amount must be a positive whole number of meals")]
    InvalidAmount,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            DomainError::InvalidAmount => "INVALID_AMOUNT",
            DomainError::Unauthenticated => "UNAUTHENTICATED",
            DomainError::Validation(_) => "VALIDATION",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_convert_to_backend_unavailable() {
        fn failing() -> DomainResult<()> {
            let result: anyhow::Result<()> = Err(anyhow::anyhow!("database is locked"));
            result?;
            Ok(())
        }

        let err = failing().unwrap_err();
        assert_eq!(err.code(), "BACKEND_UNAVAILABLE");
        assert!(err.to_string().contains("database is locked"));
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            DomainError::not_found("student").code(),
            DomainError::InsufficientBalance.code(),
            DomainError::InvalidAmount.code(),
            DomainError::Unauthenticated.code(),
            DomainError::Validation("x".into()).code(),
            DomainError::Conflict("x".into()).code(),
        ];
        let mut unique = codes.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
    }
}
