//! Error type shared by every stage of an alignment run

use thiserror::Error;

/// Errors that can occur while preparing or solving an alignment
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input too large for the configured memory bound; rejected before allocation
    #[error("Table of {cells} cells exceeds the configured limit of {limit}")]
    TableTooLarge { cells: u128, limit: usize },

    #[error("Evaluation budget of {limit} cursor tuples exhausted")]
    BudgetExceeded { limit: u64 },

    #[error("Recursion depth limit of {limit} reached")]
    DepthExceeded { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AlignError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result type for alignment operations
pub type AlignResult<T> = Result<T, AlignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AlignError::invalid_input("no sequences supplied");
        assert_eq!(err.to_string(), "Invalid input: no sequences supplied");

        let err = AlignError::TableTooLarge { cells: 1_000, limit: 10 };
        assert_eq!(
            err.to_string(),
            "Table of 1000 cells exceeds the configured limit of 10"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AlignError = io_err.into();
        assert!(matches!(err, AlignError::Io(_)));
    }
}
