//! Error handling for the nmsa CLI

use std::path::PathBuf;
use thiserror::Error;

use nmsa_core::AlignError;

/// Main error type for nmsa CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Resource error: {message}")]
    Resource { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn resource<S: Into<String>>(message: S) -> Self {
        Self::Resource { message: message.into() }
    }
}

impl From<AlignError> for CliError {
    fn from(err: AlignError) -> Self {
        match err {
            AlignError::InvalidInput(message) => Self::invalid_input(message),
            AlignError::Io(err) => Self::from(err),
            AlignError::Parse(message) => Self::parse("input".to_string(), message),
            err @ (AlignError::TableTooLarge { .. }
            | AlignError::BudgetExceeded { .. }
            | AlignError::DepthExceeded { .. }) => Self::resource(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Pass at least one sequence, either as arguments or with --fasta\n\
                 • Only A, C, G and T are scored; any other character is read as a gap",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your nmsa.toml configuration file\n\
                 • Use 'nmsa config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Resource { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Raise --max-cells or --max-evaluations if memory allows\n\
                 • Use --strategy iterative or --strategy parallel for long inputs\n\
                 • Use --layout sparse with the recursive strategy to store only visited cells\n\
                 • Fewer or shorter sequences shrink the table exponentially",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
