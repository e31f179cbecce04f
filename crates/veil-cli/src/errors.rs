//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use veil_core::VeilError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (container, input file)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase or tampered container)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Container is malformed
    Integrity(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::Integrity(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Integrity(_) => exit_codes::INTEGRITY_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

/// Convert a core error into the CLI error carrying the right exit code.
///
/// Errors without a dedicated exit code stay plain `anyhow` errors.
pub fn from_veil(err: VeilError) -> anyhow::Error {
    if err.is_authentication() {
        return CliError::auth_failed_with_hint(
            "Incorrect passphrase, or the container has been tampered with.",
            "Check the passphrase (or VEIL_PASSPHRASE) and try again.",
        )
        .into();
    }
    match err {
        VeilError::Format(message) => {
            CliError::Integrity(format!("Not a valid veil container: {}", message)).into()
        }
        VeilError::InvalidInput(message) => CliError::InvalidInput(message).into(),
        other => anyhow::Error::new(other),
    }
}
