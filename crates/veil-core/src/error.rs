//! Error types for Veil core operations.
//!
//! Every error returned by an [`Overlay`](crate::Overlay) is terminal for that
//! instance: the overlay tears itself down (zeroing its secrets) before the
//! error reaches the caller. The CLI layer maps these to user-facing messages.

use thiserror::Error;

/// Result type alias for Veil operations.
pub type Result<T> = std::result::Result<T, VeilError>;

/// Core error type for Veil operations.
///
/// The type is `Clone` because the outcome of opening a container is
/// memoized and handed to every caller that waited on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VeilError {
    /// Container header or data segment is malformed
    #[error("Format error: {0}")]
    Format(String),

    /// AEAD tag did not verify (wrong passphrase or tampered data)
    #[error("Authentication failed: incorrect passphrase or corrupted container")]
    Authentication,

    /// Key derivation rejected its parameters or ran out of resources
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Storage backend error
    #[error("I/O error: {0}")]
    Io(String),

    /// Operation attempted after the overlay was torn down
    #[error("Overlay destroyed")]
    Destroyed,

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Randomness source or cipher failure
    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl VeilError {
    /// Whether this error means the passphrase was wrong (or the data was
    /// tampered with), so a caller may reasonably re-prompt.
    pub fn is_authentication(&self) -> bool {
        matches!(self, VeilError::Authentication)
    }
}

impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}
