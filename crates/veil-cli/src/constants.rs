//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, and used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Container or input file not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase or tampered container).
    pub const AUTH_FAILED: i32 = 5;

    /// Container is malformed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variable holding the passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "VEIL_PASSPHRASE";

/// File name of the default container under the data directory.
pub const DEFAULT_CONTAINER_NAME: &str = "container.veil";
