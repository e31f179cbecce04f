//! Passphrase input from the environment or an interactive prompt.

use std::io::IsTerminal;

use dialoguer::Password;
use veil_core::Passphrase;

use crate::constants::PASSPHRASE_ENV;

/// The prompt is drawn on stderr, so stdin may be a pipe carrying the payload.
fn interactive() -> bool {
    std::io::stderr().is_terminal()
}

fn from_env() -> Option<Passphrase> {
    let value = std::env::var(PASSPHRASE_ENV).ok()?;
    if value.is_empty() {
        return None;
    }
    Some(Passphrase::from(value))
}

/// Prompt for passphrase, or read from VEIL_PASSPHRASE env var.
pub fn prompt_passphrase() -> anyhow::Result<Passphrase> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }
    if !interactive() {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ));
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Passphrase::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for passphrase with confirmation (for init), or read from
/// VEIL_PASSPHRASE env var.
pub fn prompt_init_passphrase() -> anyhow::Result<Passphrase> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }
    if !interactive() {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ));
    }
    Password::new()
        .with_prompt("Enter passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(Passphrase::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}
