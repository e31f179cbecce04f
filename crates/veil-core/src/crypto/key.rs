//! Key derivation using Argon2id.
//!
//! Parameters follow libsodium's `crypto_pwhash` conventions so containers
//! are byte-compatible with it: `opslimit` is the Argon2 iteration count,
//! `memlimit` is a byte count (divided down to KiB for Argon2), and
//! parallelism is fixed at 1.

use std::str::FromStr;

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::crypto::Passphrase;
use crate::error::{Result, VeilError};
use crate::header::{KeyHeader, KDF_ALG_ARGON2ID13, KEY_LEN};

/// Argon2 lanes. libsodium always uses a single lane.
const ARGON2_PARALLELISM: u32 = 1;

/// `opslimit` for interactive use (libsodium `OPSLIMIT_INTERACTIVE`).
pub const OPSLIMIT_INTERACTIVE: u32 = 2;
/// `memlimit` for interactive use: 64 MiB.
pub const MEMLIMIT_INTERACTIVE: u32 = 64 * 1024 * 1024;

/// `opslimit` for moderately sensitive data.
pub const OPSLIMIT_MODERATE: u32 = 3;
/// `memlimit` for moderately sensitive data: 256 MiB.
pub const MEMLIMIT_MODERATE: u32 = 256 * 1024 * 1024;

/// `opslimit` for highly sensitive data.
pub const OPSLIMIT_SENSITIVE: u32 = 4;
/// `memlimit` for highly sensitive data: 1 GiB.
pub const MEMLIMIT_SENSITIVE: u32 = 1024 * 1024 * 1024;

/// Cost parameters written into a new container's key-derivation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfSettings {
    /// Argon2 iterations.
    pub opslimit: u32,
    /// Argon2 memory in bytes.
    pub memlimit: u32,
}

impl KdfSettings {
    pub const INTERACTIVE: Self = Self::new(OPSLIMIT_INTERACTIVE, MEMLIMIT_INTERACTIVE);
    pub const MODERATE: Self = Self::new(OPSLIMIT_MODERATE, MEMLIMIT_MODERATE);
    pub const SENSITIVE: Self = Self::new(OPSLIMIT_SENSITIVE, MEMLIMIT_SENSITIVE);

    pub const fn new(opslimit: u32, memlimit: u32) -> Self {
        Self { opslimit, memlimit }
    }

    /// Both limits must be set.
    ///
    /// Range checks beyond that are left to Argon2 itself, which reports
    /// them as [`VeilError::KeyDerivation`] when the container is opened.
    pub fn validate(&self) -> Result<()> {
        if self.opslimit == 0 {
            return Err(VeilError::InvalidInput(
                "opslimit must be greater than zero".to_string(),
            ));
        }
        if self.memlimit == 0 {
            return Err(VeilError::InvalidInput(
                "memlimit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Named cost tiers, from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Interactive,
    #[default]
    Moderate,
    Sensitive,
}

impl Preset {
    pub const fn settings(self) -> KdfSettings {
        match self {
            Preset::Interactive => KdfSettings::INTERACTIVE,
            Preset::Moderate => KdfSettings::MODERATE,
            Preset::Sensitive => KdfSettings::SENSITIVE,
        }
    }
}

impl FromStr for Preset {
    type Err = VeilError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" => Ok(Preset::Interactive),
            "moderate" => Ok(Preset::Moderate),
            "sensitive" => Ok(Preset::Sensitive),
            other => Err(VeilError::InvalidInput(format!(
                "unknown preset '{}' (expected interactive, moderate or sensitive)",
                other
            ))),
        }
    }
}

/// A cryptographic key derived from a passphrase.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped, reducing the window of exposure.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    /// The raw key bytes (zeroized on drop)
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    fn zeroed() -> Self {
        Self { key: [0u8; KEY_LEN] }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the container key from a passphrase and a key-derivation header.
///
/// CPU- and memory-hard; callers on an async runtime should run it on a
/// blocking thread.
///
/// # Errors
///
/// Returns `VeilError::KeyDerivation` if the header names an unsupported
/// algorithm, the cost parameters are out of Argon2's range, or hashing fails.
/// Returns `VeilError::InvalidInput` if the passphrase is empty.
pub fn derive_key(passphrase: &Passphrase, header: &KeyHeader) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(VeilError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    if header.alg() != KDF_ALG_ARGON2ID13 {
        return Err(VeilError::KeyDerivation(format!(
            "unsupported key derivation algorithm id {}",
            header.alg()
        )));
    }

    let params = argon2::Params::new(
        header.memlimit() / 1024,
        header.opslimit(),
        ARGON2_PARALLELISM,
        Some(KEY_LEN),
    )
    .map_err(|e| VeilError::KeyDerivation(format!("invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = DerivedKey::zeroed();
    argon2
        .hash_password_into(passphrase.expose(), header.salt(), &mut key.key)
        .map_err(|e| VeilError::KeyDerivation(format!("Argon2id failed: {}", e)))?;

    Ok(key)
}
