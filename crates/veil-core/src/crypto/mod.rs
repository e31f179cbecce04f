//! Cryptographic primitives: passphrase handling, Argon2id key derivation
//! and XChaCha20-Poly1305.

pub mod aead;
pub mod key;
pub mod secret;

pub use aead::{decrypt, encrypt};
pub use key::{derive_key, DerivedKey, KdfSettings, Preset};
pub use secret::Passphrase;

use crate::error::{Result, VeilError};

/// Fill `buf` from the operating system's CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf)
        .map_err(|e| VeilError::Crypto(format!("random number generation failed: {}", e)))
}
