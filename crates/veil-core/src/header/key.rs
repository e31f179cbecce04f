//! Key-derivation header: algorithm id, Argon2 costs and salt.

use zeroize::Zeroize;

use super::format::{KDF_ALG_ARGON2ID13, KEY_HEADER_BYTES, SALT_LEN};
use crate::crypto::{fill_random, KdfSettings};
use crate::error::{Result, VeilError};

/// The 28-byte key-derivation header.
///
/// Changing any field draws a fresh salt, so a header never pairs new cost
/// parameters with a salt that was used under different ones.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct KeyHeader {
    alg: i32,
    opslimit: u32,
    memlimit: u32,
    salt: [u8; SALT_LEN],
}

impl KeyHeader {
    /// Argon2id13 header with the given costs and a random salt.
    pub fn new(settings: KdfSettings) -> Result<Self> {
        let mut header = Self {
            alg: KDF_ALG_ARGON2ID13,
            opslimit: settings.opslimit,
            memlimit: settings.memlimit,
            salt: [0u8; SALT_LEN],
        };
        header.rotate_salt()?;
        Ok(header)
    }

    pub fn alg(&self) -> i32 {
        self.alg
    }

    pub fn opslimit(&self) -> u32 {
        self.opslimit
    }

    pub fn memlimit(&self) -> u32 {
        self.memlimit
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn settings(&self) -> KdfSettings {
        KdfSettings::new(self.opslimit, self.memlimit)
    }

    pub fn set_alg(&mut self, alg: i32) -> Result<()> {
        self.alg = alg;
        self.rotate_salt()
    }

    pub fn set_opslimit(&mut self, opslimit: u32) -> Result<()> {
        self.opslimit = opslimit;
        self.rotate_salt()
    }

    pub fn set_memlimit(&mut self, memlimit: u32) -> Result<()> {
        self.memlimit = memlimit;
        self.rotate_salt()
    }

    /// Replace the salt with fresh random bytes.
    pub fn rotate_salt(&mut self) -> Result<()> {
        fill_random(&mut self.salt)
    }

    pub fn validate(&self) -> Result<()> {
        if self.alg != KDF_ALG_ARGON2ID13 {
            return Err(VeilError::Format(format!(
                "unsupported key derivation algorithm id {}",
                self.alg
            )));
        }
        Ok(())
    }

    pub fn encode(&self) -> [u8; KEY_HEADER_BYTES] {
        let mut out = [0u8; KEY_HEADER_BYTES];
        out[0..4].copy_from_slice(&self.alg.to_le_bytes());
        out[4..8].copy_from_slice(&self.opslimit.to_le_bytes());
        out[8..12].copy_from_slice(&self.memlimit.to_le_bytes());
        out[12..].copy_from_slice(&self.salt);
        out
    }

    /// Decode from the first `KEY_HEADER_BYTES` of `bytes`.
    ///
    /// Field values are not checked here; see [`KeyHeader::validate`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; KEY_HEADER_BYTES] = bytes
            .get(..KEY_HEADER_BYTES)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                VeilError::Format(format!(
                    "key header requires {} bytes, got {}",
                    KEY_HEADER_BYTES,
                    bytes.len()
                ))
            })?;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[12..]);

        Ok(Self {
            alg: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            opslimit: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            memlimit: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            salt,
        })
    }
}

impl std::fmt::Debug for KeyHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHeader")
            .field("alg", &self.alg)
            .field("opslimit", &self.opslimit)
            .field("memlimit", &self.memlimit)
            .finish_non_exhaustive()
    }
}
