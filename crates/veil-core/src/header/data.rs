//! Data-cipher header: algorithm id and nonce.

use zeroize::Zeroize;

use super::format::{DATA_ALG_XCHACHA20_POLY1305, DATA_HEADER_BYTES, NONCE_LEN};
use crate::crypto::fill_random;
use crate::error::{Result, VeilError};

/// The 28-byte data-cipher header.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct DataHeader {
    alg: u32,
    nonce: [u8; NONCE_LEN],
}

impl DataHeader {
    /// XChaCha20-Poly1305 header with a random nonce.
    pub fn new() -> Result<Self> {
        let mut header = Self {
            alg: DATA_ALG_XCHACHA20_POLY1305,
            nonce: [0u8; NONCE_LEN],
        };
        header.rotate_nonce()?;
        Ok(header)
    }

    pub fn alg(&self) -> u32 {
        self.alg
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn set_alg(&mut self, alg: u32) -> Result<()> {
        self.alg = alg;
        self.rotate_nonce()
    }

    /// Replace the nonce with fresh random bytes. Called before every
    /// encryption.
    pub fn rotate_nonce(&mut self) -> Result<()> {
        fill_random(&mut self.nonce)
    }

    pub fn validate(&self) -> Result<()> {
        if self.alg != DATA_ALG_XCHACHA20_POLY1305 {
            return Err(VeilError::Format(format!(
                "unsupported data cipher algorithm id {}",
                self.alg
            )));
        }
        Ok(())
    }

    pub fn encode(&self) -> [u8; DATA_HEADER_BYTES] {
        let mut out = [0u8; DATA_HEADER_BYTES];
        out[0..4].copy_from_slice(&self.alg.to_le_bytes());
        out[4..].copy_from_slice(&self.nonce);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DATA_HEADER_BYTES {
            return Err(VeilError::Format(format!(
                "data header requires {} bytes, got {}",
                DATA_HEADER_BYTES,
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[4..DATA_HEADER_BYTES]);

        Ok(Self {
            alg: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_nonce_changes_nonce() {
        let mut header = DataHeader::new().unwrap();
        let before = *header.nonce();

        header.rotate_nonce().unwrap();

        assert_ne!(header.nonce(), &before);
        assert_eq!(header.alg(), DATA_ALG_XCHACHA20_POLY1305);
    }

    #[test]
    fn test_encode_layout() {
        let header = DataHeader::new().unwrap();
        let bytes = header.encode();

        assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&bytes[4..], header.nonce());
        assert_eq!(DataHeader::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn test_set_alg_rotates_nonce() {
        let mut header = DataHeader::new().unwrap();
        let before = *header.nonce();

        header.set_alg(9).unwrap();

        assert_ne!(header.nonce(), &before);
        assert!(matches!(header.validate(), Err(VeilError::Format(_))));
    }

    #[test]
    fn test_decode_short_input() {
        let result = DataHeader::decode(&[1, 0, 0, 0]);
        assert!(matches!(result, Err(VeilError::Format(_))));
    }
}
