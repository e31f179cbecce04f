//! The full 60-byte container header.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::data::DataHeader;
use super::format::{
    DATA_HEADER_OFFSET, FORMAT_VERSION, HEADER_BYTES, KEY_HEADER_BYTES, KEY_HEADER_OFFSET,
    VERSION_BYTES,
};
use super::key::KeyHeader;
use crate::crypto::KdfSettings;
use crate::error::{Result, VeilError};
use crate::storage::RandomAccess;

/// Version, key-derivation header and data-cipher header, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ContainerHeader {
    version: u32,
    key: KeyHeader,
    data: DataHeader,
}

impl ContainerHeader {
    /// Fresh header for a new container: current version, random salt and
    /// random nonce.
    pub fn new(settings: KdfSettings) -> Result<Self> {
        Ok(Self {
            version: FORMAT_VERSION,
            key: KeyHeader::new(settings)?,
            data: DataHeader::new()?,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn key_header(&self) -> &KeyHeader {
        &self.key
    }

    pub fn key_header_mut(&mut self) -> &mut KeyHeader {
        &mut self.key
    }

    pub fn data_header(&self) -> &DataHeader {
        &self.data
    }

    pub fn data_header_mut(&mut self) -> &mut DataHeader {
        &mut self.data
    }

    /// Associated data bound into every ciphertext: the encoded
    /// key-derivation header.
    pub fn aad(&self) -> [u8; KEY_HEADER_BYTES] {
        self.key.encode()
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(VeilError::Format(format!(
                "unsupported container version {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        self.key.validate()?;
        self.data.validate()
    }

    pub fn encode(&self) -> [u8; HEADER_BYTES] {
        let mut out = [0u8; HEADER_BYTES];
        out[..VERSION_BYTES].copy_from_slice(&self.version.to_le_bytes());
        out[KEY_HEADER_OFFSET..DATA_HEADER_OFFSET].copy_from_slice(&self.key.encode());
        out[DATA_HEADER_OFFSET..].copy_from_slice(&self.data.encode());
        out
    }

    /// Decode from the first `HEADER_BYTES` of `bytes` without validating.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_BYTES {
            return Err(VeilError::Format(format!(
                "container header requires {} bytes, got {}",
                HEADER_BYTES,
                bytes.len()
            )));
        }

        Ok(Self {
            version: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            key: KeyHeader::decode(&bytes[KEY_HEADER_OFFSET..DATA_HEADER_OFFSET])?,
            data: DataHeader::decode(&bytes[DATA_HEADER_OFFSET..HEADER_BYTES])?,
        })
    }

    /// Read, decode and validate the header at offset 0 of `storage`.
    ///
    /// Storage smaller than a header is reported as a format error rather
    /// than whatever short-read error the backend would produce.
    pub async fn read_from<S: RandomAccess + ?Sized>(storage: &mut S) -> Result<Self> {
        let stat = storage.stat().await?;
        if stat.size < HEADER_BYTES as u64 {
            return Err(VeilError::Format(format!(
                "storage holds {} bytes, smaller than the {}-byte container header",
                stat.size, HEADER_BYTES
            )));
        }

        let bytes = storage.read(0, HEADER_BYTES as u64).await?;
        let header = Self::decode(&bytes)?;
        header.validate()?;
        Ok(header)
    }
}
