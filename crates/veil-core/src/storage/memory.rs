//! In-memory storage backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::traits::{del_reaches_end, RandomAccess, StorageStat};
use crate::error::{Result, VeilError};

/// A growable byte buffer.
///
/// Clones share the same buffer, so a test can hand one clone to an overlay
/// and inspect the raw container bytes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(bytes)),
        }
    }

    /// Copy of the current contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_index(value: u64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| VeilError::Io(format!("offset {} exceeds addressable memory", value)))
}

#[async_trait]
impl RandomAccess for MemoryStorage {
    async fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let bytes = self.lock();
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= bytes.len() as u64)
            .ok_or_else(|| {
                VeilError::Io(format!(
                    "could not read {} bytes at offset {} from {}-byte store",
                    length,
                    offset,
                    bytes.len()
                ))
            })?;
        Ok(bytes[to_index(offset)?..to_index(end)?].to_vec())
    }

    async fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let start = to_index(offset)?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| VeilError::Io("write extends past addressable memory".to_string()))?;

        let mut bytes = self.lock();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    async fn del(&mut self, offset: u64, length: u64) -> Result<()> {
        let mut bytes = self.lock();
        let size = bytes.len() as u64;

        if del_reaches_end(offset, length, size) {
            if offset < size {
                bytes.truncate(to_index(offset)?);
            }
        } else {
            let start = to_index(offset)?;
            let end = to_index(offset + length)?;
            bytes[start..end].fill(0);
        }
        Ok(())
    }

    async fn stat(&mut self) -> Result<StorageStat> {
        Ok(StorageStat {
            size: self.lock().len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let mut storage = MemoryStorage::new();
        storage.write(0, b"hello world").await.unwrap();

        assert_eq!(storage.read(6, 5).await.unwrap(), b"world");
        assert_eq!(storage.stat().await.unwrap().size, 11);
    }

    #[tokio::test]
    async fn test_write_past_end_zero_fills() {
        let mut storage = MemoryStorage::new();
        storage.write(4, b"ab").await.unwrap();

        assert_eq!(storage.to_vec(), vec![0, 0, 0, 0, b'a', b'b']);
    }

    #[tokio::test]
    async fn test_read_past_end_fails() {
        let mut storage = MemoryStorage::from_bytes(vec![1, 2, 3]);

        let result = storage.read(2, 2).await;
        assert!(matches!(result, Err(VeilError::Io(_))));
    }

    #[tokio::test]
    async fn test_del_to_end_truncates() {
        let mut storage = MemoryStorage::from_bytes(b"0123456789".to_vec());
        storage.del(4, u64::MAX).await.unwrap();

        assert_eq!(storage.to_vec(), b"0123");
    }

    #[tokio::test]
    async fn test_del_inside_zero_fills() {
        let mut storage = MemoryStorage::from_bytes(b"0123456789".to_vec());
        storage.del(2, 3).await.unwrap();

        assert_eq!(storage.to_vec(), b"01\0\0\056789");
    }

    #[tokio::test]
    async fn test_del_past_end_is_noop() {
        let mut storage = MemoryStorage::from_bytes(b"0123".to_vec());
        storage.del(10, u64::MAX).await.unwrap();

        assert_eq!(storage.len(), 4);
    }

    #[tokio::test]
    async fn test_clones_share_buffer() {
        let mut writer = MemoryStorage::new();
        let observer = writer.clone();

        writer.write(0, b"shared").await.unwrap();
        assert_eq!(observer.to_vec(), b"shared");
    }
}
