//! File-backed storage using `tokio::fs`.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::traits::{del_reaches_end, RandomAccess, StorageStat};
use crate::error::{Result, VeilError};

/// A single file addressed by offset.
#[derive(Debug)]
pub struct FileStorage {
    file: File,
    path: PathBuf,
}

impl FileStorage {
    /// Open `path` for reading and writing, creating an empty file if it
    /// does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| VeilError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self { file, path })
    }

    /// Open an existing file for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::Io` if the file does not exist.
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .await
            .map_err(|e| VeilError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn size(&self) -> Result<u64> {
        Ok(self.file.metadata().await?.len())
    }
}

#[async_trait]
impl RandomAccess for FileStorage {
    async fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let size = self.size().await?;
        if offset.checked_add(length).map_or(true, |end| end > size) {
            return Err(VeilError::Io(format!(
                "could not read {} bytes at offset {} from {}-byte file {}",
                length,
                offset,
                size,
                self.path.display()
            )));
        }

        let length = usize::try_from(length)
            .map_err(|_| VeilError::Io(format!("read of {} bytes is too large", length)))?;
        let mut buf = vec![0u8; length];
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.write_all(data).await?;
        self.file.flush().await?;
        Ok(())
    }

    async fn del(&mut self, offset: u64, length: u64) -> Result<()> {
        let size = self.size().await?;

        if del_reaches_end(offset, length, size) {
            if offset < size {
                self.file.set_len(offset).await?;
            }
            return Ok(());
        }

        let length = usize::try_from(length)
            .map_err(|_| VeilError::Io(format!("delete of {} bytes is too large", length)))?;
        self.write(offset, &vec![0u8; length]).await
    }

    async fn stat(&mut self) -> Result<StorageStat> {
        Ok(StorageStat {
            size: self.size().await?,
        })
    }
}
