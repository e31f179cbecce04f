//! Random-access storage trait definition.
//!
//! An [`Overlay`](crate::Overlay) sits on top of any backend that implements
//! [`RandomAccess`]. The overlay owns the backend exclusively and serializes
//! every call, so implementations need no internal locking of their own.

use async_trait::async_trait;

use crate::error::Result;

/// Size information reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStat {
    /// Current length in bytes.
    pub size: u64,
}

/// A byte store addressed by offset.
///
/// All implementations must ensure:
/// - `read` fails with `VeilError::Io` rather than returning fewer bytes
///   than requested
/// - `write` past the current end grows the store, zero-filling any gap
/// - `del` of a range that reaches or passes the end truncates the store to
///   `offset`; a range wholly inside the store is overwritten with zeros
#[async_trait]
pub trait RandomAccess: Send {
    /// Read exactly `length` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::Io` if the range extends past the end or the
    /// backend fails.
    async fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>>;

    /// Write `data` starting at `offset`.
    async fn write(&mut self, offset: u64, data: &[u8]) -> Result<()>;

    /// Delete `length` bytes starting at `offset`.
    ///
    /// Pass `u64::MAX` as `length` to drop everything from `offset` on.
    async fn del(&mut self, offset: u64, length: u64) -> Result<()>;

    /// Report the current size.
    async fn stat(&mut self) -> Result<StorageStat>;
}

/// Whether deleting `length` bytes at `offset` reaches the end of a store of
/// `size` bytes, in which case the delete is a truncate.
pub(crate) fn del_reaches_end(offset: u64, length: u64, size: u64) -> bool {
    offset.saturating_add(length) >= size
}
