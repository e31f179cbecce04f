//! # Veil Core
//!
//! Password-encrypted overlay over a random-access byte store.
//!
//! An [`Overlay`] keeps a single payload in any [`RandomAccess`] backend,
//! sealed with XChaCha20-Poly1305 under a key derived from a passphrase with
//! Argon2id. The container is a fixed 60-byte header followed by the
//! ciphertext and its tag.
//!
//! ## Architecture
//!
//! - **header**: container byte layout, encoding and validation
//! - **crypto**: passphrase handling, key derivation, AEAD
//! - **storage**: random-access backends (memory, file)
//! - **overlay**: the open/init/read/write/destroy state machine
//!
//! ## Example
//!
//! ```no_run
//! use veil_core::{KdfSettings, MemoryStorage, Overlay};
//!
//! # async fn run() -> veil_core::Result<()> {
//! let storage = MemoryStorage::new();
//! let settings = KdfSettings::INTERACTIVE;
//! let overlay = Overlay::create(storage.clone(), b"secret".to_vec(), settings).await?;
//! overlay.write(b"Hello world").await?;
//!
//! let reopened = Overlay::open_existing(storage, b"secret".to_vec()).await?;
//! assert_eq!(reopened.read().await?.as_slice(), b"Hello world");
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod header;
pub mod overlay;
pub mod storage;

pub use crypto::{KdfSettings, Passphrase, Preset};
pub use error::{Result, VeilError};
pub use header::{ContainerHeader, HEADER_BYTES, TAG_LEN};
pub use overlay::{Overlay, OverlayState};
pub use storage::{FileStorage, MemoryStorage, RandomAccess, StorageStat};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
