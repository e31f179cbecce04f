//! Password-encrypted overlay over a [`RandomAccess`] store.
//!
//! The overlay keeps one encrypted payload in its storage, preceded by a
//! 60-byte [`ContainerHeader`]. It moves through these states:
//!
//! ```text
//! Idle --open()--> Opening --key derived--> Ready
//!   \                 |                       |
//!    `----------------+-----------------------+--> Destroyed
//! ```
//!
//! `open` runs at most once per instance. Every caller that triggers or waits
//! on it receives the same outcome. Any error from any operation tears the
//! overlay down before it is returned, and every later call fails with
//! [`VeilError::Destroyed`].

mod secrets;

pub use secrets::OverlayState;

use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{aead, derive_key, DerivedKey, KdfSettings, Passphrase};
use crate::error::{Result, VeilError};
use crate::header::{ContainerHeader, HEADER_BYTES, TAG_LEN};
use crate::storage::RandomAccess;
use secrets::Secrets;

/// An encrypted view of a single payload stored in `S`.
pub struct Overlay<S> {
    /// FIFO; held only across storage calls.
    storage: Mutex<S>,
    opened: OnceCell<Result<()>>,
    secrets: StdMutex<Secrets>,
}

impl<S: RandomAccess> Overlay<S> {
    /// Wrap `storage`, taking ownership of `passphrase`.
    ///
    /// Nothing is read until the first operation that needs the key.
    pub fn new(storage: S, passphrase: impl Into<Passphrase>) -> Self {
        Self {
            storage: Mutex::new(storage),
            opened: OnceCell::new(),
            secrets: StdMutex::new(Secrets::new(passphrase.into())),
        }
    }

    /// Initialize a new container in `storage` and open it.
    pub async fn create(
        storage: S,
        passphrase: impl Into<Passphrase>,
        settings: KdfSettings,
    ) -> Result<Self> {
        let overlay = Self::new(storage, passphrase);
        overlay.init(settings).await?;
        Ok(overlay)
    }

    /// Open the container already present in `storage`.
    pub async fn open_existing(storage: S, passphrase: impl Into<Passphrase>) -> Result<Self> {
        let overlay = Self::new(storage, passphrase);
        overlay.open().await?;
        Ok(overlay)
    }

    pub fn state(&self) -> OverlayState {
        self.secrets().state
    }

    /// Whether the caller's passphrase is still held. It is released as
    /// soon as the key has been derived.
    pub fn holds_passphrase(&self) -> bool {
        self.secrets().passphrase.is_some()
    }

    /// Write a fresh header to offset 0 and open the container with it.
    ///
    /// Any ciphertext already in the storage is left in place; it was sealed
    /// under a different key and will fail authentication until the next
    /// [`Overlay::write`] replaces it.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::InvalidInput` if either limit is zero or if the
    /// overlay has already started opening.
    pub async fn init(&self, settings: KdfSettings) -> Result<()> {
        self.ensure_live()?;
        self.check(settings.validate())?;

        if self.state() != OverlayState::Idle || self.opened.initialized() {
            return Err(self.fail(VeilError::InvalidInput(
                "container already opened; init must precede every other operation".to_string(),
            )));
        }

        let encoded = {
            let scratch = self.check(ContainerHeader::new(settings))?;
            Zeroizing::new(scratch.encode())
        };

        {
            let mut storage = self.storage.lock().await;
            self.ensure_live()?;
            self.check(storage.write(0, &encoded[..]).await)?;
        }
        drop(encoded);

        debug!(
            opslimit = settings.opslimit,
            memlimit = settings.memlimit,
            "container header written"
        );

        self.open().await
    }

    /// Read the header and derive the key, once.
    ///
    /// Called implicitly by [`Overlay::read`] and [`Overlay::write`].
    /// Concurrent callers share a single attempt and all see its outcome,
    /// errors included.
    pub async fn open(&self) -> Result<()> {
        self.ensure_live()?;

        let outcome = self
            .opened
            .get_or_init(|| self.open_once())
            .await
            .clone();

        match outcome {
            Ok(()) => self.ensure_live(),
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn open_once(&self) -> Result<()> {
        {
            let mut secrets = self.secrets();
            if secrets.state == OverlayState::Destroyed {
                return Err(VeilError::Destroyed);
            }
            secrets.state = OverlayState::Opening;
        }

        let header = {
            let mut storage = self.storage.lock().await;
            self.ensure_live()?;
            ContainerHeader::read_from(&mut *storage).await?
        };

        let passphrase = {
            let mut secrets = self.secrets();
            match secrets.passphrase.take() {
                Some(passphrase) => passphrase,
                None if secrets.state == OverlayState::Destroyed => {
                    return Err(VeilError::Destroyed)
                }
                // An earlier attempt took it and was dropped mid-derivation.
                None => {
                    return Err(VeilError::KeyDerivation(
                        "an earlier open was cancelled before the key was derived; \
                         the passphrase has already been released"
                            .to_string(),
                    ))
                }
            }
        };

        debug!(
            opslimit = header.key_header().opslimit(),
            memlimit = header.key_header().memlimit(),
            "deriving container key"
        );

        let key_header = header.key_header().clone();
        let (passphrase, derived) = tokio::task::spawn_blocking(move || {
            let derived = derive_key(&passphrase, &key_header);
            (passphrase, derived)
        })
        .await
        .map_err(|e| VeilError::KeyDerivation(format!("key derivation task failed: {}", e)))?;

        let mut secrets = self.secrets();
        if secrets.state == OverlayState::Destroyed {
            // Torn down while deriving; `passphrase` zeroes itself on drop.
            return Err(VeilError::Destroyed);
        }

        match derived {
            Ok(key) => {
                secrets.install(passphrase, key, header);
                debug!("container opened");
                Ok(())
            }
            Err(err) => {
                // Hand it back so teardown zeroes it along with everything else.
                secrets.passphrase = Some(passphrase);
                Err(err)
            }
        }
    }

    /// Decrypt the stored payload.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::Format` if the data segment is shorter than the
    /// authentication tag, and `VeilError::Authentication` if the tag does
    /// not verify.
    pub async fn read(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_live()?;
        self.open().await?;

        let (ciphertext, header) = {
            let mut storage = self.storage.lock().await;
            self.ensure_live()?;

            let stat = self.check(storage.stat().await)?;
            let data_len = stat.size.saturating_sub(HEADER_BYTES as u64);
            if data_len < TAG_LEN as u64 {
                return Err(self.fail(VeilError::Format(format!(
                    "data segment is {} bytes, shorter than the {}-byte tag",
                    data_len, TAG_LEN
                ))));
            }

            let ciphertext = self.check(storage.read(HEADER_BYTES as u64, data_len).await)?;
            let header = self.check(self.committed_header())?;
            (ciphertext, header)
        };

        let key = self.check(self.key())?;
        let plaintext = self.check(aead::decrypt(&key, &header, &ciphertext))?;

        debug!(bytes = plaintext.len(), "payload decrypted");
        Ok(plaintext)
    }

    /// Encrypt `plaintext` under a fresh nonce and replace the stored payload.
    ///
    /// Afterwards the storage is exactly `HEADER_BYTES` plus the ciphertext
    /// and tag long.
    pub async fn write(&self, plaintext: &[u8]) -> Result<()> {
        self.ensure_live()?;
        self.open().await?;

        let key = self.check(self.key())?;
        let mut header = self.check(self.committed_header())?;
        let ciphertext = self.check(aead::encrypt(&key, &mut header, plaintext))?;
        drop(key);

        let mut frame = Vec::with_capacity(HEADER_BYTES + ciphertext.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(&ciphertext);

        let mut storage = self.storage.lock().await;
        self.ensure_live()?;
        self.check(storage.write(0, &frame).await)?;
        self.check(storage.del(frame.len() as u64, u64::MAX).await)?;

        // Committed while the storage is still locked, so a read always
        // pairs the on-disk ciphertext with the nonce that sealed it.
        {
            let mut secrets = self.secrets();
            if secrets.state == OverlayState::Destroyed {
                return Err(VeilError::Destroyed);
            }
            secrets.header = Some(header);
        }

        debug!(bytes = plaintext.len(), "payload written");
        Ok(())
    }

    /// Tear the overlay down.
    ///
    /// The first call zeroes the key, the header and any passphrase still
    /// held. Later calls do nothing. If `err` is given it is returned, so a
    /// caller can forward the failure that triggered the teardown.
    pub fn destroy(&self, err: Option<VeilError>) -> Result<()> {
        self.teardown(err.as_ref());
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn teardown(&self, cause: Option<&VeilError>) {
        let wiped = self.secrets().wipe();
        if !wiped {
            return;
        }
        match cause {
            Some(err) => warn!(error = %err, "overlay destroyed"),
            None => debug!("overlay destroyed"),
        }
    }

    /// Tear down and hand back `err` for returning.
    fn fail(&self, err: VeilError) -> VeilError {
        self.teardown(Some(&err));
        err
    }

    fn check<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|err| self.fail(err))
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state() == OverlayState::Destroyed {
            return Err(VeilError::Destroyed);
        }
        Ok(())
    }

    fn key(&self) -> Result<DerivedKey> {
        self.secrets().key.clone().ok_or(VeilError::Destroyed)
    }

    fn committed_header(&self) -> Result<ContainerHeader> {
        self.secrets().header.clone().ok_or(VeilError::Destroyed)
    }

    fn secrets(&self) -> MutexGuard<'_, Secrets> {
        self.secrets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> std::fmt::Debug for Overlay<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self
            .secrets
            .lock()
            .map(|s| s.state)
            .unwrap_or_else(|poisoned| poisoned.into_inner().state);
        f.debug_struct("Overlay").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const FAST: KdfSettings = KdfSettings::new(1, 64 * 1024);

    #[tokio::test]
    async fn test_states() {
        let overlay = Overlay::new(MemoryStorage::new(), b"secret".to_vec());
        assert_eq!(overlay.state(), OverlayState::Idle);
        assert!(overlay.holds_passphrase());

        overlay.init(FAST).await.unwrap();
        assert_eq!(overlay.state(), OverlayState::Ready);
        assert!(!overlay.holds_passphrase());

        overlay.destroy(None).unwrap();
        assert_eq!(overlay.state(), OverlayState::Destroyed);
    }

    #[tokio::test]
    async fn test_init_writes_only_header() {
        let storage = MemoryStorage::new();
        let overlay = Overlay::new(storage.clone(), b"secret".to_vec());

        overlay.init(FAST).await.unwrap();

        let bytes = storage.to_vec();
        assert_eq!(bytes.len(), HEADER_BYTES);
        let header = ContainerHeader::decode(&bytes).unwrap();
        assert_eq!(header.key_header().settings(), FAST);
    }

    #[tokio::test]
    async fn test_init_rejects_zero_settings() {
        let overlay = Overlay::new(MemoryStorage::new(), b"secret".to_vec());

        let result = overlay.init(KdfSettings::new(0, 64 * 1024)).await;

        assert!(matches!(result, Err(VeilError::InvalidInput(_))));
        assert_eq!(overlay.state(), OverlayState::Destroyed);
        assert!(!overlay.holds_passphrase());
    }

    #[tokio::test]
    async fn test_init_after_open_rejected() {
        let overlay = Overlay::create(MemoryStorage::new(), b"secret".to_vec(), FAST)
            .await
            .unwrap();

        let result = overlay.init(FAST).await;
        assert!(matches!(result, Err(VeilError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_open_is_shared() {
        let storage = MemoryStorage::new();
        Overlay::create(storage.clone(), b"secret".to_vec(), FAST)
            .await
            .unwrap();

        let overlay = Overlay::new(storage, b"secret".to_vec());
        let (a, b, c) = tokio::join!(overlay.open(), overlay.open(), overlay.open());

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(overlay.state(), OverlayState::Ready);
    }

    #[tokio::test]
    async fn test_open_zeroes_released_passphrase() {
        let storage = MemoryStorage::new();
        Overlay::create(storage.clone(), b"secret".to_vec(), FAST)
            .await
            .unwrap();

        let overlay = Overlay::new(storage, b"secret".to_vec());
        overlay.open().await.unwrap();

        assert!(!overlay.holds_passphrase());
        assert_eq!(overlay.secrets().released, Some(vec![0u8; 6]));
    }

    #[tokio::test]
    async fn test_destroy_zeroes_unused_passphrase() {
        let overlay = Overlay::new(MemoryStorage::new(), b"hunter2".to_vec());

        overlay.destroy(None).unwrap();

        assert_eq!(overlay.secrets().released, Some(vec![0u8; 7]));
    }

    #[tokio::test]
    async fn test_open_after_cancelled_derivation() {
        let storage = MemoryStorage::new();
        Overlay::create(storage.clone(), b"secret".to_vec(), KdfSettings::INTERACTIVE)
            .await
            .unwrap();

        let overlay = Overlay::new(storage, b"secret".to_vec());
        // The first poll parks `open` on the blocking derivation; the ready
        // branch then wins and drops it.
        tokio::select! {
            biased;
            _ = overlay.open() => panic!("derivation finished on first poll"),
            _ = std::future::ready(()) => {}
        }
        assert_eq!(overlay.state(), OverlayState::Opening);
        assert!(!overlay.holds_passphrase());

        let result = overlay.open().await;

        assert!(matches!(result, Err(VeilError::KeyDerivation(_))));
        assert_eq!(overlay.state(), OverlayState::Destroyed);
    }

    #[tokio::test]
    async fn test_open_failure_shared_and_terminal() {
        let overlay = Overlay::new(MemoryStorage::new(), b"secret".to_vec());

        let (a, b) = tokio::join!(overlay.open(), overlay.open());

        assert!(matches!(a, Err(VeilError::Format(_))));
        assert!(b.is_err());
        assert!(!overlay.holds_passphrase());
        assert_eq!(overlay.read().await.unwrap_err(), VeilError::Destroyed);
    }

    #[tokio::test]
    async fn test_destroy_forwards_error() {
        let overlay = Overlay::new(MemoryStorage::new(), b"secret".to_vec());

        let result = overlay.destroy(Some(VeilError::Io("disk gone".to_string())));

        assert_eq!(result, Err(VeilError::Io("disk gone".to_string())));
        assert_eq!(overlay.state(), OverlayState::Destroyed);
    }

    #[tokio::test]
    async fn test_destroy_before_open() {
        let storage = MemoryStorage::new();
        Overlay::create(storage.clone(), b"secret".to_vec(), FAST)
            .await
            .unwrap();

        let overlay = Overlay::new(storage, b"secret".to_vec());
        overlay.destroy(None).unwrap();

        assert_eq!(overlay.open().await, Err(VeilError::Destroyed));
        assert_eq!(overlay.write(b"late").await, Err(VeilError::Destroyed));
    }

    #[tokio::test]
    async fn test_debug_shows_state_only() {
        let overlay = Overlay::new(MemoryStorage::new(), b"hunter2".to_vec());
        let debug_output = format!("{:?}", overlay);

        assert!(debug_output.contains("Idle"));
        assert!(!debug_output.contains("hunter2"));
    }
}
