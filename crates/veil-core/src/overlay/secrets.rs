//! Secret material held by an overlay and its lifecycle.

use crate::crypto::{DerivedKey, Passphrase};
use crate::header::ContainerHeader;

/// Where an overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Constructed; holds the passphrase and nothing else.
    Idle,
    /// Header read or key derivation in progress.
    Opening,
    /// Key derived; passphrase released.
    Ready,
    /// Torn down. Terminal.
    Destroyed,
}

/// Everything secret an overlay owns.
///
/// Invariants:
/// - the passphrase is present only before a successful open
/// - the key and header are present only in `Ready`
/// - nothing is present once `Destroyed`
#[derive(Debug)]
pub(crate) struct Secrets {
    pub(crate) state: OverlayState,
    pub(crate) passphrase: Option<Passphrase>,
    pub(crate) key: Option<DerivedKey>,
    pub(crate) header: Option<ContainerHeader>,
    /// Bytes of the last passphrase released, as they were just before drop.
    #[cfg(test)]
    pub(crate) released: Option<Vec<u8>>,
}

impl Secrets {
    pub(crate) fn new(passphrase: Passphrase) -> Self {
        Self {
            state: OverlayState::Idle,
            passphrase: Some(passphrase),
            key: None,
            header: None,
            #[cfg(test)]
            released: None,
        }
    }

    /// Move to `Ready`, zeroing the passphrase that produced `key`.
    pub(crate) fn install(
        &mut self,
        mut passphrase: Passphrase,
        key: DerivedKey,
        header: ContainerHeader,
    ) {
        passphrase.zero();
        self.release(passphrase);
        self.key = Some(key);
        self.header = Some(header);
        self.state = OverlayState::Ready;
    }

    /// Zero and release everything. Returns `false` if already destroyed.
    pub(crate) fn wipe(&mut self) -> bool {
        if self.state == OverlayState::Destroyed {
            return false;
        }
        if let Some(mut passphrase) = self.passphrase.take() {
            passphrase.zero();
            self.release(passphrase);
        }
        // `DerivedKey` and `ContainerHeader` zero themselves on drop.
        self.key = None;
        self.header = None;
        self.state = OverlayState::Destroyed;
        true
    }

    #[cfg(not(test))]
    fn release(&mut self, passphrase: Passphrase) {
        drop(passphrase);
    }

    #[cfg(test)]
    fn release(&mut self, passphrase: Passphrase) {
        self.released = Some(passphrase.expose().to_vec());
    }
}
