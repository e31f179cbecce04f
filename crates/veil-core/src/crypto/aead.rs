//! XChaCha20-Poly1305 encryption of the data segment.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use super::key::DerivedKey;
use crate::error::{Result, VeilError};
use crate::header::{ContainerHeader, TAG_LEN};

/// Encrypt `plaintext` under `key`.
///
/// Rotates the nonce in `header` first; the caller must persist that same
/// header alongside the returned `ciphertext || tag`. The encoded
/// key-derivation header is bound in as associated data.
pub fn encrypt(
    key: &DerivedKey,
    header: &mut ContainerHeader,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    header.data_header_mut().rotate_nonce()?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let aad = header.aad();
    let nonce = XNonce::from_slice(header.data_header().nonce());

    cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| VeilError::Crypto("XChaCha20-Poly1305 encryption failed".to_string()))
}

/// Decrypt and authenticate `ciphertext || tag` using the nonce and
/// associated data from `header`.
pub fn decrypt(
    key: &DerivedKey,
    header: &ContainerHeader,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < TAG_LEN {
        return Err(VeilError::Format(format!(
            "data segment is {} bytes, shorter than the {}-byte tag",
            ciphertext.len(),
            TAG_LEN
        )));
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let aad = header.aad();
    let nonce = XNonce::from_slice(header.data_header().nonce());

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| VeilError::Authentication)
}
