//! Owned passphrase buffer.
//!
//! A [`Passphrase`] is handed to an overlay at construction and never given
//! back. It cannot be cloned and prints as `[REDACTED]`. Its bytes are zeroed
//! when [`Passphrase::zero`] is called or when it is dropped.
//!
//! Every conversion leaves nothing readable behind in the caller: owned
//! buffers are moved in and wiped, borrowed ones must be mutable so they can
//! be wiped too.

use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox};
use zeroize::Zeroize;

/// Caller-supplied passphrase bytes.
pub struct Passphrase {
    bytes: SecretBox<[u8]>,
}

impl Passphrase {
    /// Number of bytes in the passphrase.
    pub fn len(&self) -> usize {
        self.bytes.expose_secret().len()
    }

    /// Whether the passphrase holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite every byte of the passphrase with zeros, in place.
    pub fn zero(&mut self) {
        self.bytes.expose_secret_mut().zeroize();
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(mut bytes: Vec<u8>) -> Self {
        // Copy into an exact-size allocation; `into_boxed_slice` may
        // reallocate and free the original buffer without wiping it.
        let boxed: Box<[u8]> = bytes.as_slice().into();
        bytes.zeroize();
        Self {
            bytes: SecretBox::new(boxed),
        }
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::from(value.into_bytes())
    }
}

/// Copies the bytes and zeroes the caller's buffer.
impl From<&mut [u8]> for Passphrase {
    fn from(value: &mut [u8]) -> Self {
        let boxed = Box::<[u8]>::from(&*value);
        value.zeroize();
        Self {
            bytes: SecretBox::new(boxed),
        }
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_overwrites_in_place() {
        let mut passphrase = Passphrase::from(b"secret".to_vec());
        assert_eq!(passphrase.expose(), b"secret");

        passphrase.zero();

        assert_eq!(passphrase.len(), 6);
        assert!(passphrase.expose().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_vec_and_string() {
        let from_vec = Passphrase::from(b"hunter2".to_vec());
        let from_string = Passphrase::from(String::from("hunter2"));
        assert_eq!(from_vec.expose(), from_string.expose());
        assert!(!from_vec.is_empty());
    }

    #[test]
    fn test_from_mut_slice_wipes_source() {
        let mut buffer = b"hunter2".to_vec();

        let passphrase = Passphrase::from(buffer.as_mut_slice());

        assert_eq!(passphrase.expose(), b"hunter2");
        assert_eq!(buffer.len(), 7);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_debug_redacts() {
        let passphrase = Passphrase::from(b"correct horse battery staple".to_vec());
        let debug_output = format!("{:?}", passphrase);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("horse"));
    }
}
