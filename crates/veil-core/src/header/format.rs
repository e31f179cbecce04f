//! Container format constants and layout definitions.
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     version (u32 LE, = 1)
//! 4       4     key-derivation alg id (i32 LE, Argon2id13 = 2)
//! 8       4     opslimit (u32 LE)
//! 12      4     memlimit (u32 LE, bytes)
//! 16      16    salt
//! 32      4     data-cipher alg id (u32 LE, XChaCha20-Poly1305 = 1)
//! 36      24    nonce
//! 60      ..    ciphertext || tag (16)
//! ```

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

/// Key-derivation algorithm id for Argon2id v1.3 (libsodium's numbering).
pub const KDF_ALG_ARGON2ID13: i32 = 2;

/// Data-cipher algorithm id for XChaCha20-Poly1305 (IETF).
pub const DATA_ALG_XCHACHA20_POLY1305: u32 = 1;

/// Size of the Argon2id salt in bytes.
pub const SALT_LEN: usize = 16;

/// Size of the XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Size of the derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of the version field.
pub const VERSION_BYTES: usize = 4;

/// Size of the key-derivation header.
/// Layout: alg(4) + opslimit(4) + memlimit(4) + salt(16) = 28
pub const KEY_HEADER_BYTES: usize = 12 + SALT_LEN;

/// Size of the data-cipher header.
/// Layout: alg(4) + nonce(24) = 28
pub const DATA_HEADER_BYTES: usize = 4 + NONCE_LEN;

/// Byte offset of the key-derivation header.
pub const KEY_HEADER_OFFSET: usize = VERSION_BYTES;

/// Byte offset of the data-cipher header.
pub const DATA_HEADER_OFFSET: usize = KEY_HEADER_OFFSET + KEY_HEADER_BYTES;

/// Size of the full container header; the data segment starts here.
pub const HEADER_BYTES: usize = DATA_HEADER_OFFSET + DATA_HEADER_BYTES;
