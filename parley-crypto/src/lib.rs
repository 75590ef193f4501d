//! Symmetric cryptography for Parley.
//!
//! Provides the primitives the preference log and push-token layers rely on:
//! - HKDF-SHA256 key derivation from a long-term secret
//! - ChaCha20-Poly1305 authenticated encryption with a per-message salt
//! - Epoch-scoped key families (30-day buckets) for rotating tokens
//! - HMAC-SHA256 signing and constant-time verification
//!
//! # Architecture
//!
//! Nothing here negotiates keys. Every operation starts from static secret
//! material owned by the caller:
//!
//! 1. **Message keys**: `aead_encrypt` draws a random 32-byte salt and derives
//!    a one-off key with HKDF(secret, salt). The salt and nonce travel with
//!    the ciphertext so the secret is the only input needed to open it.
//!
//! 2. **Epoch keys**: `derive_epoch_key` binds a key to a coarse time bucket
//!    plus a namespace, producing a rotating family without re-sharing the
//!    underlying secret.

mod aead;
mod error;
mod kdf;
mod key;
mod mac;

pub use aead::{AeadCiphertext, aead_decrypt, aead_encrypt};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{EPOCH_SECONDS, derive_epoch_key, derive_key, epoch_index, epoch_nonce};
pub use key::{
    DerivedKey, KEY_SIZE, NONCE_SIZE, SALT_SIZE, SecretBytes, TAG_SIZE, generate_random_key,
};
pub use mac::{SIGNATURE_SIZE, hmac_sign, hmac_verify};
