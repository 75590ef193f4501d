//! HKDF-SHA256 key derivation, plain and epoch-scoped.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, KEY_SIZE};
use chrono::{DateTime, Utc};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

/// Length of one key epoch: 30 days.
pub const EPOCH_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Derives a 256-bit key from `secret`, salted with `nonce` and bound to `info`.
pub fn derive_key(secret: &[u8], nonce: &[u8], info: &[u8]) -> CryptoResult<DerivedKey> {
    if secret.is_empty() {
        return Err(CryptoError::KeyDerivation("secret must not be empty".to_string()));
    }

    let hk = Hkdf::<Sha256>::new(Some(nonce), secret);
    let mut okm = [0u8; KEY_SIZE];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(format!("hkdf expand failed: {e}")))?;

    let key = DerivedKey::from_bytes(okm);
    okm.zeroize();
    Ok(key)
}

/// Number of whole epochs between the Unix epoch and `at`.
pub fn epoch_index(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(EPOCH_SECONDS)
}

/// Big-endian encoding of the epoch containing `at`, used as the HKDF salt.
pub fn epoch_nonce(at: DateTime<Utc>) -> [u8; 8] {
    epoch_index(at).to_be_bytes()
}

/// Derives the key for the epoch containing `at` within `namespace`.
///
/// Two calls inside the same 30-day bucket and namespace yield the same key;
/// crossing a bucket boundary or changing the namespace yields an unrelated one.
pub fn derive_epoch_key(
    secret: &[u8],
    at: DateTime<Utc>,
    namespace: &str,
) -> CryptoResult<DerivedKey> {
    let info = format!("{}-{namespace}", epoch_index(at));
    derive_key(secret, &epoch_nonce(at), info.as_bytes())
}
