//! HMAC-SHA256 for short-lived per-epoch tokens.

use crate::error::{CryptoError, CryptoResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Size of an HMAC-SHA256 signature.
pub const SIGNATURE_SIZE: usize = 32;

/// Signs `message` with `key`.
pub fn hmac_sign(key: &[u8], message: &[u8]) -> CryptoResult<[u8; SIGNATURE_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::KeyDerivation(format!("invalid hmac key: {e}")))?;
    mac.update(message);

    let mut signature = [0u8; SIGNATURE_SIZE];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    Ok(signature)
}

/// Verifies `signature` over `message` in constant time.
pub fn hmac_verify(key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(signature).is_ok()
}
