//! HKDF-keyed ChaCha20-Poly1305.
//!
//! Each call to [`aead_encrypt`] draws a fresh salt and nonce, derives a
//! one-off key from the caller's secret, and returns everything needed to
//! open the message again except the secret itself.

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::derive_key;
use crate::key::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Self-contained AEAD output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AeadCiphertext {
    /// Ciphertext with the Poly1305 tag appended.
    pub ciphertext: Vec<u8>,
    /// HKDF salt used to derive the message key.
    pub salt: [u8; SALT_SIZE],
    /// ChaCha20 nonce.
    pub nonce: [u8; NONCE_SIZE],
}

impl AeadCiphertext {
    /// Serializes as `salt || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parses the layout produced by [`AeadCiphertext::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let min = SALT_SIZE + NONCE_SIZE + TAG_SIZE;
        if bytes.len() < min {
            return Err(CryptoError::Malformed(format!(
                "need at least {min} bytes, got {}",
                bytes.len()
            )));
        }

        let (salt_bytes, rest) = bytes.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            salt,
            nonce,
        })
    }
}

/// Encrypts `message` under a key derived from `secret`.
pub fn aead_encrypt(
    secret: &[u8],
    message: &[u8],
    aad: Option<&[u8]>,
) -> CryptoResult<AeadCiphertext> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(secret, &salt, &[])?;
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: message,
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|e| CryptoError::Encryption(format!("aead seal failed: {e}")))?;

    Ok(AeadCiphertext {
        ciphertext,
        salt,
        nonce,
    })
}

/// Opens an [`AeadCiphertext`] produced by [`aead_encrypt`] with the same secret.
pub fn aead_decrypt(
    secret: &[u8],
    sealed: &AeadCiphertext,
    aad: Option<&[u8]>,
) -> CryptoResult<Vec<u8>> {
    if sealed.ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::Malformed(format!(
            "ciphertext shorter than the {TAG_SIZE}-byte tag"
        )));
    }

    let key = derive_key(secret, &sealed.salt, &[])?;
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;

    cipher
        .decrypt(
            Nonce::from_slice(&sealed.nonce),
            Payload {
                msg: &sealed.ciphertext,
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|_| {
            CryptoError::Decryption("aead open failed (wrong secret or tampered data)".to_string())
        })
}
