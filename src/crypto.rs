//! Symmetric encryption, password hashing, and token generation
//!
//! Encryption is AES-256-GCM with a fresh random 96-bit nonce per call; the
//! nonce is bound into the cipher and the GCM tag carried alongside the
//! ciphertext, so any tampering fails authentication instead of yielding
//! garbage. Password hashing is PBKDF2-HMAC-SHA-512 with a random salt per
//! call and constant-time verification.

use crate::error::{Error, Result};
use crate::types::{EncryptedPayload, PasswordHash};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::{Rng, RngCore};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use tracing::info;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 64;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Keyed encryption utility
///
/// Holds the process-wide encryption key, loaded once at startup and
/// immutable for the process lifetime.
pub struct CryptoUtil {
    cipher: Aes256Gcm,
}

impl CryptoUtil {
    /// Create from raw key material; requires at least 32 bytes
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() < KEY_LEN {
            return Err(Error::ConfigurationMissing(format!(
                "encryption key must be at least {} bytes, got {}",
                KEY_LEN,
                key.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(&key[..KEY_LEN]);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Load the key from a process environment variable
    ///
    /// An absent or short key is fatal here, at startup, rather than on
    /// first use.
    pub fn from_env(var: &str) -> Result<Self> {
        let secret = std::env::var(var)
            .map_err(|_| Error::ConfigurationMissing(format!("{} is not set", var)))?;
        let util = Self::new(secret.as_bytes())?;
        info!("Encryption key loaded from {}", var);
        Ok(util)
    }

    /// Encrypt a string, returning ciphertext, nonce, and tag as hex
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedPayload> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::EncryptionFailure(e.to_string()))?;

        // aes-gcm appends the 16-byte tag to the ciphertext
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(EncryptedPayload {
            encrypted: hex::encode(ciphertext),
            iv: hex::encode(nonce),
            tag: hex::encode(tag),
        })
    }

    /// Decrypt a payload produced by [`encrypt`](Self::encrypt)
    ///
    /// Tampered, truncated, or wrong-key input fails authentication and
    /// returns [`Error::DecryptionFailure`].
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<String> {
        let iv = hex::decode(&payload.iv)
            .map_err(|e| Error::DecryptionFailure(format!("invalid IV hex: {}", e)))?;
        if iv.len() != NONCE_LEN {
            return Err(Error::DecryptionFailure(format!(
                "IV must be {} bytes, got {}",
                NONCE_LEN,
                iv.len()
            )));
        }

        let mut sealed = hex::decode(&payload.encrypted)
            .map_err(|e| Error::DecryptionFailure(format!("invalid ciphertext hex: {}", e)))?;
        let tag = hex::decode(&payload.tag)
            .map_err(|e| Error::DecryptionFailure(format!("invalid tag hex: {}", e)))?;
        sealed.extend_from_slice(&tag);

        let nonce = Nonce::from_slice(&iv);
        let plaintext = self
            .cipher
            .decrypt(nonce, sealed.as_ref())
            .map_err(|_| Error::DecryptionFailure("ciphertext authentication failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DecryptionFailure(format!("invalid UTF-8: {}", e)))
    }

    /// Encrypt into a single `encrypted:iv:tag` string for storage
    pub fn encrypt_sensitive(&self, value: &str) -> Result<String> {
        Ok(self.encrypt(value)?.pack())
    }

    /// Reverse [`encrypt_sensitive`](Self::encrypt_sensitive)
    pub fn decrypt_sensitive(&self, packed: &str) -> Result<String> {
        self.decrypt(&EncryptedPayload::unpack(packed)?)
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut derived = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut derived);

    PasswordHash {
        hash: hex::encode(derived),
        salt: hex::encode(salt),
    }
}

/// Verify a password against a stored hash and salt
///
/// Comparison is constant time; malformed hex simply fails verification.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let Ok(salt) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash) else {
        return false;
    };
    if expected.len() != HASH_LEN {
        return false;
    }

    let mut derived = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut derived);

    derived.ct_eq(expected.as_slice()).into()
}

/// Generate `byte_len` random bytes as a hex string of twice that length
pub fn generate_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a numeric one-time password of exactly `digits` digits
pub fn generate_otp(digits: usize) -> String {
    (0..digits)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}
