//! Field-level encryption for personal data stored at rest.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("encryption key must be 64 hex characters")]
    InvalidKey,

    #[error("malformed ciphertext")]
    Malformed,

    #[error("decryption failed")]
    Decrypt,

    #[error("encryption failed")]
    Encrypt,
}

/// AES-256-GCM with a random nonce per value, stored as
/// `hex(nonce):hex(ciphertext)`.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher")
    }
}

impl FieldCipher {
    pub fn from_hex(key_hex: &str) -> Result<Self, CipherError> {
        let key = hex::decode(key_hex.trim()).map_err(|_| CipherError::InvalidKey)?;
        if key.len() != 32 {
            return Err(CipherError::InvalidKey);
        }
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CipherError::InvalidKey)?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encrypt)?;

        Ok(format!("{}:{}", hex::encode(nonce), hex::encode(ciphertext)))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, CipherError> {
        let (nonce_hex, ct_hex) = stored.split_once(':').ok_or(CipherError::Malformed)?;
        let nonce_bytes = hex::decode(nonce_hex).map_err(|_| CipherError::Malformed)?;
        let ciphertext = hex::decode(ct_hex).map_err(|_| CipherError::Malformed)?;

        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::Malformed);
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::from_hex(&"0f".repeat(32)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let stored = cipher.encrypt("+1 555-0100").unwrap();
        assert_ne!(stored, "+1 555-0100");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "+1 555-0100");
    }

    #[test]
    fn test_nonce_differs_per_call() {
        let cipher = cipher();
        let a = cipher.encrypt("same").unwrap();
        let b = cipher.encrypt("same").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.split_once(':').unwrap().0.len(), NONCE_LEN * 2);
    }

    #[test]
    fn test_wrong_key_fails() {
        let stored = cipher().encrypt("secret").unwrap();
        let other = FieldCipher::from_hex(&"a0".repeat(32)).unwrap();
        assert_eq!(other.decrypt(&stored), Err(CipherError::Decrypt));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(FieldCipher::from_hex("abcd").unwrap_err(), CipherError::InvalidKey);
        assert_eq!(FieldCipher::from_hex(&"zz".repeat(32)).unwrap_err(), CipherError::InvalidKey);

        let cipher = cipher();
        assert_eq!(cipher.decrypt("no-separator"), Err(CipherError::Malformed));
        assert_eq!(cipher.decrypt("abcd:abcd"), Err(CipherError::Malformed));

        let stored = cipher.encrypt("value").unwrap();
        let (nonce, ct) = stored.split_once(':').unwrap();
        let mut ct = hex::decode(ct).unwrap();
        ct[0] ^= 0xff;
        let tampered = format!("{nonce}:{}", hex::encode(ct));
        assert_eq!(cipher.decrypt(&tampered), Err(CipherError::Decrypt));
    }
}
