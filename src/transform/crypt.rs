//! Passphrase-keyed authenticated encryption.
//!
//! Sealed layout: `b"FWX1"` | 12-byte nonce | ChaCha20-Poly1305 ciphertext.

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use sha2::{Digest, Sha256};

const MAGIC: &[u8; 4] = b"FWX1";
const NONCE_LEN: usize = 12;

/// Symmetric cipher keyed by the SHA-256 digest of a passphrase.
#[derive(Clone)]
pub struct Cipher {
    inner: ChaCha20Poly1305,
}

impl Cipher {
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let key = Key::from_slice(digest.as_slice());
        Self {
            inner: ChaCha20Poly1305::new(key),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, chacha20poly1305::Error> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self.inner.encrypt(&nonce, plaintext)?;

        let mut sealed = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(MAGIC);
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt data produced by [`Cipher::seal`].
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, String> {
        let header_len = MAGIC.len() + NONCE_LEN;
        if sealed.len() < header_len || &sealed[..MAGIC.len()] != MAGIC {
            return Err("not an encrypted file (bad header)".to_string());
        }

        let nonce = Nonce::from_slice(&sealed[MAGIC.len()..header_len]);
        self.inner
            .decrypt(nonce, &sealed[header_len..])
            .map_err(|_| "wrong passphrase or corrupted data".to_string())
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cipher(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reverses_seal() {
        let cipher = Cipher::from_passphrase("key1");
        let sealed = cipher.seal(b"payroll.csv contents").unwrap();

        assert_eq!(&sealed[..4], MAGIC);
        assert_ne!(&sealed[16..], b"payroll.csv contents");
        assert_eq!(cipher.open(&sealed).unwrap(), b"payroll.csv contents");
    }

    #[test]
    fn test_open_with_wrong_passphrase_fails() {
        let sealed = Cipher::from_passphrase("key1").seal(b"secret").unwrap();
        let err = Cipher::from_passphrase("key2").open(&sealed).unwrap_err();
        assert!(err.contains("wrong passphrase"));
    }

    #[test]
    fn test_open_rejects_unsealed_input() {
        let cipher = Cipher::from_passphrase("key1");
        assert!(cipher.open(b"plain text").is_err());
        assert!(cipher.open(b"FWX1").is_err());
    }
}
