use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand_core::{OsRng, RngCore};

use crate::errors::internal::CodecError;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const KEY_SIZE: usize = 32;

/// Reversible encoding applied to sensitive audit fields at rest
///
/// `decode` never fails: values that were not produced by `encode`
/// (legacy plaintext rows) come back unchanged.
pub trait AuditCodec: Send + Sync {
    fn encode(&self, plaintext: &str) -> Result<String, CodecError>;
    fn decode(&self, stored: &str) -> String;
}

/// Pass-through codec used when no encryption key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextCodec;

impl AuditCodec for PlaintextCodec {
    fn encode(&self, plaintext: &str) -> Result<String, CodecError> {
        Ok(plaintext.to_string())
    }

    fn decode(&self, stored: &str) -> String {
        stored.to_string()
    }
}

/// AES-256-GCM codec
///
/// Stored format is hex of `[nonce (12 bytes)][ciphertext + tag]`.
pub struct AesGcmCodec {
    cipher: Aes256Gcm,
}

impl AesGcmCodec {
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Build from a 64-character hex key
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| CodecError::InvalidKey(format!("not valid hex: {}", e)))?;
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            CodecError::InvalidKey(format!("expected {} bytes, got {}", KEY_SIZE, b.len()))
        })?;
        Ok(Self::new(&key))
    }

    fn try_decode(&self, stored: &str) -> Option<String> {
        let bytes = hex::decode(stored).ok()?;
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return None;
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .ok()?;
        String::from_utf8(plaintext).ok()
    }
}

impl AuditCodec for AesGcmCodec {
    fn encode(&self, plaintext: &str) -> Result<String, CodecError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CodecError::EncodeFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(hex::encode(out))
    }

    fn decode(&self, stored: &str) -> String {
        self.try_decode(stored)
            .unwrap_or_else(|| stored.to_string())
    }
}

impl std::fmt::Debug for AesGcmCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AesGcmCodec {{ key: <redacted> }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_plaintext_codec_is_identity() {
        let codec = PlaintextCodec;
        assert_eq!(codec.encode("Requested item").unwrap(), "Requested item");
        assert_eq!(codec.decode("Requested item"), "Requested item");
    }

    #[test]
    fn test_aes_codec_hides_and_recovers_value() {
        let codec = AesGcmCodec::from_hex_key(KEY_HEX).unwrap();
        let stored = codec.encode("Requested item eq-1").unwrap();
        assert!(!stored.contains("Requested"));
        assert_eq!(codec.decode(&stored), "Requested item eq-1");
    }

    #[test]
    fn test_aes_codec_uses_fresh_nonce() {
        let codec = AesGcmCodec::from_hex_key(KEY_HEX).unwrap();
        let a = codec.encode("same").unwrap();
        let b = codec.encode("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_passes_through_legacy_plaintext() {
        let codec = AesGcmCodec::from_hex_key(KEY_HEX).unwrap();
        assert_eq!(codec.decode("Logged in"), "Logged in");
        // valid hex but too short to hold a nonce and tag
        assert_eq!(codec.decode("abcdef"), "abcdef");
    }

    #[test]
    fn test_decode_with_wrong_key_returns_input() {
        let stored = AesGcmCodec::from_hex_key(KEY_HEX).unwrap().encode("secret").unwrap();
        let other_key = "ff".repeat(32);
        let other = AesGcmCodec::from_hex_key(&other_key).unwrap();
        assert_eq!(other.decode(&stored), stored);
    }

    #[test]
    fn test_from_hex_key_rejects_bad_keys() {
        assert!(matches!(
            AesGcmCodec::from_hex_key("zz"),
            Err(CodecError::InvalidKey(_))
        ));
        assert!(matches!(
            AesGcmCodec::from_hex_key("0011"),
            Err(CodecError::InvalidKey(_))
        ));
    }
}
