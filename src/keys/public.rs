/// Public key text records.
///
/// The payload is 42 bytes: sig_alg("Ed") || key_id(8) || public_key(32),
/// base64 without padding. Input is also accepted as a bare base64 string of
/// either the full payload or just the 32 key bytes; the bare form gets an
/// all-zero key id.
use std::fs;
use std::path::Path;

use ed25519_dalek::VerifyingKey;

use crate::error::{MinisignError, Result};
use crate::format::{self, SIG_ALG_ED25519, UNTRUSTED_COMMENT_PREFIX};
use crate::keys::{KeyId, KEY_ID_LEN};

pub const PUBLIC_KEY_LEN: usize = 32;
const PAYLOAD_LEN: usize = 2 + KEY_ID_LEN + PUBLIC_KEY_LEN;

/// The verifying half of a key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    key_id: KeyId,
    key: [u8; PUBLIC_KEY_LEN],
    untrusted_comment: String,
}

impl PublicKey {
    pub fn new(key: [u8; PUBLIC_KEY_LEN], key_id: KeyId, untrusted_comment: &str) -> Self {
        Self {
            key_id,
            key,
            untrusted_comment: untrusted_comment.to_string(),
        }
    }

    /// Construct from a byte slice, rejecting any length other than 32.
    pub fn from_bytes(key: &[u8], key_id: KeyId, untrusted_comment: &str) -> Result<Self> {
        if key.len() != PUBLIC_KEY_LEN {
            return Err(MinisignError::Format(format!(
                "Public key is {} bytes (expected {})",
                key.len(),
                PUBLIC_KEY_LEN
            )));
        }
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(key);
        Ok(Self::new(bytes, key_id, untrusted_comment))
    }

    /// Parse a two-line public key record. Trailing whitespace after the
    /// payload is tolerated.
    pub fn decode(text: &str) -> Result<Self> {
        let lines = format::logical_lines(text);
        if lines.len() != 2 {
            return Err(MinisignError::Format(
                "Public key record must be a comment line and a payload line".to_string(),
            ));
        }
        let comment = format::parse_comment_line(lines[0], UNTRUSTED_COMMENT_PREFIX)?;
        let payload = format::decode_base64(lines[1].trim_end())?;
        Self::from_payload(&payload, comment)
    }

    /// Accept a pasted base64 key: the full 42-byte payload or a bare
    /// 32-byte key (which then carries a zero id).
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let payload = format::decode_base64(encoded)?;
        match payload.len() {
            PUBLIC_KEY_LEN => {
                let mut key = [0u8; PUBLIC_KEY_LEN];
                key.copy_from_slice(&payload);
                Ok(Self::new(key, KeyId::ZERO, ""))
            }
            _ => Self::from_payload(&payload, ""),
        }
    }

    /// Read a public key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::decode(&text)
    }

    fn from_payload(payload: &[u8], comment: &str) -> Result<Self> {
        if payload.len() != PAYLOAD_LEN {
            return Err(MinisignError::Format(format!(
                "Public key payload is {} bytes (expected {})",
                payload.len(),
                PAYLOAD_LEN
            )));
        }
        let mut tag = [0u8; 2];
        tag.copy_from_slice(&payload[0..2]);
        if tag != SIG_ALG_ED25519 {
            return Err(format::unsupported_algorithm(tag));
        }
        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&payload[2..2 + KEY_ID_LEN]);
        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(&payload[2 + KEY_ID_LEN..]);
        Ok(Self::new(key, KeyId::new(key_id), comment))
    }

    /// Serialize to record text (unpadded base64 payload).
    pub fn encode(&self) -> Result<String> {
        format::check_comment(&self.untrusted_comment)?;
        Ok(format!(
            "{}{}\r\n{}\r\n",
            UNTRUSTED_COMMENT_PREFIX,
            self.untrusted_comment,
            format::encode_base64_unpadded(&self.payload())
        ))
    }

    /// The payload alone as unpadded base64, as printed in verify hints.
    pub fn to_base64(&self) -> String {
        format::encode_base64_unpadded(&self.payload())
    }

    fn payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.extend_from_slice(&SIG_ALG_ED25519);
        payload.extend_from_slice(self.key_id.as_bytes());
        payload.extend_from_slice(&self.key);
        payload
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.key).map_err(|_| {
            MinisignError::Format("Public key is not a valid Ed25519 point".to_string())
        })
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.key
    }

    pub fn untrusted_comment(&self) -> &str {
        &self.untrusted_comment
    }
}
