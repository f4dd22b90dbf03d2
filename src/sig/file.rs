/// Four-line detached signature records (`.minisig`).
///
/// Line 1: "untrusted comment: " + text
/// Line 2: base64(sig_alg(2) || key_id(8) || signature(64))
/// Line 3: "trusted comment: " + text
/// Line 4: base64(global_signature(64))
use std::fs;
use std::path::Path;

use crate::error::{MinisignError, Result};
use crate::format::{
    self, SIG_ALG_ED25519, SIG_ALG_PREHASHED, TRUSTED_COMMENT_PREFIX, UNTRUSTED_COMMENT_PREFIX,
};
use crate::keys::{KeyId, KEY_ID_LEN};
use crate::sig::{Signature, SIGNATURE_LEN};

const SIGNED_PAYLOAD_LEN: usize = 2 + KEY_ID_LEN + SIGNATURE_LEN;

/// Signature record text, as stored on disk.
pub struct SigFile {
    contents: String,
}

impl SigFile {
    pub fn from_string(contents: String) -> Self {
        Self { contents }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            contents: fs::read_to_string(path)?,
        })
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, &self.contents)?;
        Ok(())
    }

    /// Render a signature as record text.
    pub fn serialize(signature: &Signature) -> Result<Self> {
        format::check_comment(&signature.untrusted_comment)?;
        format::check_comment(&signature.trusted_comment)?;
        if signature.algorithm != SIG_ALG_ED25519 && signature.algorithm != SIG_ALG_PREHASHED {
            return Err(format::unsupported_algorithm(signature.algorithm));
        }

        let mut payload = Vec::with_capacity(SIGNED_PAYLOAD_LEN);
        payload.extend_from_slice(&signature.algorithm);
        payload.extend_from_slice(signature.key_id.as_bytes());
        payload.extend_from_slice(&signature.signature);

        let contents = format!(
            "{}{}\r\n{}\r\n{}{}\r\n{}",
            UNTRUSTED_COMMENT_PREFIX,
            signature.untrusted_comment,
            format::encode_base64(&payload),
            TRUSTED_COMMENT_PREFIX,
            signature.trusted_comment,
            format::encode_base64(&signature.global_signature),
        );
        Ok(Self { contents })
    }

    /// Parse the record back into a signature.
    pub fn deserialize(&self) -> Result<Signature> {
        let lines = format::logical_lines(&self.contents);
        if lines.len() < 4 {
            return Err(MinisignError::Format(format!(
                "Signature record has {} lines (expected 4)",
                lines.len()
            )));
        }

        let untrusted_comment =
            format::parse_comment_line(lines[0], UNTRUSTED_COMMENT_PREFIX)?.to_string();

        let payload = format::decode_base64(lines[1])?;
        if payload.len() != SIGNED_PAYLOAD_LEN {
            return Err(MinisignError::Format(format!(
                "Signature payload is {} bytes (expected {})",
                payload.len(),
                SIGNED_PAYLOAD_LEN
            )));
        }
        let mut algorithm = [0u8; 2];
        algorithm.copy_from_slice(&payload[0..2]);
        if algorithm != SIG_ALG_ED25519 && algorithm != SIG_ALG_PREHASHED {
            return Err(format::unsupported_algorithm(algorithm));
        }
        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&payload[2..2 + KEY_ID_LEN]);
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&payload[2 + KEY_ID_LEN..]);

        let trusted_comment =
            format::parse_comment_line(lines[2], TRUSTED_COMMENT_PREFIX)?.to_string();

        let global = format::decode_base64(lines[3])?;
        if global.len() != SIGNATURE_LEN {
            return Err(MinisignError::Format(format!(
                "Global signature is {} bytes (expected {})",
                global.len(),
                SIGNATURE_LEN
            )));
        }
        let mut global_signature = [0u8; SIGNATURE_LEN];
        global_signature.copy_from_slice(&global);

        Ok(Signature {
            algorithm,
            key_id: KeyId::new(key_id),
            signature,
            global_signature,
            trusted_comment,
            untrusted_comment,
        })
    }
}
