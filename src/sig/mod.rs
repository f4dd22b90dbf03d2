/// Detached signatures.
///
/// Two Ed25519 signatures travel together: the primary one covers the
/// message (or its BLAKE2b-512 digest in pre-hashed mode), the global one
/// covers primary_signature || trusted_comment. A verifier checks both, so
/// the trusted comment cannot be swapped without invalidating the record.
/// The untrusted comment sits outside both signatures and is plain
/// annotation.
use crate::format::SIG_ALG_PREHASHED;
use crate::keys::KeyId;

pub mod file;

pub const SIGNATURE_LEN: usize = 64;

/// A parsed detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Signature mode tag: `Ed` (direct) or `ED` (pre-hashed).
    pub algorithm: [u8; 2],
    /// Id of the key pair that produced the signature.
    pub key_id: KeyId,
    /// Primary signature over the message or its digest.
    pub signature: [u8; SIGNATURE_LEN],
    /// Signature over `signature || trusted_comment`.
    pub global_signature: [u8; SIGNATURE_LEN],
    /// Comment covered by the global signature.
    pub trusted_comment: String,
    /// Comment outside all signatures.
    pub untrusted_comment: String,
}

impl Signature {
    /// Whether the primary signature covers the digest instead of the
    /// message itself.
    pub fn is_prehashed(&self) -> bool {
        self.algorithm == SIG_ALG_PREHASHED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SIG_ALG_ED25519;

    #[test]
    fn test_is_prehashed() {
        let mut sig = Signature {
            algorithm: SIG_ALG_ED25519,
            key_id: KeyId::ZERO,
            signature: [0u8; SIGNATURE_LEN],
            global_signature: [0u8; SIGNATURE_LEN],
            trusted_comment: String::new(),
            untrusted_comment: String::new(),
        };
        assert!(!sig.is_prehashed());
        sig.algorithm = SIG_ALG_PREHASHED;
        assert!(sig.is_prehashed());
    }
}
