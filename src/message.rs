/// Buffered messages and the dual-signature engine.
///
/// The whole message is read once and kept in memory; hashing, signing,
/// verification and content output all run over that same snapshot, so the
/// bytes that were verified are the bytes the caller gets back. The digest
/// is computed in fixed-size chunks to keep the hasher's working set small.
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use ed25519_dalek::Signer;
use tracing::debug;

use crate::crypto::hash::{MessageHasher, DIGEST_LEN};
use crate::error::{MinisignError, Result};
use crate::format::{self, SIG_ALG_ED25519, SIG_ALG_PREHASHED};
use crate::keys::public::PublicKey;
use crate::keys::secret::SecretKey;
use crate::sig::Signature;

pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// An in-memory snapshot of the file being signed or verified.
pub struct MessageFile {
    contents: Vec<u8>,
    chunk_size: usize,
}

impl MessageFile {
    /// Buffer a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Buffer a seekable stream from the start. Streams that cannot report
    /// or reset their position are rejected.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        reader.rewind()?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        debug!(len = contents.len(), "Buffered message");
        Ok(Self {
            contents,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// BLAKE2b-512 digest of the snapshot, fed to the hasher in chunks.
    pub fn hash(&self) -> [u8; DIGEST_LEN] {
        let mut hasher = MessageHasher::new();
        for chunk in self.contents.chunks(self.chunk_size) {
            hasher.update(chunk);
        }
        hasher.finalize()
    }

    /// Sign the snapshot.
    ///
    /// Direct mode (`prehash` false, tag `Ed`) signs the contents; pre-hashed
    /// mode (tag `ED`) signs the BLAKE2b-512 digest instead, which keeps the
    /// signing cost flat for large files. The global signature covers
    /// `primary_signature || trusted_comment`.
    pub fn sign(
        &self,
        secret_key: &SecretKey,
        prehash: bool,
        trusted_comment: &str,
        untrusted_comment: &str,
    ) -> Result<Signature> {
        format::check_comment(trusted_comment)?;
        format::check_comment(untrusted_comment)?;

        let signing_key = secret_key.signing_key();
        let (algorithm, primary) = if prehash {
            (SIG_ALG_PREHASHED, signing_key.sign(&self.hash()))
        } else {
            (SIG_ALG_ED25519, signing_key.sign(&self.contents))
        };

        let mut global_input = Vec::with_capacity(64 + trusted_comment.len());
        global_input.extend_from_slice(&primary.to_bytes());
        global_input.extend_from_slice(trusted_comment.as_bytes());
        let global = signing_key.sign(&global_input);

        Ok(Signature {
            algorithm,
            key_id: secret_key.key_id(),
            signature: primary.to_bytes(),
            global_signature: global.to_bytes(),
            trusted_comment: trusted_comment.to_string(),
            untrusted_comment: untrusted_comment.to_string(),
        })
    }

    /// Verify both signatures against the snapshot.
    ///
    /// The primary signature is checked over the contents or the digest,
    /// depending on the signature's tag, then the global signature over
    /// `primary || trusted_comment`. Failure of either is `Verification`.
    pub fn verify(&self, public_key: &PublicKey, signature: &Signature) -> Result<()> {
        if signature.algorithm != SIG_ALG_ED25519 && signature.algorithm != SIG_ALG_PREHASHED {
            return Err(format::unsupported_algorithm(signature.algorithm));
        }

        let verifying_key = public_key.verifying_key()?;
        let primary = ed25519_dalek::Signature::from_bytes(&signature.signature);
        if signature.is_prehashed() {
            verifying_key.verify_strict(&self.hash(), &primary)
        } else {
            verifying_key.verify_strict(&self.contents, &primary)
        }
        .map_err(|_| MinisignError::Verification)?;

        let mut global_input = Vec::with_capacity(64 + signature.trusted_comment.len());
        global_input.extend_from_slice(&signature.signature);
        global_input.extend_from_slice(signature.trusted_comment.as_bytes());
        let global = ed25519_dalek::Signature::from_bytes(&signature.global_signature);
        verifying_key
            .verify_strict(&global_input, &global)
            .map_err(|_| MinisignError::Verification)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::secret::SecretKeyBuilder;
    use crate::sig::file::SigFile;
    use std::io::{Cursor, Seek, SeekFrom, Write};

    fn message(data: &[u8]) -> MessageFile {
        MessageFile::from_reader(Cursor::new(data.to_vec())).unwrap()
    }

    fn test_key() -> SecretKey {
        SecretKeyBuilder::new().build()
    }

    #[test]
    fn test_sign_verify_direct() {
        let key = test_key();
        let msg = message(b"hello minisig");
        let sig = msg.sign(&key, false, "trusted", "untrusted").unwrap();
        assert_eq!(sig.algorithm, SIG_ALG_ED25519);
        assert!(!sig.is_prehashed());
        assert!(msg.verify(&key.public_key(), &sig).is_ok());
    }

    #[test]
    fn test_sign_verify_prehashed() {
        let key = test_key();
        let msg = message(b"hello minisig");
        let sig = msg.sign(&key, true, "trusted", "untrusted").unwrap();
        assert_eq!(sig.algorithm, SIG_ALG_PREHASHED);
        assert!(sig.is_prehashed());
        assert!(msg.verify(&key.public_key(), &sig).is_ok());
    }

    #[test]
    fn test_modes_produce_different_signatures() {
        let key = test_key();
        let msg = message(b"same content");
        let direct = msg.sign(&key, false, "t", "u").unwrap();
        let prehashed = msg.sign(&key, true, "t", "u").unwrap();
        assert_ne!(direct.signature, prehashed.signature);
    }

    #[test]
    fn test_tampered_content_fails() {
        let key = test_key();
        let sig = message(b"original").sign(&key, false, "t", "u").unwrap();
        let err = message(b"tampered")
            .verify(&key.public_key(), &sig)
            .unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_tag_swap_alone_fails() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, true, "t", "u").unwrap();
        sig.algorithm = SIG_ALG_ED25519;
        let err = msg.verify(&key.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, false, "t", "u").unwrap();
        sig.algorithm = *b"Xy";
        let err = msg.verify(&key.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_tampered_trusted_comment_fails() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, false, "key is valid until 2027", "u").unwrap();
        sig.trusted_comment = "key is valid until 2037".to_string();
        let err = msg.verify(&key.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_untrusted_comment_not_covered() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, false, "t", "original annotation").unwrap();
        sig.untrusted_comment = "altered annotation".to_string();
        assert!(msg.verify(&key.public_key(), &sig).is_ok());
    }

    #[test]
    fn test_tampered_primary_signature_fails() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, false, "t", "u").unwrap();
        sig.signature[0] ^= 0x01;
        let err = msg.verify(&key.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_tampered_global_signature_fails() {
        let key = test_key();
        let msg = message(b"content");
        let mut sig = msg.sign(&key, false, "t", "u").unwrap();
        sig.global_signature[0] ^= 0x01;
        let err = msg.verify(&key.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_wrong_public_key_fails() {
        let key = test_key();
        let other = test_key();
        let msg = message(b"content");
        let sig = msg.sign(&key, false, "t", "u").unwrap();
        let err = msg.verify(&other.public_key(), &sig).unwrap_err();
        assert!(matches!(err, MinisignError::Verification));
    }

    #[test]
    fn test_empty_message() {
        let key = test_key();
        let msg = message(b"");
        assert!(msg.is_empty());
        for prehash in [false, true] {
            let sig = msg.sign(&key, prehash, "t", "u").unwrap();
            assert!(msg.verify(&key.public_key(), &sig).is_ok());
        }
    }

    #[test]
    fn test_large_message() {
        let data: Vec<u8> = (0..3_000_000u32).map(|i| (i % 251) as u8).collect();
        let key = test_key();
        let msg = message(&data);
        let sig = msg.sign(&key, true, "t", "u").unwrap();
        assert!(msg.verify(&key.public_key(), &sig).is_ok());
    }

    #[test]
    fn test_hash_matches_one_shot() {
        let data = b"chunk boundary check".repeat(1000);
        let mut msg = message(&data);
        msg.set_chunk_size(777);
        assert_eq!(msg.hash(), crate::crypto::hash::digest512(&data));
    }

    #[test]
    fn test_from_reader_rewinds() {
        let mut cursor = Cursor::new(b"full contents".to_vec());
        cursor.seek(SeekFrom::End(0)).unwrap();
        let msg = MessageFile::from_reader(cursor).unwrap();
        assert_eq!(msg.contents(), b"full contents");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"signed note").unwrap();
        drop(file);

        let msg = MessageFile::from_file(&path).unwrap();
        assert_eq!(msg.contents(), b"signed note");
        assert_eq!(msg.len(), 11);
    }

    #[test]
    fn test_signature_survives_record_roundtrip() {
        let key = test_key();
        let msg = message(b"release tarball bytes");
        let sig = msg
            .sign(&key, true, "timestamp:1700000000\tfile:release.tar", "sig")
            .unwrap();
        let restored = SigFile::serialize(&sig).unwrap().deserialize().unwrap();
        assert_eq!(restored, sig);
        assert!(msg.verify(&key.public_key(), &restored).is_ok());
    }
}
