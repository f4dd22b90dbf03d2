/// Encrypted secret key containers.
///
/// A secret key file is a comment line plus base64 of a 158-byte container:
///
/// [sig_alg(2) | kdf_alg(2) | chk_alg(2) | kdf_salt(32) | opslimit(8) | memlimit(8) | block(104)]
///
/// The block is [key_id(8) | seed(32) | public_key(32) | checksum(32)] XORed
/// with an scrypt keystream derived from the password. The checksum is
/// BLAKE2b-256 over sig_alg || key_id || seed || public_key; a mismatch after
/// decryption means a wrong password or a corrupted file, and the two are
/// deliberately indistinguishable.
use std::fmt;
use std::fs;
use std::path::Path;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::crypto::hash;
use crate::crypto::kdf;
use crate::crypto::sensitive::{Password, Seed, SensitiveBuffer};
use crate::error::{MinisignError, Result};
use crate::format::{
    self, CHECKSUM_ALG_BLAKE2, KDF_ALG_SCRYPT, SIG_ALG_ED25519, UNTRUSTED_COMMENT_PREFIX,
};
use crate::keys::public::PublicKey;
use crate::keys::{KeyId, KEY_ID_LEN};

const TAGS_LEN: usize = 6;
const LIMIT_LEN: usize = 8;
const BLOCK_LEN: usize = kdf::KEYSTREAM_LEN;
pub const CONTAINER_LEN: usize = TAGS_LEN + kdf::SALT_LEN + 2 * LIMIT_LEN + BLOCK_LEN;

const SEED_LEN: usize = 32;
const PUBLIC_KEY_LEN: usize = 32;

const DEFAULT_UNTRUSTED_COMMENT: &str = "minisign encrypted secret key";

/// A decrypted signing key.
pub struct SecretKey {
    signature_algorithm: [u8; 2],
    kdf_algorithm: [u8; 2],
    checksum_algorithm: [u8; 2],
    kdf_opslimit: u32,
    kdf_memlimit: u32,
    key_id: KeyId,
    seed: Seed,
    public_key: [u8; PUBLIC_KEY_LEN],
    untrusted_comment: String,
}

/// Builder for new secret keys.
///
/// Defaults produce a standard key: fresh random seed and id, SENSITIVE
/// KDF cost, standard tags. Overrides exist for reduced-cost keys and for
/// tests that need fixed seeds or deliberately unsupported tags.
pub struct SecretKeyBuilder {
    signature_algorithm: [u8; 2],
    kdf_algorithm: [u8; 2],
    checksum_algorithm: [u8; 2],
    kdf_opslimit: u32,
    kdf_memlimit: u32,
    key_id: Option<KeyId>,
    seed: Option<Seed>,
    untrusted_comment: String,
}

impl SecretKeyBuilder {
    pub fn new() -> Self {
        Self {
            signature_algorithm: SIG_ALG_ED25519,
            kdf_algorithm: KDF_ALG_SCRYPT,
            checksum_algorithm: CHECKSUM_ALG_BLAKE2,
            kdf_opslimit: kdf::OPSLIMIT_SENSITIVE,
            kdf_memlimit: kdf::MEMLIMIT_SENSITIVE,
            key_id: None,
            seed: None,
            untrusted_comment: DEFAULT_UNTRUSTED_COMMENT.to_string(),
        }
    }

    pub fn signature_algorithm(mut self, tag: [u8; 2]) -> Self {
        self.signature_algorithm = tag;
        self
    }

    pub fn kdf_algorithm(mut self, tag: [u8; 2]) -> Self {
        self.kdf_algorithm = tag;
        self
    }

    pub fn checksum_algorithm(mut self, tag: [u8; 2]) -> Self {
        self.checksum_algorithm = tag;
        self
    }

    pub fn kdf_opslimit(mut self, opslimit: u32) -> Self {
        self.kdf_opslimit = opslimit;
        self
    }

    pub fn kdf_memlimit(mut self, memlimit: u32) -> Self {
        self.kdf_memlimit = memlimit;
        self
    }

    pub fn key_id(mut self, key_id: KeyId) -> Self {
        self.key_id = Some(key_id);
        self
    }

    pub fn seed(mut self, seed: [u8; SEED_LEN]) -> Self {
        self.seed = Some(Seed::new(seed));
        self
    }

    pub fn untrusted_comment(mut self, comment: &str) -> Self {
        self.untrusted_comment = comment.to_string();
        self
    }

    /// Build the key, deriving the public half from the seed.
    pub fn build(self) -> SecretKey {
        let seed = self.seed.unwrap_or_else(|| {
            let mut bytes = SigningKey::generate(&mut OsRng).to_bytes();
            let seed = Seed::new(bytes);
            bytes.zeroize();
            seed
        });
        let public_key = SigningKey::from_bytes(seed.as_bytes())
            .verifying_key()
            .to_bytes();

        SecretKey {
            signature_algorithm: self.signature_algorithm,
            kdf_algorithm: self.kdf_algorithm,
            checksum_algorithm: self.checksum_algorithm,
            kdf_opslimit: self.kdf_opslimit,
            kdf_memlimit: self.kdf_memlimit,
            key_id: self.key_id.unwrap_or_else(KeyId::generate),
            seed,
            public_key,
            untrusted_comment: self.untrusted_comment,
        }
    }
}

impl Default for SecretKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretKey {
    /// Generate a standard key pair.
    pub fn generate() -> Self {
        SecretKeyBuilder::new().build()
    }

    /// Encrypt and serialize to record text. A fresh salt is drawn on every
    /// call, so two serializations of the same key differ.
    pub fn encrypt(&self, password: Password) -> Result<String> {
        format::check_comment(&self.untrusted_comment)?;

        let salt = kdf::generate_salt();
        let keystream = kdf::derive_keystream(
            self.kdf_algorithm,
            password.as_bytes(),
            &salt,
            self.kdf_opslimit,
            self.kdf_memlimit,
        )?;

        let checksum = self.checksum();
        let mut block = Vec::with_capacity(BLOCK_LEN);
        block.extend_from_slice(self.key_id.as_bytes());
        block.extend_from_slice(self.seed.as_bytes());
        block.extend_from_slice(&self.public_key);
        block.extend_from_slice(&checksum);
        let mut block = SensitiveBuffer::new(block);
        xor_in_place(block.as_mut_bytes(), keystream.as_bytes());

        let mut container = Vec::with_capacity(CONTAINER_LEN);
        container.extend_from_slice(&self.signature_algorithm);
        container.extend_from_slice(&self.kdf_algorithm);
        container.extend_from_slice(&self.checksum_algorithm);
        container.extend_from_slice(&salt);
        container.extend_from_slice(&encode_limit(self.kdf_opslimit));
        container.extend_from_slice(&encode_limit(self.kdf_memlimit));
        container.extend_from_slice(block.as_bytes());

        Ok(format!(
            "{}{}\r\n{}\r\n",
            UNTRUSTED_COMMENT_PREFIX,
            self.untrusted_comment,
            format::encode_base64(&container)
        ))
    }

    /// Parse record text and decrypt the container with the password.
    pub fn decrypt(text: &str, password: Password) -> Result<Self> {
        let lines = format::logical_lines(text);
        if lines.len() != 2 {
            return Err(MinisignError::Format(
                "Secret key record must be a comment line and a payload line".to_string(),
            ));
        }
        let untrusted_comment =
            format::parse_comment_line(lines[0], UNTRUSTED_COMMENT_PREFIX)?.to_string();

        let container = format::decode_base64(lines[1])?;
        if container.len() != CONTAINER_LEN {
            return Err(MinisignError::Format(format!(
                "Secret key container is {} bytes (expected {})",
                container.len(),
                CONTAINER_LEN
            )));
        }

        let mut offset = 0;
        let mut signature_algorithm = [0u8; 2];
        signature_algorithm.copy_from_slice(&container[offset..offset + 2]);
        offset += 2;
        let mut kdf_algorithm = [0u8; 2];
        kdf_algorithm.copy_from_slice(&container[offset..offset + 2]);
        offset += 2;
        let mut checksum_algorithm = [0u8; 2];
        checksum_algorithm.copy_from_slice(&container[offset..offset + 2]);
        offset += 2;

        if signature_algorithm != SIG_ALG_ED25519 {
            return Err(format::unsupported_algorithm(signature_algorithm));
        }
        if checksum_algorithm != CHECKSUM_ALG_BLAKE2 {
            return Err(format::unsupported_algorithm(checksum_algorithm));
        }

        let salt = &container[offset..offset + kdf::SALT_LEN];
        offset += kdf::SALT_LEN;
        let kdf_opslimit = decode_limit(&container[offset..offset + LIMIT_LEN])?;
        offset += LIMIT_LEN;
        let kdf_memlimit = decode_limit(&container[offset..offset + LIMIT_LEN])?;
        offset += LIMIT_LEN;

        let keystream = kdf::derive_keystream(
            kdf_algorithm,
            password.as_bytes(),
            salt,
            kdf_opslimit,
            kdf_memlimit,
        )?;

        let mut block = SensitiveBuffer::new(container[offset..].to_vec());
        xor_in_place(block.as_mut_bytes(), keystream.as_bytes());
        let block_bytes = block.as_bytes();

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&block_bytes[0..KEY_ID_LEN]);
        let mut seed_bytes = [0u8; SEED_LEN];
        seed_bytes.copy_from_slice(&block_bytes[KEY_ID_LEN..KEY_ID_LEN + SEED_LEN]);
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&block_bytes[KEY_ID_LEN + SEED_LEN..BLOCK_LEN - 32]);
        let mut stored_checksum = [0u8; 32];
        stored_checksum.copy_from_slice(&block_bytes[BLOCK_LEN - 32..]);

        let key = SecretKey {
            signature_algorithm,
            kdf_algorithm,
            checksum_algorithm,
            kdf_opslimit,
            kdf_memlimit,
            key_id: KeyId::new(key_id),
            seed: Seed::new(seed_bytes),
            public_key,
            untrusted_comment,
        };
        seed_bytes.zeroize();

        let expected = key.checksum();
        if !bool::from(expected.ct_eq(&stored_checksum)) {
            return Err(MinisignError::Authentication);
        }
        Ok(key)
    }

    /// Read and decrypt a secret key file.
    pub fn from_file(path: impl AsRef<Path>, password: Password) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::decrypt(&text, password)
    }

    /// The signing half of the key pair.
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(self.seed.as_bytes())
    }

    /// The public half, carrying the same key id and the standard comment.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(
            self.public_key,
            self.key_id,
            &format!("minisign public key {}", self.key_id),
        )
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn public_key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn untrusted_comment(&self) -> &str {
        &self.untrusted_comment
    }

    pub fn kdf_opslimit(&self) -> u32 {
        self.kdf_opslimit
    }

    pub fn kdf_memlimit(&self) -> u32 {
        self.kdf_memlimit
    }

    /// BLAKE2b-256 over sig_alg || key_id || seed || public_key.
    fn checksum(&self) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(2 + KEY_ID_LEN + SEED_LEN + PUBLIC_KEY_LEN);
        preimage.extend_from_slice(&self.signature_algorithm);
        preimage.extend_from_slice(self.key_id.as_bytes());
        preimage.extend_from_slice(self.seed.as_bytes());
        preimage.extend_from_slice(&self.public_key);
        let preimage = SensitiveBuffer::new(preimage);
        hash::digest256(preimage.as_bytes())
    }
}

/// Renders only the key id; the seed stays out of logs and panic messages.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

fn xor_in_place(block: &mut [u8], keystream: &[u8]) {
    for (b, k) in block.iter_mut().zip(keystream) {
        *b ^= *k;
    }
}

/// Limits are stored as a 32-bit little-endian value in a 64-bit field.
fn encode_limit(limit: u32) -> [u8; LIMIT_LEN] {
    u64::from(limit).to_le_bytes()
}

/// Reads the full 8-byte field; values that do not fit in 32 bits are a
/// `Format` error, not truncated to the low half.
fn decode_limit(bytes: &[u8]) -> Result<u32> {
    let mut raw = [0u8; LIMIT_LEN];
    raw.copy_from_slice(bytes);
    u32::try_from(u64::from_le_bytes(raw))
        .map_err(|_| MinisignError::Format("KDF limit out of range".to_string()))
}
