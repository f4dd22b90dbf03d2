/// BLAKE2b hashing for message digests and secret key checksums.
///
/// Pre-hashed signatures cover the BLAKE2b-512 digest of the message; the
/// secret key container authenticates its contents with BLAKE2b-256.
use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};

/// Message digest length for pre-hashed signatures.
pub const DIGEST_LEN: usize = 64;
/// Checksum length inside the secret key container.
pub const CHECKSUM_LEN: usize = 32;

type Blake2b256 = Blake2b<U32>;

/// Incremental BLAKE2b-512 hasher for chunked message digests.
pub struct MessageHasher {
    inner: Blake2b512,
}

impl MessageHasher {
    pub fn new() -> Self {
        Self {
            inner: Blake2b512::new(),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&self.inner.finalize());
        digest
    }
}

impl Default for MessageHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot BLAKE2b-512.
pub fn digest512(data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&Blake2b512::digest(data));
    digest
}

/// One-shot BLAKE2b-256.
pub fn digest256(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut digest = [0u8; CHECKSUM_LEN];
    digest.copy_from_slice(&Blake2b256::digest(data));
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest512_known_vectors() {
        assert_eq!(
            hex::encode(digest512(b"")),
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
             d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce"
        );
        assert_eq!(
            hex::encode(digest512(b"abc")),
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
    }

    #[test]
    fn test_digest256_known_vectors() {
        assert_eq!(
            hex::encode(digest256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
        assert_eq!(
            hex::encode(digest256(b"abc")),
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }

    #[test]
    fn test_chunked_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut hasher = MessageHasher::new();
        for chunk in data.chunks(7) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finalize(), digest512(data));
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(digest512(b"hello"), digest512(b"world"));
        assert_ne!(digest256(b"hello"), digest256(b"world"));
    }
}
