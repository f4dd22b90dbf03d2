/// Wrappers for secret material that is zeroized on drop.
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The 32-byte Ed25519 seed carried inside a decrypted secret key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

impl Seed {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A variable-length secret buffer (keystreams, decrypted key blocks).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBuffer(Vec<u8>);

impl SensitiveBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SensitiveBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Renders only the length; the bytes stay out of logs and panic messages.
impl fmt::Debug for SensitiveBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensitiveBuffer")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// A password handed to the secret key codec.
///
/// The codec consumes it, so the bytes are wiped on every exit path,
/// including early error returns.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Password(Vec<u8>);

impl Password {
    pub fn new(text: String) -> Self {
        Self(text.into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for Password {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Password {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_accessors() {
        let seed = Seed::new([0xAA; 32]);
        assert_eq!(seed.as_bytes(), &[0xAA; 32]);
    }

    #[test]
    fn test_seed_from_slice() {
        assert!(Seed::from_slice(&[0u8; 32]).is_some());
        assert!(Seed::from_slice(&[0u8; 16]).is_none());
        assert!(Seed::from_slice(&[0u8; 33]).is_none());
    }

    #[test]
    fn test_sensitive_buffer() {
        let mut buf = SensitiveBuffer::new(vec![1, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_empty());
        buf.as_mut_bytes()[0] ^= 0xFF;
        assert_eq!(buf.as_bytes(), &[0xFE, 2, 3]);
    }

    #[test]
    fn test_password_from_string() {
        let password = Password::from("hunter2");
        assert_eq!(password.as_bytes(), b"hunter2");
    }

    #[test]
    fn test_sensitive_buffer_debug_redacts_contents() {
        let buf = SensitiveBuffer::new(vec![0xAB; 3]);
        let rendered = format!("{buf:?}");
        assert!(rendered.contains("len: 3"));
        assert!(!rendered.contains("171"));
    }
}
