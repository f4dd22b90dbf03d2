/// Key pairs and their identifiers.
use std::fmt;

use rand::RngCore;

pub mod public;
pub mod secret;

pub const KEY_ID_LEN: usize = 8;

/// Eight random bytes naming a key pair.
///
/// The id ties a signature to the key pair that produced it but carries no
/// cryptographic weight. Minisign renders it as the uppercase hex of the
/// little-endian 64-bit value; bare base64 public keys get an all-zero id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyId([u8; KEY_ID_LEN]);

impl KeyId {
    pub const ZERO: KeyId = KeyId([0u8; KEY_ID_LEN]);

    pub fn new(bytes: [u8; KEY_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_ID_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != KEY_ID_LEN {
            return None;
        }
        let mut bytes = [0u8; KEY_ID_LEN];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; KEY_ID_LEN]
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", u64::from_le_bytes(self.0))
    }
}
