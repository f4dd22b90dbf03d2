/// scrypt key derivation for the secret key container.
///
/// The container stores opslimit/memlimit pairs, not raw scrypt parameters.
/// `pick_params` maps them to (log2 N, r, p) exactly the way libsodium's
/// scryptsalsa208sha256 picker does, so keys written with the standard cost
/// settings decrypt under the same parameters everywhere:
/// SENSITIVE -> N = 2^20, r = 8, p = 1; INTERACTIVE -> N = 2^14, r = 8, p = 1.
use rand::RngCore;
use scrypt::Params;
use tracing::debug;

use crate::crypto::sensitive::SensitiveBuffer;
use crate::error::{MinisignError, Result};
use crate::format::{self, KDF_ALG_SCRYPT};

/// Default cost for newly generated keys.
pub const OPSLIMIT_SENSITIVE: u32 = 33_554_432;
pub const MEMLIMIT_SENSITIVE: u32 = 1_073_741_824;

/// Reduced cost for interactive use and tests.
pub const OPSLIMIT_INTERACTIVE: u32 = 524_288;
pub const MEMLIMIT_INTERACTIVE: u32 = 16_777_216;

pub const SALT_LEN: usize = 32;

/// Keystream length: covers the 104-byte encrypted secret block.
pub const KEYSTREAM_LEN: usize = 104;

/// Generate a random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the XOR keystream that encrypts a secret key block.
pub fn derive_keystream(
    kdf_algorithm: [u8; 2],
    password: &[u8],
    salt: &[u8],
    opslimit: u32,
    memlimit: u32,
) -> Result<SensitiveBuffer> {
    if kdf_algorithm != KDF_ALG_SCRYPT {
        return Err(format::unsupported_algorithm(kdf_algorithm));
    }

    let (log_n, r, p) = pick_params(u64::from(opslimit), u64::from(memlimit));
    debug!(log_n, r, p, "Deriving scrypt keystream");

    // The length argument is only consumed by the PHC string API; the raw
    // scrypt call takes its output length from the slice.
    let params = Params::new(log_n, r, p, 32)
        .map_err(|e| MinisignError::Format(format!("Invalid KDF parameters: {e}")))?;

    let mut keystream = vec![0u8; KEYSTREAM_LEN];
    scrypt::scrypt(password, salt, &params, &mut keystream)
        .map_err(|e| MinisignError::Format(format!("KDF output length rejected: {e}")))?;

    Ok(SensitiveBuffer::new(keystream))
}

/// Map an opslimit/memlimit pair to scrypt (log2 N, r, p).
///
/// opslimit is floored at 32768. When opslimit < memlimit / 32 the cost is
/// CPU-bound: p = 1 and N grows with opslimit. Otherwise N is taken from
/// memlimit and the remaining ops budget goes into p, with r * p capped at
/// 0x3fffffff.
fn pick_params(opslimit: u64, memlimit: u64) -> (u8, u32, u32) {
    let opslimit = opslimit.max(32_768);
    let r: u32 = 8;

    if opslimit < memlimit / 32 {
        let max_n = opslimit / (u64::from(r) * 4);
        (log2_ceil_half(max_n), r, 1)
    } else {
        let max_n = memlimit / (u64::from(r) * 128);
        let log_n = log2_ceil_half(max_n);
        let mut max_rp = (opslimit / 4) / (1u64 << log_n);
        if max_rp > 0x3fff_ffff {
            max_rp = 0x3fff_ffff;
        }
        (log_n, r, max_rp as u32 / r)
    }
}

/// Smallest L in 1..=63 with 2^L > max_n / 2.
fn log2_ceil_half(max_n: u64) -> u8 {
    let mut log_n = 1u8;
    while log_n < 63 {
        if 1u64 << log_n > max_n / 2 {
            break;
        }
        log_n += 1;
    }
    log_n
}
