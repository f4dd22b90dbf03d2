/// Container format constants and text-level helpers.
///
/// Every minisig artifact is a short text record: one or more comment lines
/// plus base64 payload lines, CRLF terminated. The two-byte algorithm tags
/// below are part of the binary payloads and select the cryptography; an
/// unknown tag is always an error, never a fallback.
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{MinisignError, Result};

/// Ed25519 over the raw message.
pub const SIG_ALG_ED25519: [u8; 2] = *b"Ed";
/// Ed25519 over the BLAKE2b-512 digest of the message.
pub const SIG_ALG_PREHASHED: [u8; 2] = *b"ED";
/// scrypt key derivation for the secret key container.
pub const KDF_ALG_SCRYPT: [u8; 2] = *b"Sc";
/// BLAKE2b secret key checksum.
pub const CHECKSUM_ALG_BLAKE2: [u8; 2] = *b"B2";

pub const UNTRUSTED_COMMENT_PREFIX: &str = "untrusted comment: ";
pub const TRUSTED_COMMENT_PREFIX: &str = "trusted comment: ";

/// Padded base64 output; decoding accepts padded and unpadded input.
const B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Unpadded base64 output (public key payloads); decoding as above.
const B64_NO_PAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as padded base64.
pub fn encode_base64(data: &[u8]) -> String {
    B64.encode(data)
}

/// Encode bytes as unpadded base64.
pub fn encode_base64_unpadded(data: &[u8]) -> String {
    B64_NO_PAD.encode(data)
}

/// Decode a base64 payload line, padded or unpadded.
pub fn decode_base64(line: &str) -> Result<Vec<u8>> {
    if line.is_empty() || !line.bytes().all(is_base64_byte) {
        return Err(MinisignError::Format(
            "Payload line is not base64".to_string(),
        ));
    }
    B64.decode(line)
        .map_err(|e| MinisignError::Format(format!("Base64 decode failed: {e}")))
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

/// Split record text into logical lines, collapsing any run of CR/LF.
pub fn logical_lines(text: &str) -> Vec<&str> {
    text.split(['\r', '\n']).filter(|l| !l.is_empty()).collect()
}

/// Strip a comment prefix from a record line.
pub fn parse_comment_line<'a>(line: &'a str, prefix: &'static str) -> Result<&'a str> {
    line.strip_prefix(prefix).ok_or_else(|| {
        MinisignError::Format(format!("Expected a line starting with {prefix:?}"))
    })
}

/// Reject comments that would corrupt the line framing.
pub fn check_comment(comment: &str) -> Result<()> {
    if comment.contains(['\r', '\n']) {
        return Err(MinisignError::Format(
            "Comments must not contain line breaks".to_string(),
        ));
    }
    Ok(())
}

/// Error for an algorithm tag this implementation does not know.
pub fn unsupported_algorithm(tag: [u8; 2]) -> MinisignError {
    MinisignError::UnsupportedAlgorithm(String::from_utf8_lossy(&tag).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_padded_and_unpadded() {
        let data = b"minisig format test";
        let padded = encode_base64(data);
        let unpadded = encode_base64_unpadded(data);
        assert!(padded.ends_with('='));
        assert!(!unpadded.ends_with('='));
        assert_eq!(decode_base64(&padded).unwrap(), data);
        assert_eq!(decode_base64(&unpadded).unwrap(), data);
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(decode_base64("").is_err());
        assert!(decode_base64("not base64!").is_err());
        assert!(decode_base64("abc def").is_err());
    }

    #[test]
    fn test_logical_lines_collapse_line_breaks() {
        let lines = logical_lines("one\r\ntwo\nthree\r\n");
        assert_eq!(lines, vec!["one", "two", "three"]);

        let lines = logical_lines("one\r\n\r\n\ntwo");
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_comment_line() {
        let line = "untrusted comment: hello";
        assert_eq!(
            parse_comment_line(line, UNTRUSTED_COMMENT_PREFIX).unwrap(),
            "hello"
        );
        assert_eq!(
            parse_comment_line("untrusted comment: ", UNTRUSTED_COMMENT_PREFIX).unwrap(),
            ""
        );
        assert!(parse_comment_line("trusted comment: x", UNTRUSTED_COMMENT_PREFIX).is_err());
    }

    #[test]
    fn test_check_comment_rejects_line_breaks() {
        assert!(check_comment("plain comment").is_ok());
        assert!(check_comment("split\ncomment").is_err());
        assert!(check_comment("split\rcomment").is_err());
    }
}
