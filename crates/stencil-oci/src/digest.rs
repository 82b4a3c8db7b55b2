//! Content digests.
//!
//! Digests are algorithm-prefixed lower-hex (`sha256:<64 hex chars>`).
//! Declared digests are normalized to lower-case hex before comparison, then
//! matched exactly.

use std::io::{Cursor, Read};

use sha2::{Digest, Sha256};

use crate::error::{OciError, OciResult};

/// Digest algorithm prefix.
pub const SHA256_PREFIX: &str = "sha256:";

/// Hash a reader into an algorithm-prefixed hex digest.
pub fn sha256_hex_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize())))
}

/// Hash a byte slice into an algorithm-prefixed hex digest.
pub fn sha256_hex_bytes(bytes: &[u8]) -> String {
    // In-memory hashing is infallible; keep a single hashing implementation.
    sha256_hex_reader(Cursor::new(bytes)).expect("hashing in-memory bytes via cursor must not fail")
}

/// Validate a declared digest and normalize its hex portion to lower case.
pub fn parse(digest: &str) -> OciResult<String> {
    let Some(hex_part) = digest.strip_prefix(SHA256_PREFIX) else {
        return Err(OciError::InvalidDigest {
            digest: digest.to_string(),
            reason: format!("must start with '{SHA256_PREFIX}'"),
        });
    };
    if hex_part.len() != 64 {
        return Err(OciError::InvalidDigest {
            digest: digest.to_string(),
            reason: format!("expected 64 hex characters, got {}", hex_part.len()),
        });
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(OciError::InvalidDigest {
            digest: digest.to_string(),
            reason: "non-hex character in digest".to_string(),
        });
    }
    Ok(format!("{SHA256_PREFIX}{}", hex_part.to_ascii_lowercase()))
}

/// Recompute the digest of `bytes` and compare against a declared digest.
pub fn verify(expected: &str, bytes: &[u8]) -> OciResult<()> {
    let expected = parse(expected)?;
    let actual = sha256_hex_bytes(bytes);
    if expected != actual {
        return Err(OciError::DigestMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ChunkedReader<'a> {
        data: &'a [u8],
        pos: usize,
        max_chunk: usize,
    }

    impl<'a> Read for ChunkedReader<'a> {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.data.len() {
                return Ok(0);
            }
            let n = out
                .len()
                .min(self.max_chunk)
                .min(self.data.len().saturating_sub(self.pos));
            out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn sha256_reader_matches_bytes_digest() {
        let payload = b"\x00\x01hello\xffbinary\n";
        let from_bytes = sha256_hex_bytes(payload);
        let from_reader = sha256_hex_reader(Cursor::new(payload)).expect("reader hashing");
        assert_eq!(from_bytes, from_reader);
    }

    #[test]
    fn sha256_reader_chunked_stream_parity() {
        let payload = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let from_bytes = sha256_hex_bytes(payload);
        let chunked = ChunkedReader {
            data: payload,
            pos: 0,
            max_chunk: 3,
        };
        let from_chunked = sha256_hex_reader(chunked).expect("chunked reader hashing");
        assert_eq!(from_bytes, from_chunked);
    }

    #[test]
    fn parse_normalizes_hex_case() {
        let digest = format!("sha256:{}", "AB".repeat(32));
        let normalized = parse(&digest).unwrap();
        assert_eq!(normalized, format!("sha256:{}", "ab".repeat(32)));
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        let result = parse(&format!("md5:{}", "ab".repeat(32)));
        assert!(matches!(result, Err(OciError::InvalidDigest { .. })));
    }

    #[test]
    fn parse_rejects_short_hex() {
        let result = parse("sha256:abc123");
        assert!(matches!(result, Err(OciError::InvalidDigest { .. })));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let result = parse(&format!("sha256:{}", "zz".repeat(32)));
        assert!(matches!(result, Err(OciError::InvalidDigest { .. })));
    }

    #[test]
    fn verify_accepts_matching_content() {
        let payload = b"template bytes";
        let digest = sha256_hex_bytes(payload);
        assert!(verify(&digest, payload).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_content() {
        let digest = sha256_hex_bytes(b"original");
        let result = verify(&digest, b"tampered");
        assert!(matches!(result, Err(OciError::DigestMismatch { .. })));
    }

    #[test]
    fn verify_accepts_upper_case_declared_hex() {
        let payload = b"case test";
        let digest = sha256_hex_bytes(payload);
        let upper = format!(
            "{SHA256_PREFIX}{}",
            digest.trim_start_matches(SHA256_PREFIX).to_ascii_uppercase()
        );
        assert!(verify(&upper, payload).is_ok());
    }
}
