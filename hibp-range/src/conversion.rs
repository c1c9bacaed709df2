use std::fmt;

use sha1::{Digest, Sha1};

use crate::error::Error;

/// The length of the hex prefix sent to the range API (5 hex characters).
pub const PREFIX_LEN: usize = 5;

/// The length of the hex suffix kept locally (35 hex characters).
pub const SUFFIX_LEN: usize = 35;

/// The length of a full SHA1 digest rendered as hex.
pub const DIGEST_HEX_LEN: usize = PREFIX_LEN + SUFFIX_LEN;

/// Hex lookup table for digest conversion.
pub const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// The 5-character uppercase hex prefix of a SHA1 digest.
///
/// This is the only credential-derived value that is ever sent over the network.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix([u8; PREFIX_LEN]);

/// The 35-character uppercase hex remainder of a SHA1 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Suffix([u8; SUFFIX_LEN]);

impl Prefix {
    /// Parses a prefix, accepting exactly 5 ASCII hex digits in either case.
    ///
    /// Lowercase digits are normalized to uppercase. Anything else is rejected
    /// so a truncated or garbled value never reaches the remote service.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let bytes = s.as_bytes();
        if bytes.len() != PREFIX_LEN || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(Error::InvalidPrefix { prefix: s.to_string() });
        }

        let mut out = [0u8; PREFIX_LEN];
        for (dst, src) in out.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: only ever built from HEX_CHARS or validated ASCII hex digits
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }
}

impl Suffix {
    pub fn as_str(&self) -> &str {
        // SAFETY: only ever built from HEX_CHARS
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }

    /// Compares against a suffix from a range response, ignoring ASCII case.
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.as_bytes().eq_ignore_ascii_case(&self.0)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefix({})", self.as_str())
    }
}

// The suffix completes the digest, so keep it out of debug output.
impl fmt::Debug for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Suffix(..)")
    }
}

/// SHA1 of the credential bytes as 40 uppercase hex characters (stack allocated)
#[inline]
pub fn digest_hex(credential: &[u8]) -> [u8; DIGEST_HEX_LEN] {
    let hash: [u8; 20] = Sha1::digest(credential).into();

    let mut out = [0u8; DIGEST_HEX_LEN];
    for (i, byte) in hash.iter().enumerate() {
        out[i * 2] = HEX_CHARS[(byte >> 4) as usize];
        out[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
    }
    out
}

/// Hash a credential and split the hex digest into the prefix that is sent to
/// the range API and the suffix that is matched locally.
///
/// Total over all inputs, including the empty one.
#[inline]
pub fn split(credential: &[u8]) -> (Prefix, Suffix) {
    let hex = digest_hex(credential);

    let mut prefix = [0u8; PREFIX_LEN];
    let mut suffix = [0u8; SUFFIX_LEN];
    prefix.copy_from_slice(&hex[..PREFIX_LEN]);
    suffix.copy_from_slice(&hex[PREFIX_LEN..]);

    (Prefix(prefix), Suffix(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_password() {
        // SHA1("password") = 5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8
        let (prefix, suffix) = split(b"password");

        assert_eq!(prefix.as_str(), "5BAA6");
        assert_eq!(suffix.as_str(), "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
    }

    #[test]
    fn test_split_empty() {
        // SHA1("") = DA39A3EE5E6B4B0D3255BFEF95601890AFD80709
        let (prefix, suffix) = split(b"");

        assert_eq!(prefix.as_str(), "DA39A");
        assert_eq!(suffix.as_str(), "3EE5E6B4B0D3255BFEF95601890AFD80709");
    }

    #[test]
    fn test_split_password123() {
        // SHA1("password123") = CBFDAC6008F9CAB4083784CBD1874F76618D2A97
        let (prefix, suffix) = split(b"password123");

        assert_eq!(prefix.as_str(), "CBFDA");
        assert_eq!(suffix.as_str(), "C6008F9CAB4083784CBD1874F76618D2A97");
    }

    #[test]
    fn test_split_concatenates_to_digest() {
        let inputs: [&[u8]; 5] = [b"", b"a", b"hunter2", "pässwörd".as_bytes(), &[0xff, 0x00, 0x80]];

        for input in inputs {
            let (prefix, suffix) = split(input);
            let digest = digest_hex(input);

            assert_eq!(prefix.as_str().len(), PREFIX_LEN);
            assert_eq!(suffix.as_str().len(), SUFFIX_LEN);
            assert_eq!(format!("{prefix}{}", suffix.as_str()).as_bytes(), &digest[..]);
            assert!(digest.iter().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(split(b"correct horse"), split(b"correct horse"));
        assert_ne!(split(b"correct horse"), split(b"correct horse "));
    }

    #[test]
    fn test_prefix_parse() {
        assert_eq!(Prefix::parse("5BAA6").unwrap().as_str(), "5BAA6");
        assert_eq!(Prefix::parse("5baa6").unwrap().as_str(), "5BAA6");
        assert_eq!(Prefix::parse("00000").unwrap().as_str(), "00000");
        assert_eq!(Prefix::parse("FFFFF").unwrap().as_str(), "FFFFF");
    }

    #[test]
    fn test_prefix_parse_rejects_malformed() {
        for bad in ["", "5BAA", "5BAA61", "5BAG6", "5BA 6", "ÄBAA6"] {
            assert!(
                matches!(Prefix::parse(bad), Err(Error::InvalidPrefix { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_suffix_matches_ignores_case() {
        let (_, suffix) = split(b"password");

        assert!(suffix.matches("1E4C9B93F3F0682250B6CF8331B7EE68FD8"));
        assert!(suffix.matches("1e4c9b93f3f0682250b6cf8331b7ee68fd8"));
        assert!(!suffix.matches("1E4C9B93F3F0682250B6CF8331B7EE68FD"));
        assert!(!suffix.matches(""));
    }

    #[test]
    fn test_suffix_debug_is_redacted() {
        let (_, suffix) = split(b"password");
        assert_eq!(format!("{suffix:?}"), "Suffix(..)");
    }
}
