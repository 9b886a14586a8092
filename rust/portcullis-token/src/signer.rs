use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::TokenError;

/// Separator between the encoded payload and its integrity tag.
pub const TAG_SEPARATOR: char = '.';

const TAG_HEX_LENGTH: usize = 64;

/// Appends and verifies a keyed integrity tag over an opaque payload.
///
/// The tag is an HMAC-SHA256 over the exact payload bytes, rendered as
/// lowercase hex and appended behind a [TAG_SEPARATOR]. The tag provides
/// tamper evidence, not confidentiality: the payload stays readable to
/// anyone holding the signed string.
///
/// Rotating the secret invalidates every previously signed payload.
#[derive(Clone)]
pub struct Signer {
    secret: Arc<[u8]>,
}

impl Signer {
    /// Creates a [Signer] over the given process-wide secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Signs `payload`, producing `payload || separator || tag`.
    pub fn sign(&self, payload: &str) -> String {
        let tag = self.tag(payload.as_bytes());
        format!("{payload}{TAG_SEPARATOR}{}", hex_encode(&tag))
    }

    /// Verifies a signed payload and strips the tag, returning the payload
    /// it covers. Fails with [TokenError::InvalidSignature] when the input
    /// has no tag, the tag is not well-formed, or it does not match.
    pub fn verify<'a>(&self, signed: &'a str) -> Result<&'a str, TokenError> {
        let (payload, tag) = signed
            .rsplit_once(TAG_SEPARATOR)
            .ok_or(TokenError::InvalidSignature)?;
        let tag = hex_decode(tag).ok_or(TokenError::InvalidSignature)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag)
            .map_err(|_| TokenError::InvalidSignature)?;

        Ok(payload)
    }

    fn tag(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> Hmac<Sha256> {
        Hmac::<Sha256>::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(s, "{:02x}", byte).expect("writing to a String is infallible");
    }
    s
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() != TAG_HEX_LENGTH {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_a_signed_payload() {
        let signer = Signer::new(b"top secret");
        let signed = signer.sign("eyJhIjoxfQ");

        assert_eq!(signer.verify(&signed).unwrap(), "eyJhIjoxfQ");
    }

    #[test]
    fn it_rejects_a_missing_or_short_tag() {
        let signer = Signer::new(b"top secret");

        assert!(matches!(
            signer.verify("no-separator-here"),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            signer.verify("payload.deadbeef"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn it_rejects_any_single_character_mutation() {
        let signer = Signer::new(b"top secret");
        let signed = signer.sign("eyJhIjoxfQ");

        for position in 0..signed.len() {
            let mut mutated: Vec<char> = signed.chars().collect();
            mutated[position] = if mutated[position] == 'x' { 'y' } else { 'x' };
            let mutated: String = mutated.into_iter().collect();
            if mutated == signed {
                continue;
            }

            assert!(
                matches!(signer.verify(&mutated), Err(TokenError::InvalidSignature)),
                "mutation at {position} was accepted"
            );
        }
    }

    #[test]
    fn it_rejects_a_tag_from_a_different_secret() {
        let signed = Signer::new(b"key one").sign("eyJhIjoxfQ");

        assert!(matches!(
            Signer::new(b"key two").verify(&signed),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_hex_encode() {
        let bytes = [0x01, 0x02, 0x03, 0x0A, 0x0F];
        assert_eq!(hex_encode(&bytes), "0102030a0f");
    }

    #[test]
    fn test_hex_decode_rejects_bad_lengths() {
        assert_eq!(hex_decode("0102"), None);
        assert_eq!(hex_decode(&"0".repeat(63)), None);
        assert!(hex_decode(&"ab".repeat(32)).is_some());
    }
}
