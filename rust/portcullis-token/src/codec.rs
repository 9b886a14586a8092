use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::{Signer, Token, TokenError};

/// Serializes tokens to and from their transport-safe signed string form,
/// composing a [Signer] for tamper evidence.
///
/// Wire form: `base64url(JSON(token))` followed by the signer's tag. The tag
/// covers the encoded payload bytes exactly as they appear on the wire.
#[derive(Clone, Debug)]
pub struct TokenCodec {
    signer: Signer,
}

impl TokenCodec {
    /// Creates a codec signing with the given [Signer].
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// Encodes and signs a token.
    pub fn encode(&self, token: &Token) -> Result<String, TokenError> {
        let json = serde_json::to_vec(token)
            .map_err(|error| TokenError::MalformedToken(format!("{error}")))?;
        Ok(self.signer.sign(&URL_SAFE_NO_PAD.encode(json)))
    }

    /// Verifies and decodes a signed payload.
    ///
    /// The signature check runs first; only a payload with a valid tag is
    /// ever parsed. Structurally invalid payloads behind a valid tag fail
    /// with [TokenError::MalformedToken].
    pub fn decode(&self, signed: &str) -> Result<Token, TokenError> {
        let payload = self.signer.verify(signed)?;
        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|error| TokenError::MalformedToken(format!("{error}")))?;
        serde_json::from_slice(&json)
            .map_err(|error| TokenError::MalformedToken(format!("{error}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(Signer::new(b"top secret"))
    }

    #[test]
    fn it_round_trips_every_token_shape() {
        let codec = codec();
        let tokens = [
            Token::for_resource("0a1b2c3d"),
            Token::for_resource("0a1b2c3d")
                .expiring_at(Utc.with_ymd_and_hms(2025, 5, 7, 5, 48, 59).unwrap()),
            Token::for_resource("0a1b2c3d").bound_to_context("fingerprint"),
            Token::for_resource("0a1b2c3d").requiring_role("editor"),
        ];

        for token in tokens {
            let decoded = codec.decode(&codec.encode(&token).unwrap()).unwrap();
            assert_eq!(decoded, token);
        }
    }

    #[test]
    fn it_rejects_a_validly_signed_but_incomplete_payload() {
        let signer = Signer::new(b"top secret");
        let payload = URL_SAFE_NO_PAD.encode(r#"{"privilegedRole":"editor"}"#);
        let signed = signer.sign(&payload);

        assert!(matches!(
            codec().decode(&signed),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn it_rejects_validly_signed_garbage() {
        let signer = Signer::new(b"top secret");

        let not_base64 = signer.sign("!!not-base64!!");
        assert!(matches!(
            codec().decode(&not_base64),
            Err(TokenError::MalformedToken(_))
        ));

        let not_json = signer.sign(&URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(
            codec().decode(&not_json),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn it_rejects_a_payload_signed_with_another_secret() {
        let foreign = TokenCodec::new(Signer::new(b"other secret"));
        let signed = foreign.encode(&Token::for_resource("0a1b2c3d")).unwrap();

        assert!(matches!(
            codec().decode(&signed),
            Err(TokenError::InvalidSignature)
        ));
    }
}
