#![warn(missing_docs)]

//! The signed access token protocol.
//!
//! A [Token] is an immutable claim binding a resource identifier to at most
//! one authorization condition (an expiry instant, a session fingerprint, or
//! a required role). Tokens travel as an opaque, tamper-evident string:
//!
//! ```text
//! base64url(JSON(token)) "." hex(HMAC-SHA256(secret, base64-payload))
//! ```
//!
//! The [Signer] produces and checks the integrity tag, the [TokenCodec]
//! layers (de)serialization on top of it, and the [TokenIssuer] resolves an
//! issuance policy into a token and renders the full callable URL.
//!
//! ```rust
//! use portcullis_common::{StaticAuthorizationContext, SystemClock};
//! use portcullis_token::{IssuerPolicy, Signer, TokenCodec, TokenIssuer};
//!
//! let codec = TokenCodec::new(Signer::new(b"not-a-real-secret"));
//! let issuer = TokenIssuer::new(
//!     codec,
//!     SystemClock,
//!     "https://example.com/".parse().unwrap(),
//! );
//! let auth = StaticAuthorizationContext::anonymous();
//!
//! let url = issuer
//!     .issue("0a1b2c3d", &IssuerPolicy::public(), &auth)
//!     .unwrap();
//! assert!(url.query().unwrap().starts_with("__protectedResource="));
//! ```

mod error;
pub use error::*;

mod signer;
pub use signer::*;

mod token;
pub use token::*;

mod codec;
pub use codec::*;

mod issuer;
pub use issuer::*;
