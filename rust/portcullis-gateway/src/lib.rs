#![warn(missing_docs)]

//! The inbound half of the signed-URL protocol.
//!
//! A [Gateway] intercepts requests that carry a signed token parameter,
//! drives the [TokenVerifier] pipeline (signature, expiry, authorization),
//! resolves the named resource against a
//! [ResourceStore](portcullis_store::ResourceStore), and releases the bytes
//! through the configured [DeliveryStrategy]. Requests without a token
//! parameter pass through to the wrapped handler untouched.
//!
//! The gateway is framework agnostic: it consumes [hyper] request and
//! response types and a `next` closure, and never owns a socket. Wire it
//! into whatever service stack the host application runs.

mod error;
pub use error::*;

mod context;
pub use context::*;

mod events;
pub use events::*;

mod verifier;
pub use verifier::*;

mod delivery;
pub use delivery::*;

mod gateway;
pub use gateway::*;
