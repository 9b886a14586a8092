use portcullis_store::ResourceMetadata;
use portcullis_token::Token;

use crate::{DenialReason, RequestContext};

/// Fire-and-forget notifications for audit logging and metrics.
///
/// Sinks observe the gateway; they never steer it. Implementations must not
/// panic and must return promptly - they run inline on the request path.
pub trait EventSink: Send + Sync {
    /// A verified request is about to receive resource bytes.
    fn resource_served(&self, metadata: &ResourceMetadata, context: &RequestContext);

    /// A token was denied. `token` is present when the payload decoded far
    /// enough to yield one (it is absent for signature/shape failures).
    fn access_denied(
        &self,
        token: Option<&Token>,
        context: &RequestContext,
        reason: &DenialReason,
    );
}

/// The default [EventSink]: structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn resource_served(&self, metadata: &ResourceMetadata, context: &RequestContext) {
        tracing::info!(
            identifier = %metadata.identifier,
            filename = %metadata.filename,
            byte_length = metadata.byte_length,
            method = %context.method,
            "resource served"
        );
    }

    fn access_denied(
        &self,
        token: Option<&Token>,
        context: &RequestContext,
        reason: &DenialReason,
    ) {
        tracing::warn!(
            identifier = token.map(|token| token.resource_identifier.as_str()),
            method = %context.method,
            uri = %context.uri,
            %reason,
            "access denied"
        );
    }
}

/// An [EventSink] that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn resource_served(&self, _metadata: &ResourceMetadata, _context: &RequestContext) {}

    fn access_denied(
        &self,
        _token: Option<&Token>,
        _context: &RequestContext,
        _reason: &DenialReason,
    ) {
    }
}
