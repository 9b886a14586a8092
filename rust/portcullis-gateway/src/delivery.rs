use std::io;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, Empty, Full, StreamBody, combinators::BoxBody};
use hyper::Response;
use hyper::body::Frame;
use hyper::header::{HeaderName, HeaderValue};
use portcullis_store::{ByteSource, ResourceMetadata, ResourceStore, StoreError};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::GatewayError;

/// The unified response body type produced by every delivery strategy.
pub type GateBody = BoxBody<Bytes, io::Error>;

/// How resource bytes reach the client once a token has been verified.
///
/// The strategy is fixed at gateway construction time; dispatch is an
/// exhaustive match, never a runtime capability probe. Configuration
/// documents select a variant by its kebab-case name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStrategy {
    /// Load the entire resource into the response body eagerly. Memory
    /// cost is proportional to resource size; only suitable for small
    /// resources.
    BufferedRead,

    /// Attach the byte source as a lazily-consumed stream. The preferred
    /// default for resources of any size.
    #[default]
    DirectStream,

    /// Transmit no bytes; name the blob's filesystem path in an
    /// `X-Accel-Redirect` header for an nginx proxy to intercept.
    XAccelRedirect,

    /// Transmit no bytes; name the blob's filesystem path in an
    /// `X-Sendfile` header for an Apache mod_xsendfile proxy to intercept.
    XSendfile,
}

/// Gateway delivery configuration, resolved once at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    /// The delivery strategy to dispatch every verified request through.
    #[serde(default)]
    pub strategy: DeliveryStrategy,
}

impl DeliveryStrategy {
    /// Produces the outgoing response for a verified, resolved resource.
    ///
    /// `response` arrives with the content headers already set; this method
    /// supplies the body (or, for the proxy-redirect variants, the redirect
    /// header and an empty body).
    pub async fn serve(
        &self,
        store: &dyn ResourceStore,
        metadata: &ResourceMetadata,
        response: hyper::http::response::Builder,
    ) -> Result<Response<GateBody>, GatewayError> {
        match self {
            DeliveryStrategy::BufferedRead => {
                let source = self.open(store, metadata).await?;
                let content = buffer(source, metadata.byte_length).await?;
                finish(response, full_body(content))
            }
            DeliveryStrategy::DirectStream => {
                let source = self.open(store, metadata).await?;
                finish(response, stream_body(source))
            }
            DeliveryStrategy::XAccelRedirect => {
                let path = self.resolve_blob_path(store, metadata).await?;
                finish(
                    response.header(HeaderName::from_static("x-accel-redirect"), path),
                    empty_body(),
                )
            }
            DeliveryStrategy::XSendfile => {
                let path = self.resolve_blob_path(store, metadata).await?;
                finish(
                    response.header(HeaderName::from_static("x-sendfile"), path),
                    empty_body(),
                )
            }
        }
    }

    async fn open(
        &self,
        store: &dyn ResourceStore,
        metadata: &ResourceMetadata,
    ) -> Result<ByteSource, GatewayError> {
        store
            .open(&metadata.identifier)
            .await?
            .ok_or_else(|| GatewayError::ResourceNotFound(metadata.identifier.clone()))
    }

    /// Resolves the on-disk path for the proxy-redirect variants. A store
    /// that cannot resolve paths at all is a deployment error; a missing
    /// blob behind a resolvable store is an ordinary not-found.
    async fn resolve_blob_path(
        &self,
        store: &dyn ResourceStore,
        metadata: &ResourceMetadata,
    ) -> Result<HeaderValue, GatewayError> {
        if !store.resolves_filesystem_paths() {
            return Err(GatewayError::Misconfigured(
                "proxy-redirect delivery requires a store that resolves filesystem paths"
                    .to_string(),
            ));
        }

        let path = store
            .resolve_path(&metadata.identifier)
            .await?
            .ok_or_else(|| GatewayError::ResourceNotFound(metadata.identifier.clone()))?;

        path.to_str()
            .and_then(|path| HeaderValue::from_str(path).ok())
            .ok_or_else(|| {
                GatewayError::Misconfigured(format!(
                    "blob path {} cannot be carried in a header",
                    path.display()
                ))
            })
    }
}

async fn buffer(mut source: ByteSource, size_hint: u64) -> Result<Bytes, GatewayError> {
    let mut content = Vec::with_capacity(size_hint as usize);
    source
        .read_to_end(&mut content)
        .await
        .map_err(|error| StoreError::Backend(format!("{error}")))?;
    Ok(content.into())
}

fn finish(
    response: hyper::http::response::Builder,
    body: GateBody,
) -> Result<Response<GateBody>, GatewayError> {
    response
        .body(body)
        .map_err(|error| GatewayError::Misconfigured(format!("response build failed: {error}")))
}

/// A body carrying the given bytes.
pub fn full_body(content: impl Into<Bytes>) -> GateBody {
    Full::new(content.into())
        .map_err(|never| match never {})
        .boxed()
}

/// A body carrying no bytes.
pub fn empty_body() -> GateBody {
    Empty::new().map_err(|never| match never {}).boxed()
}

fn stream_body(source: ByteSource) -> GateBody {
    StreamBody::new(ReaderStream::new(source).map_ok(Frame::data)).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_selects_strategies_by_their_configured_names() {
        let options: DeliveryOptions =
            serde_json::from_str(r#"{"strategy":"x-accel-redirect"}"#).unwrap();
        assert_eq!(options.strategy, DeliveryStrategy::XAccelRedirect);

        let options: DeliveryOptions = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(options.strategy, DeliveryStrategy::DirectStream);

        for (name, strategy) in [
            ("buffered-read", DeliveryStrategy::BufferedRead),
            ("direct-stream", DeliveryStrategy::DirectStream),
            ("x-sendfile", DeliveryStrategy::XSendfile),
        ] {
            let parsed: DeliveryStrategy =
                serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(parsed, strategy);
        }
    }
}
