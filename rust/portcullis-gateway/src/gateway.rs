use std::sync::Arc;

use bytes::Bytes;
use hyper::{Request, Response, header};
use portcullis_common::{AuthorizationContext, Clock};
use portcullis_store::ResourceStore;
use portcullis_token::TOKEN_QUERY_PARAM;

use crate::{
    DeliveryOptions, DeliveryStrategy, Denial, EventSink, GateBody, GatewayError, RequestContext,
    TokenVerifier, TracingSink, full_body,
};

/// The orchestrating entry point of the protected-resource pipeline.
///
/// A [Gateway] inspects each request for the token query parameter. Absent
/// (or empty), the request is handed to `next` untouched - the gateway is
/// invisible to ordinary traffic. Present, the gateway owns the request:
/// it verifies the token, resolves the resource, dispatches the configured
/// delivery strategy, and translates failures into terminal responses
/// without ever calling `next`.
pub struct Gateway<Store, C> {
    verifier: TokenVerifier<C>,
    store: Store,
    strategy: DeliveryStrategy,
    events: Arc<dyn EventSink>,
}

impl<Store, C> Gateway<Store, C>
where
    Store: ResourceStore,
    C: Clock,
{
    /// Creates a gateway serving resources from `store` under the delivery
    /// configuration in `options`, notifying a [TracingSink].
    pub fn new(verifier: TokenVerifier<C>, store: Store, options: DeliveryOptions) -> Self {
        Self {
            verifier,
            store,
            strategy: options.strategy,
            events: Arc::new(TracingSink),
        }
    }

    /// Replaces the event sink notified of served and denied requests.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Handles one request, either passing it through to `next` or serving
    /// (or terminally refusing) the protected resource it names.
    ///
    /// `auth` is the authorization context of this request's caller,
    /// derived by the host application from its own session machinery.
    pub async fn handle<Body, Next, Fut>(
        &self,
        request: Request<Body>,
        auth: &dyn AuthorizationContext,
        next: Next,
    ) -> Response<GateBody>
    where
        Next: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response<GateBody>>,
    {
        let Some(signed) = token_parameter(&request) else {
            return next(request).await;
        };

        let context = RequestContext::of(&request);
        match self.serve(&signed, auth, &context).await {
            Ok(response) => response,
            Err(error) => error_response(&error),
        }
    }

    async fn serve(
        &self,
        signed: &str,
        auth: &dyn AuthorizationContext,
        context: &RequestContext,
    ) -> Result<Response<GateBody>, GatewayError> {
        let token = match self.verifier.verify(signed, auth) {
            Ok(token) => token,
            Err(Denial { token, reason }) => {
                self.events.access_denied(token.as_ref(), context, &reason);
                return Err(GatewayError::AccessDenied(reason));
            }
        };

        let metadata = self
            .store
            .lookup(&token.resource_identifier)
            .await?
            .ok_or_else(|| GatewayError::ResourceNotFound(token.resource_identifier.clone()))?;

        let response = Response::builder()
            .header(header::CONTENT_TYPE, metadata.media_type.as_str())
            .header(
                header::CONTENT_DISPOSITION,
                content_disposition(&metadata.filename),
            )
            .header(header::CONTENT_LENGTH, metadata.byte_length);

        self.events.resource_served(&metadata, context);
        self.strategy.serve(&self.store, &metadata, response).await
    }
}

/// Extracts the signed token parameter; `None` (absent or empty) selects
/// the pass-through path.
fn token_parameter<Body>(request: &Request<Body>) -> Option<String> {
    let query = request.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn error_response(error: &GatewayError) -> Response<GateBody> {
    Response::builder()
        .status(error.status())
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full_body(Bytes::from_static(
            error.public_message().as_bytes(),
        )))
        .expect("static error responses are well-formed")
}

/// Renders the attachment disposition, dropping characters that would
/// break out of the quoted filename.
fn content_disposition(filename: &str) -> String {
    let filename: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    format!("attachment; filename=\"{filename}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn it_extracts_only_a_non_empty_token_parameter() {
        assert_eq!(token_parameter(&request("/download")), None);
        assert_eq!(
            token_parameter(&request("/download?__protectedResource=")),
            None
        );
        assert_eq!(
            token_parameter(&request("/download?other=value")),
            None
        );
        assert_eq!(
            token_parameter(&request("/download?__protectedResource=abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(
            token_parameter(&request("/download?a=b&__protectedResource=abc%2Edef")),
            Some("abc.def".to_string())
        );
    }

    #[test]
    fn it_quotes_and_sanitizes_the_attachment_filename() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition("na\"me\n.txt"),
            "attachment; filename=\"name.txt\""
        );
    }
}
