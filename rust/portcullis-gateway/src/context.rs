use hyper::{Method, Request, Uri};

/// The facts about the inbound request that outlive the request object
/// itself: handed to event sinks alongside served/denied notifications.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// The request method.
    pub method: Method,

    /// The full request URI, including the token parameter.
    pub uri: Uri,
}

impl RequestContext {
    /// Captures the context of `request`.
    pub fn of<Body>(request: &Request<Body>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
        }
    }
}
