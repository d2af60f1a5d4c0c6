//! Cross-origin headers for browser clients.
//!
//! Browser-hosted editors talk to the server with `fetch`, so every response
//! carries the same fixed set of `Access-Control-*` headers and preflight
//! `OPTIONS` requests are answered directly without reaching the WebDAV
//! handler.

use crate::error::{WebDavError, WebDavResult};
use dav_server::body::Body;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
};
use hyper::{Response, StatusCode};

/// Methods a cross-origin client may use.
pub const ALLOW_METHODS: &str =
    "GET, POST, PUT, DELETE, OPTIONS, PROPFIND, PROPPATCH, MKCOL, COPY, MOVE, LOCK, UNLOCK";

/// Request headers a cross-origin client may send.
pub const ALLOW_HEADERS: &str =
    "Authorization, Content-Type, Depth, Destination, If, Lock-Token, Overwrite, Timeout";

/// Response headers exposed to cross-origin scripts.
pub const EXPOSE_HEADERS: &str = "DAV, ETag, Lock-Token";

/// Origin allowed when none is configured.
pub const ANY_ORIGIN: &str = "*";

/// The CORS headers attached to every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static(ANY_ORIGIN),
            allow_methods: HeaderValue::from_static(ALLOW_METHODS),
            allow_headers: HeaderValue::from_static(ALLOW_HEADERS),
            expose_headers: HeaderValue::from_static(EXPOSE_HEADERS),
        }
    }
}

impl CorsPolicy {
    /// Restrict `Access-Control-Allow-Origin` to a single origin.
    ///
    /// Fails if `origin` is not a valid header value.
    pub fn with_allow_origin(mut self, origin: &str) -> WebDavResult<Self> {
        self.allow_origin = HeaderValue::from_str(origin)
            .map_err(|_| WebDavError::InvalidHeader(format!("allow origin {origin:?}")))?;
        Ok(self)
    }

    /// The configured allowed origin.
    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    /// Set the CORS headers on `headers`, replacing any existing values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, self.expose_headers.clone());
    }

    /// Answer a preflight request: `200 OK`, no body.
    pub fn preflight_response(&self) -> Response<Body> {
        let mut resp = Response::new(Body::empty());
        *resp.status_mut() = StatusCode::OK;
        self.apply(resp.headers_mut());
        resp
    }
}
