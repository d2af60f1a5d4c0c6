//! Per-request handling: CORS preflight short-circuit, then WebDAV.

use crate::cors::CorsPolicy;
use crate::filesystem::{local_filesystem, lock_system};
use bytes::Buf;
use dav_server::body::Body;
use dav_server::DavHandler;
use http_body::Body as HttpBody;
use hyper::{Method, Request, Response};
use std::error::Error as StdError;
use std::path::Path;
use tracing::debug;

/// WebDAV handler for a local directory, wrapped with CORS headers.
#[derive(Clone)]
pub struct CorsDavService {
    dav: DavHandler,
    cors: CorsPolicy,
}

impl CorsDavService {
    /// Build a service serving `root`.
    ///
    /// `prefix` is the URL path the directory is mounted under; an empty
    /// prefix serves the directory at `/`.
    pub fn new(root: &Path, cors: CorsPolicy, prefix: &str) -> Self {
        let mut builder = DavHandler::builder()
            .filesystem(local_filesystem(root))
            .locksystem(lock_system());
        if !prefix.is_empty() {
            builder = builder.strip_prefix(prefix.to_string());
        }

        Self {
            dav: builder.build_handler(),
            cors,
        }
    }

    /// Handle one request.
    ///
    /// `OPTIONS` is answered here and never reaches the WebDAV handler; all
    /// other methods are passed through unchanged and the CORS headers are
    /// set on whatever response comes back.
    pub async fn handle<ReqBody, ReqData, ReqError>(&self, req: Request<ReqBody>) -> Response<Body>
    where
        ReqData: Buf + Send + 'static,
        ReqError: StdError + Send + Sync + 'static,
        ReqBody: HttpBody<Data = ReqData, Error = ReqError>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if method == Method::OPTIONS {
            debug!(method = %method, path = %path, "Answering preflight");
            return self.cors.preflight_response();
        }

        let mut resp = self.dav.handle(req).await;
        self.cors.apply(resp.headers_mut());

        debug!(method = %method, path = %path, status = %resp.status(), "Handled request");
        resp
    }
}
