//! Test server harness for WebDAV integration tests.
//!
//! Provides a `TestServer` that runs a WebDAV server on a temporary
//! directory, along with HTTP convenience methods.

use bytes::Bytes;
use reqwest::{Client, Method, Response, StatusCode};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use webdav_utils::{ServerConfig, WebDavServer};

/// Minimal exclusive write lock request body.
pub const EXCLUSIVE_LOCKINFO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:lockinfo xmlns:D="DAV:">
  <D:lockscope><D:exclusive/></D:lockscope>
  <D:locktype><D:write/></D:locktype>
  <D:owner><D:href>integration-test</D:href></D:owner>
</D:lockinfo>"#;

/// Test server with HTTP client and automatic cleanup.
pub struct TestServer {
    /// The running WebDAV server.
    server: WebDavServer,
    /// HTTP client for making requests.
    client: Client,
    /// Base URL for the server, including any prefix.
    pub base_url: String,
    /// Served directory.
    pub root: PathBuf,
    /// Temporary directory (cleaned up on drop).
    _temp_dir: TempDir,
}

impl TestServer {
    /// Start a server on a fresh temporary directory.
    ///
    /// The served directory itself does not exist until the server starts.
    pub async fn with_temp_dir() -> Self {
        Self::with_config(|config| config).await
    }

    /// Start a server serving under a URL prefix.
    pub async fn with_prefix(prefix: &str) -> Self {
        Self::with_config(|config| config.with_prefix(prefix)).await
    }

    /// Start a server after adjusting the default test configuration.
    pub async fn with_config(adjust: impl FnOnce(ServerConfig) -> ServerConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("data");

        let config = ServerConfig::new(&root)
            .with_bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(0);
        let server = WebDavServer::start(adjust(config))
            .await
            .expect("Failed to start WebDAV server");

        let base_url = server.url();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let test_server = Self {
            server,
            client,
            base_url,
            root,
            _temp_dir: temp_dir,
        };

        test_server.wait_ready().await;

        test_server
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_ready(&self) {
        for _ in 0..50 {
            if let Ok(resp) = self.client.request(Method::OPTIONS, self.url("/")).send().await {
                if resp.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready in time");
    }

    /// Build a full URL from a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path on disk backing a request path.
    pub fn disk_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Served directory on disk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== HTTP Convenience Methods ==========

    /// Send an arbitrary method with no body.
    pub async fn request(&self, method: &str, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(method.as_bytes()).unwrap(), self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("{method} request failed: {e}"))
    }

    /// OPTIONS (CORS preflight).
    pub async fn options(&self, path: &str) -> Response {
        self.client
            .request(Method::OPTIONS, self.url(path))
            .header("Origin", "https://editor.example.com")
            .header("Access-Control-Request-Method", "PROPFIND")
            .send()
            .await
            .expect("OPTIONS request failed")
    }

    /// GET a file's contents.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET a file's contents as bytes.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, (StatusCode, String)> {
        let resp = self.get(path).await;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await.expect("Failed to read response bytes"))
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err((status, body))
        }
    }

    /// PUT file contents.
    pub async fn put(&self, path: &str, body: impl Into<reqwest::Body>) -> Response {
        self.client
            .put(self.url(path))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// PUT file contents and assert success.
    pub async fn put_ok(&self, path: &str, body: impl Into<reqwest::Body>) {
        let resp = self.put(path, body).await;
        let status = resp.status();
        assert!(
            status.is_success(),
            "PUT {} failed with status {}: {}",
            path,
            status,
            resp.text().await.unwrap_or_default()
        );
    }

    /// DELETE a file or directory.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    /// MKCOL (create directory).
    pub async fn mkcol(&self, path: &str) -> Response {
        self.request("MKCOL", path).await
    }

    /// PROPFIND (list directory or get properties).
    pub async fn propfind(&self, path: &str, depth: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"PROPFIND").unwrap(), self.url(path))
            .header("Depth", depth)
            .send()
            .await
            .expect("PROPFIND request failed")
    }

    /// PROPFIND and return body as string.
    pub async fn propfind_body(&self, path: &str, depth: &str) -> (StatusCode, String) {
        let resp = self.propfind(path, depth).await;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        (status, body)
    }

    /// COPY a file or directory.
    pub async fn copy(&self, from: &str, to: &str, overwrite: bool) -> Response {
        self.client
            .request(Method::from_bytes(b"COPY").unwrap(), self.url(from))
            .header("Destination", self.url(to))
            .header("Overwrite", if overwrite { "T" } else { "F" })
            .send()
            .await
            .expect("COPY request failed")
    }

    /// MOVE a file or directory.
    pub async fn move_(&self, from: &str, to: &str, overwrite: bool) -> Response {
        self.client
            .request(Method::from_bytes(b"MOVE").unwrap(), self.url(from))
            .header("Destination", self.url(to))
            .header("Overwrite", if overwrite { "T" } else { "F" })
            .send()
            .await
            .expect("MOVE request failed")
    }

    /// LOCK a resource exclusively.
    pub async fn lock(&self, path: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"LOCK").unwrap(), self.url(path))
            .header("Content-Type", "application/xml; charset=utf-8")
            .header("Timeout", "Second-60")
            .body(EXCLUSIVE_LOCKINFO)
            .send()
            .await
            .expect("LOCK request failed")
    }

    /// UNLOCK a resource with the given token (as returned in `Lock-Token`).
    pub async fn unlock(&self, path: &str, token: &str) -> Response {
        self.client
            .request(Method::from_bytes(b"UNLOCK").unwrap(), self.url(path))
            .header("Lock-Token", token)
            .send()
            .await
            .expect("UNLOCK request failed")
    }

    /// PUT with an `If` header carrying a lock token.
    pub async fn put_with_token(
        &self,
        path: &str,
        token: &str,
        body: impl Into<reqwest::Body>,
    ) -> Response {
        self.client
            .put(self.url(path))
            .header("If", format!("({token})"))
            .body(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    /// Stop the server explicitly (otherwise happens on drop).
    pub async fn stop(self) {
        self.server.stop().await;
    }
}
