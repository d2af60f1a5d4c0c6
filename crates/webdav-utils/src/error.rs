//! Error types for the WebDAV server.
//!
//! Protocol-level failures (missing resources, lock conflicts, malformed
//! requests) never surface here: `dav-server` turns those into HTTP
//! responses. This module only covers what can go wrong while setting the
//! server up.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or starting the server.
#[derive(Debug, Error)]
pub enum WebDavError {
    /// The serving directory could not be created.
    #[error("Failed to create serving directory {}: {source}", .path.display())]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The serving path exists but is not a directory.
    #[error("Serving path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// A CORS header value is not valid HTTP.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl WebDavError {
    /// Whether this error happened before the server could accept requests.
    ///
    /// The CLI maps these to a dedicated exit code.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            WebDavError::CreateRoot { .. } | WebDavError::NotADirectory(_) | WebDavError::Bind { .. }
        )
    }
}

/// Result type for WebDAV server operations.
pub type WebDavResult<T> = Result<T, WebDavError>;
