//! Serve a local directory over WebDAV to browser clients.
//!
//! The WebDAV protocol (methods, locking, properties, XML) is handled by
//! `dav-server` with a directory-backed filesystem and an in-memory lock
//! table. This crate adds what a browser-hosted client needs on top:
//!
//! - permissive CORS headers on every response
//! - `OPTIONS` preflight requests answered directly with `200 OK`
//! - the serving directory created on startup if it is missing
//!
//! # Example
//!
//! ```ignore
//! use webdav_utils::{ServerConfig, WebDavServer};
//!
//! let server = WebDavServer::start(ServerConfig::new("./data")).await?;
//! println!("Serving on {}", server.url());
//! // ...
//! server.stop().await;
//! ```

mod cors;
mod error;
mod filesystem;
mod server;
mod service;

pub use cors::{CorsPolicy, ALLOW_HEADERS, ALLOW_METHODS, ANY_ORIGIN, EXPOSE_HEADERS};
pub use error::{WebDavError, WebDavResult};
pub use filesystem::{prepare_root, DEFAULT_ROOT};
pub use server::{ServerConfig, WebDavServer, DEFAULT_PORT};
pub use service::CorsDavService;
