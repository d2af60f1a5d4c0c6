//! The directory tree served over WebDAV.
//!
//! Storage and locking are provided by `dav-server`: [`LocalFs`] maps request
//! paths onto the serving directory and [`MemLs`] keeps the lock table in
//! memory for the lifetime of the server.

use crate::error::{WebDavError, WebDavResult};
use dav_server::localfs::LocalFs;
use dav_server::memls::MemLs;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default serving directory, relative to the working directory.
pub const DEFAULT_ROOT: &str = "./data";

/// Permissions for a freshly created serving directory.
#[cfg(unix)]
const ROOT_MODE: u32 = 0o755;

/// Make sure the serving directory exists and return its canonical path.
///
/// Missing parents are created too. An existing directory is left untouched;
/// an existing non-directory is an error.
pub fn prepare_root(path: &Path) -> WebDavResult<PathBuf> {
    if path.exists() {
        if !path.is_dir() {
            return Err(WebDavError::NotADirectory(path.to_path_buf()));
        }
        debug!(path = %path.display(), "Serving directory already exists");
    } else {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(ROOT_MODE);
        }
        builder.create(path).map_err(|source| WebDavError::CreateRoot {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Created serving directory");
    }

    canonical_root(path)
}

/// Resolve the serving directory to an absolute path.
fn canonical_root(path: &Path) -> WebDavResult<PathBuf> {
    path.canonicalize().map_err(|source| WebDavError::CreateRoot {
        path: path.to_path_buf(),
        source,
    })
}

/// Directory-backed filesystem rooted at `root`.
///
/// Paths are case-sensitive and never served as a public listing.
pub(crate) fn local_filesystem(root: &Path) -> Box<LocalFs> {
    LocalFs::new(root, false, false, false)
}

/// Fresh in-memory lock table.
pub(crate) fn lock_system() -> Box<MemLs> {
    MemLs::new()
}
