//! Configuration file support.
//!
//! Configuration is read from `~/.config/webdav-utils/config.toml` (XDG
//! standard) or the platform equivalent, unless `--config` or
//! `WEBDAV_UTILS_CONFIG` names another file. Every setting can also be given
//! on the command line, which takes precedence.
//!
//! A relative `dir` in the file is taken relative to the file's own
//! directory; a relative `--dir` on the command line is taken relative to
//! the working directory.
//!
//! # Example configuration
//!
//! ```toml
//! [server]
//! dir = "/srv/projects"
//! port = 8011
//! bind = "127.0.0.1"
//! prefix = "/"
//!
//! [cors]
//! allow_origin = "https://editor.example.com"
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use webdav_utils::{CorsPolicy, ServerConfig};

/// Main configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Listener and serving directory
    #[serde(default)]
    pub server: ServerSection,

    /// Cross-origin settings
    #[serde(default)]
    pub cors: CorsSection,

    /// Directory of the file this was loaded from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// `[server]` table
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    /// Directory to serve
    pub dir: Option<PathBuf>,

    /// Port to listen on (0 = auto-assign)
    pub port: Option<u16>,

    /// Address to bind
    pub bind: Option<IpAddr>,

    /// URL prefix the directory is served under
    pub prefix: Option<String>,
}

/// `[cors]` table
#[derive(Debug, Default, Deserialize)]
pub struct CorsSection {
    /// Value of `Access-Control-Allow-Origin`
    pub allow_origin: Option<String>,
}

/// Settings given on the command line. `None` falls back to the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
    pub prefix: Option<String>,
    pub allow_origin: Option<String>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields the empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Combine command-line overrides, this file and the built-in defaults.
    pub fn resolve(&self, overrides: &Overrides) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        if let Some(dir) = overrides.dir.clone().or_else(|| self.file_dir()) {
            config.root = dir;
        }
        if let Some(port) = overrides.port.or(self.server.port) {
            config = config.with_port(port);
        }
        if let Some(bind) = overrides.bind.or(self.server.bind) {
            config = config.with_bind_address(bind);
        }
        if let Some(prefix) = overrides.prefix.as_deref().or(self.server.prefix.as_deref()) {
            config = config.with_prefix(prefix);
        }
        if let Some(origin) = overrides
            .allow_origin
            .as_deref()
            .or(self.cors.allow_origin.as_deref())
        {
            let cors = CorsPolicy::default()
                .with_allow_origin(origin)
                .context("Invalid allow-origin setting")?;
            config = config.with_cors(cors);
        }

        Ok(config)
    }

    /// `[server] dir`, anchored at the config file's directory if relative.
    fn file_dir(&self) -> Option<PathBuf> {
        let dir = self.server.dir.as_ref()?;
        match &self.base_dir {
            Some(base) if dir.is_relative() => Some(base.join(dir)),
            _ => Some(dir.clone()),
        }
    }
}

/// Get the default path of the configuration file.
///
/// `None` when no home directory can be determined.
pub fn config_path() -> Option<PathBuf> {
    let base_dirs = directories::BaseDirs::new()?;
    Some(base_dirs.config_dir().join("webdav-utils").join("config.toml"))
}
