//! Gallery configuration.
//!
//! Defaults, optionally overlaid by a YAML file, then by environment
//! variables. The binaries apply CLI flags last.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GalleryError, Result};

/// Environment variable naming the CrossWOZ data directory.
pub const ENV_DATA_DIR: &str = "CROSSWOZ_DATA_DIR";
/// Environment variable naming the server bind address.
pub const ENV_BIND: &str = "GALLERY_BIND";
/// Environment variable overriding the sidebar title.
pub const ENV_TITLE: &str = "GALLERY_TITLE";

/// Runtime configuration for the gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Directory holding `{train,val,test}.json` and `database/`.
    pub data_dir: PathBuf,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Sidebar title shown on every page.
    pub page_title: String,

    /// Read every dataset file once at startup instead of lazily.
    pub preload: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/crosswoz"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            page_title: "CrossWOZ Dataset Viewer".to_string(),
            preload: false,
        }
    }
}

/// Partial configuration as written in a YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    bind_addr: Option<String>,
    page_title: Option<String>,
    preload: Option<bool>,
}

impl GalleryConfig {
    /// Load configuration: defaults, then `path` if given, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            config = config.merge_yaml_file(path)?;
        }
        config.merge_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from a YAML file.
    pub fn merge_yaml_file(self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GalleryError::io(path, e))?;
        self.merge_yaml(&text)
    }

    /// Overlay values from YAML text.
    pub fn merge_yaml(mut self, text: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        if let Some(data_dir) = file.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(bind) = file.bind_addr {
            self.bind_addr = parse_addr(&bind)?;
        }
        if let Some(title) = file.page_title {
            self.page_title = title;
        }
        if let Some(preload) = file.preload {
            self.preload = preload;
        }
        Ok(self)
    }

    /// Overlay values from the environment, read through `lookup`.
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_addr = parse_addr(&bind)?;
        }
        if let Some(title) = lookup(ENV_TITLE) {
            self.page_title = title;
        }
        Ok(self)
    }

    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the bind address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Enable or disable eager loading.
    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }
}

fn parse_addr(value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|e| GalleryError::Config(format!("invalid bind address '{}': {}", value, e)))
}
