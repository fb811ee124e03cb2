use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vignette_core::ResolverConfig;
use vignette_model::ServerIdentity;

use crate::util::{non_empty_var, parse_csv_var};

pub const ENV_CONFIG_PATH: &str = "VIGNETTE_CONFIG";
pub const ENV_SERVER_URL: &str = "VIGNETTE_SERVER_URL";
pub const ENV_AUTH_PATH_PREFIX: &str = "VIGNETTE_AUTH_PATH_PREFIX";
pub const ENV_PLACEHOLDER_MARKER: &str = "VIGNETTE_PLACEHOLDER_MARKER";
pub const ENV_CACHE_PATH_ENCODING: &str = "VIGNETTE_CACHE_PATH_ENCODING";
pub const ENV_STRIP_HEADERS: &str = "VIGNETTE_STRIP_HEADERS";

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub images: FileImageConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_path_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_headers: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
    pub auth_path_prefix: Option<String>,
    pub placeholder_marker: Option<String>,
    pub cache_path_encoding: Option<String>,
    pub strip_headers: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var(ENV_CONFIG_PATH).map(PathBuf::from),
            server_url: non_empty_var(ENV_SERVER_URL),
            auth_path_prefix: non_empty_var(ENV_AUTH_PATH_PREFIX),
            placeholder_marker: non_empty_var(ENV_PLACEHOLDER_MARKER),
            cache_path_encoding: non_empty_var(ENV_CACHE_PATH_ENCODING),
            strip_headers: parse_csv_var(ENV_STRIP_HEADERS),
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

/// Validated configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Active server, when one is configured up front.
    pub server_url: Option<ServerIdentity>,
    pub resolver: ResolverConfig,
    pub metadata: ConfigMetadata,
}
