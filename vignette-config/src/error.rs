use std::path::PathBuf;

use thiserror::Error;
use vignette_core::UnknownCachePathEncoding;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}")]
    ConfigFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid server URL '{value}'")]
    InvalidServerUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server URL '{value}' must use http or https")]
    UnsupportedServerScheme { value: String },
    #[error(
        "invalid auth path prefix '{value}': must start with '/' and contain no query or fragment"
    )]
    InvalidAuthPathPrefix { value: String },
    #[error(
        "invalid placeholder marker '{value}': use ASCII letters, digits, '-' or '_'"
    )]
    InvalidPlaceholderMarker { value: String },
    #[error(transparent)]
    CachePathEncoding(#[from] UnknownCachePathEncoding),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
