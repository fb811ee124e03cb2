use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vignette_core::{CachePathEncoding, ResolverConfig};

use crate::{
    Config, ConfigLoadError, ConfigMetadata,
    models::{EnvConfig, FileConfig},
    validation::{
        ConfigWarning, validate_auth_path_prefix, validate_placeholder_marker,
        validate_server_url, validate_strip_headers,
    },
};

/// Effective configuration plus the warnings produced while building it.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Composes defaults, an optional TOML file and the environment, in that
/// order of precedence.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Load `.env` (if any) into the process environment, then compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.env_file {
            Some(path) => {
                dotenvy::from_path(path)?;
                true
            }
            None => dotenvy::dotenv().is_ok(),
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose from an explicit environment snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let config_path = self.config_path.clone().or(env.config_path.clone());
        let file = match config_path.as_deref() {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let mut warnings = Vec::new();
        let mut resolver = ResolverConfig::default();

        let server_url = env
            .server_url
            .as_deref()
            .or(file.server.url.as_deref())
            .map(validate_server_url)
            .transpose()?;
        if let Some(server) = &server_url {
            debug!(%server, "active server configured");
        }

        if let Some(prefix) = env
            .auth_path_prefix
            .as_deref()
            .or(file.images.auth_path_prefix.as_deref())
        {
            resolver.auth_path_prefix =
                validate_auth_path_prefix(prefix, &mut warnings)?;
        }

        if let Some(marker) = env
            .placeholder_marker
            .as_deref()
            .or(file.images.placeholder_marker.as_deref())
        {
            resolver.placeholder_marker = validate_placeholder_marker(marker)?;
        }

        if let Some(encoding) = env
            .cache_path_encoding
            .as_deref()
            .or(file.images.cache_path_encoding.as_deref())
        {
            resolver.cache_path_encoding =
                encoding.parse::<CachePathEncoding>()?;
        }

        if let Some(names) = env.strip_headers.or(file.images.strip_headers) {
            resolver.stripped_headers =
                validate_strip_headers(names, &mut warnings);
        }

        for warning in &warnings {
            warn!("{warning}");
        }

        Ok(ConfigLoad {
            config: Config {
                server_url,
                resolver,
                metadata: ConfigMetadata {
                    config_path,
                    env_file_loaded: false,
                },
            },
            warnings,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        ConfigLoadError::ConfigFileIo {
            path: path.to_path_buf(),
            source,
        }
    })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::ConfigFileParse {
        path: path.to_path_buf(),
        source,
    })
}
