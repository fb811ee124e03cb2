//! Configuration for Vignette image source resolution.
//!
//! Settings are composed from built-in defaults, an optional TOML file and
//! `VIGNETTE_*` environment variables (optionally seeded from a `.env`
//! file), then validated into a [`vignette_core::ResolverConfig`].

pub mod error;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoad, ConfigLoader};
pub use models::{
    Config, ConfigMetadata, EnvConfig, FileConfig, FileImageConfig,
    FileServerConfig,
};
pub use validation::ConfigWarning;
