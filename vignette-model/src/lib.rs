//! Core data model definitions shared across Vignette crates.
#![allow(missing_docs)]

pub mod cache;
pub mod descriptor;
pub mod headers;
pub mod request;
pub mod server;
pub mod source;

// Intentionally curated re-exports for downstream consumers.
pub use cache::{CacheKey, CachePath, CachePolicy, ImageId};
pub use descriptor::{RequestDescriptor, ResolvedImage, ResolvedSource};
pub use headers::Headers;
pub use request::ImageRequest;
pub use server::ServerIdentity;
pub use source::{AssetHandle, ImageSource, RemoteSource};
