//! Per-server image source resolution.
//!
//! Given the image a caller wants to render and the server the session is
//! connected to, this crate decides whether the server's credentials may be
//! attached to the request and which disk cache partition and key the
//! renderer should use. It owns no I/O: the renderer fetches and caches,
//! the network client only lends its current headers.

pub mod cache_key;
pub mod client;
pub mod error;
pub mod headers;
pub mod memo;
pub mod origin;
pub mod resolver;

pub use cache_key::{
    CacheKeyDeriver, CachePathEncoding, UnknownCachePathEncoding,
    cache_path_for, placeholder_cache_key, primary_cache_key,
};
pub use client::{
    AuthenticatedClient, ClientRegistry, InMemoryClientRegistry, ServerClient,
};
pub use error::ClientLookupError;
pub use headers::{HeaderMerger, merge_headers};
pub use memo::MemoizedResolver;
pub use origin::{OriginMatcher, should_attach_auth};
pub use resolver::{Resolution, ResolverConfig, SourceResolver, resolve};

pub use vignette_model as model;
