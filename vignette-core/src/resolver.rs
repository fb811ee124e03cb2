//! Turns declared image sources into request descriptors for the renderer.
//!
//! Resolution is a pure function of the request, the active server and the
//! server client's current headers. Failures never surface: an unknown
//! client means unauthenticated loading and a missing id means unkeyed
//! caching.

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, trace};
use vignette_model::{
    CachePolicy, Headers, ImageRequest, ImageSource, RequestDescriptor,
    ResolvedImage, ResolvedSource, ServerIdentity,
};

use crate::{
    cache_key::{CacheKeyDeriver, CachePathEncoding, DEFAULT_PLACEHOLDER_MARKER},
    client::ClientRegistry,
    headers::HeaderMerger,
    origin::{DEFAULT_AUTH_PATH_PREFIX, OriginMatcher},
};

/// Tunables for [`SourceResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub auth_path_prefix: String,
    pub placeholder_marker: String,
    pub cache_path_encoding: CachePathEncoding,
    /// Header names removed in addition to `Accept`.
    pub stripped_headers: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auth_path_prefix: DEFAULT_AUTH_PATH_PREFIX.to_string(),
            placeholder_marker: DEFAULT_PLACEHOLDER_MARKER.to_string(),
            cache_path_encoding: CachePathEncoding::default(),
            stripped_headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Primary,
    Placeholder,
}

/// The pure part of resolution: no registry, headers are passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    matcher: OriginMatcher,
    merger: HeaderMerger,
    deriver: CacheKeyDeriver,
}

impl Resolution {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            matcher: OriginMatcher::new(&config.auth_path_prefix),
            merger: HeaderMerger::with_stripped(
                config.stripped_headers.iter().cloned(),
            ),
            deriver: CacheKeyDeriver::new(
                config.cache_path_encoding,
                config.placeholder_marker.clone(),
            ),
        }
    }

    pub fn matcher(&self) -> &OriginMatcher {
        &self.matcher
    }

    pub fn deriver(&self) -> &CacheKeyDeriver {
        &self.deriver
    }

    /// Resolve source and placeholder independently. Each URI is checked
    /// against the server on its own, so a placeholder on another origin
    /// never inherits credentials meant for the primary image.
    pub fn resolve(
        &self,
        request: &ImageRequest,
        server: &ServerIdentity,
        auth_headers: Option<&Headers>,
    ) -> ResolvedImage {
        let source = self.resolve_one(
            &request.source,
            &request.cache,
            server,
            auth_headers,
            Variant::Primary,
        );
        let placeholder = request.placeholder.as_ref().map(|placeholder| {
            self.resolve_one(
                placeholder,
                &request.cache,
                server,
                auth_headers,
                Variant::Placeholder,
            )
        });

        ResolvedImage {
            source,
            placeholder,
        }
    }

    fn resolve_one(
        &self,
        raw: &ImageSource,
        cache: &CachePolicy,
        server: &ServerIdentity,
        auth_headers: Option<&Headers>,
        variant: Variant,
    ) -> ResolvedSource {
        let remote = match raw {
            ImageSource::Bundled(handle) => {
                return ResolvedSource::Bundled(*handle);
            }
            ImageSource::Remote(remote) => remote,
        };

        let attach_auth =
            self.matcher.should_attach_auth(Some(remote.uri.as_str()), server);
        let headers =
            self.merger
                .merge(auth_headers, remote.headers.as_ref(), attach_auth);

        let (cache_key, cache_path) = match cache {
            CachePolicy::PersistentNamed { id } => {
                let key = match variant {
                    Variant::Primary => self.deriver.primary_cache_key(id),
                    Variant::Placeholder => {
                        self.deriver.placeholder_cache_key(id)
                    }
                };
                (Some(key), Some(self.deriver.cache_path_for(server)))
            }
            CachePolicy::MemoryOnly { id } => {
                if id.is_some() {
                    trace!(?variant, "memory-only policy; ignoring image id for caching");
                }
                (None, None)
            }
        };

        ResolvedSource::Remote(RequestDescriptor {
            uri: remote.uri.clone(),
            headers,
            cache_key,
            cache_path,
        })
    }
}

/// [`Resolution::resolve`] with the default configuration.
pub fn resolve(
    request: &ImageRequest,
    server: &ServerIdentity,
    auth_headers: Option<&Headers>,
) -> ResolvedImage {
    Resolution::default().resolve(request, server, auth_headers)
}

/// Resolver that looks up the server's auth headers in a registry.
pub struct SourceResolver<R: ClientRegistry + ?Sized = dyn ClientRegistry> {
    registry: Arc<R>,
    resolution: Resolution,
}

impl<R: ClientRegistry + ?Sized> fmt::Debug for SourceResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceResolver")
            .field("registry", &"<ClientRegistry>")
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl<R: ClientRegistry + ?Sized> Clone for SourceResolver<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            resolution: self.resolution.clone(),
        }
    }
}

impl<R: ClientRegistry + ?Sized> SourceResolver<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self::with_config(registry, &ResolverConfig::default())
    }

    pub fn with_config(registry: Arc<R>, config: &ResolverConfig) -> Self {
        Self {
            registry,
            resolution: Resolution::new(config),
        }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Headers the server's client would send with a GET, or `None` when
    /// no client is available for `server`.
    pub fn auth_headers(&self, server: &ServerIdentity) -> Option<Headers> {
        match self.registry.client_for(server) {
            Ok(client) => Some(client.request_headers(&Method::GET)),
            Err(err) => {
                debug!(%server, error = %err, "no client headers; loading unauthenticated");
                None
            }
        }
    }

    pub fn resolve(
        &self,
        request: &ImageRequest,
        server: &ServerIdentity,
    ) -> ResolvedImage {
        let auth_headers = self.auth_headers(server);
        self.resolution
            .resolve(request, server, auth_headers.as_ref())
    }

    pub fn resolve_with_headers(
        &self,
        request: &ImageRequest,
        server: &ServerIdentity,
        auth_headers: Option<&Headers>,
    ) -> ResolvedImage {
        self.resolution.resolve(request, server, auth_headers)
    }
}
