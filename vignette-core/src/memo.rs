use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use vignette_model::{Headers, ImageRequest, ResolvedImage, ServerIdentity};

use crate::{client::ClientRegistry, resolver::SourceResolver};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoInputs {
    request: ImageRequest,
    server: ServerIdentity,
    auth_headers: Option<Headers>,
}

/// Keeps the last resolution and reuses it while the request, the server
/// and the client's headers stay the same. A server switch or a token
/// refresh forces a recompute.
pub struct MemoizedResolver<R: ClientRegistry + ?Sized = dyn ClientRegistry> {
    inner: SourceResolver<R>,
    last: Mutex<Option<(MemoInputs, ResolvedImage)>>,
    recomputations: AtomicU64,
}

impl<R: ClientRegistry + ?Sized> fmt::Debug for MemoizedResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedResolver")
            .field("inner", &self.inner)
            .field("recomputations", &self.recomputations())
            .finish()
    }
}

impl<R: ClientRegistry + ?Sized> MemoizedResolver<R> {
    pub fn new(inner: SourceResolver<R>) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
            recomputations: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &SourceResolver<R> {
        &self.inner
    }

    pub fn resolve(
        &self,
        request: &ImageRequest,
        server: &ServerIdentity,
    ) -> ResolvedImage {
        let auth_headers = self.inner.auth_headers(server);

        let mut last = self.last.lock();
        if let Some((inputs, resolved)) = last.as_ref()
            && inputs.request == *request
            && inputs.server == *server
            && inputs.auth_headers == auth_headers
        {
            return resolved.clone();
        }

        let resolved = self.inner.resolve_with_headers(
            request,
            server,
            auth_headers.as_ref(),
        );
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *last = Some((
            MemoInputs {
                request: request.clone(),
                server: server.clone(),
                auth_headers,
            },
            resolved.clone(),
        ));
        resolved
    }

    /// Number of resolutions actually computed (cache misses).
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        *self.last.lock() = None;
    }
}
