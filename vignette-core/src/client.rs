//! Authenticated network clients, keyed by server identity.
//!
//! The resolver only asks a client for the static headers it already
//! holds; nothing in here performs a request.

use std::fmt::{self, Debug};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use reqwest::Method;
use tracing::debug;
use vignette_model::{Headers, ServerIdentity};
use zeroize::Zeroizing;

use crate::error::{ClientLookupError, Result};

/// A client holding the credentials for one server.
pub trait AuthenticatedClient: Send + Sync + Debug {
    /// Headers the client would send with a request of `method`.
    fn request_headers(&self, method: &Method) -> Headers;
}

/// Lookup of the authenticated client for a server.
pub trait ClientRegistry: Send + Sync {
    fn client_for(
        &self,
        server: &ServerIdentity,
    ) -> Result<Arc<dyn AuthenticatedClient>>;
}

impl<R: ClientRegistry + ?Sized> ClientRegistry for Arc<R> {
    fn client_for(
        &self,
        server: &ServerIdentity,
    ) -> Result<Arc<dyn AuthenticatedClient>> {
        (**self).client_for(server)
    }
}

/// Registry backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    clients: DashMap<ServerIdentity, Arc<dyn AuthenticatedClient>>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for `server`, returning the client it replaced.
    pub fn register(
        &self,
        server: ServerIdentity,
        client: Arc<dyn AuthenticatedClient>,
    ) -> Option<Arc<dyn AuthenticatedClient>> {
        debug!(%server, "registering authenticated client");
        self.clients.insert(server, client)
    }

    pub fn remove(
        &self,
        server: &ServerIdentity,
    ) -> Option<Arc<dyn AuthenticatedClient>> {
        self.clients.remove(server).map(|(_, client)| client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ClientRegistry for InMemoryClientRegistry {
    fn client_for(
        &self,
        server: &ServerIdentity,
    ) -> Result<Arc<dyn AuthenticatedClient>> {
        self.clients
            .get(server)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ClientLookupError::NotRegistered {
                server: server.clone(),
            })
    }
}

/// Client state for one server: bearer token, CSRF token and any extra
/// headers the app sends with every request.
pub struct ServerClient {
    server: ServerIdentity,
    token: RwLock<Option<Zeroizing<String>>>,
    csrf_token: RwLock<Option<Zeroizing<String>>>,
    extra_headers: Headers,
}

impl Debug for ServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerClient")
            .field("server", &self.server)
            .field("has_token", &self.token.read().is_some())
            .field("has_csrf_token", &self.csrf_token.read().is_some())
            .field("extra_headers", &self.extra_headers.len())
            .finish()
    }
}

impl ServerClient {
    pub fn new(server: ServerIdentity) -> Self {
        Self {
            server,
            token: RwLock::new(None),
            csrf_token: RwLock::new(None),
            extra_headers: Headers::new(),
        }
    }

    pub fn with_extra_headers(mut self, headers: Headers) -> Self {
        self.extra_headers = headers;
        self
    }

    pub fn server(&self) -> &ServerIdentity {
        &self.server
    }

    /// Replace the bearer token; the previous one is zeroized.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token.map(Zeroizing::new);
    }

    pub fn set_csrf_token(&self, token: Option<String>) {
        *self.csrf_token.write() = token.map(Zeroizing::new);
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }
}

impl AuthenticatedClient for ServerClient {
    fn request_headers(&self, method: &Method) -> Headers {
        let mut headers = Headers::from([
            ("Accept", "application/json"),
            ("X-Requested-With", "XMLHttpRequest"),
        ]);

        if let Some(token) = self.token.read().as_ref() {
            headers.insert("Authorization", format!("Bearer {}", token.as_str()));
        }

        if *method != Method::GET
            && *method != Method::HEAD
            && let Some(csrf) = self.csrf_token.read().as_ref()
        {
            headers.insert("X-CSRF-Token", csrf.as_str());
        }

        headers.extend_from(&self.extra_headers);
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AuthenticatedClient, ClientRegistry, InMemoryClientRegistry,
        ServerClient,
    };
    use crate::error::ClientLookupError;
    use reqwest::Method;
    use std::sync::Arc;
    use vignette_model::{Headers, ServerIdentity};

    fn chat() -> ServerIdentity {
        ServerIdentity::new("https://chat.example.com")
    }

    #[test]
    fn client_headers_carry_bearer_token() {
        let client = ServerClient::new(chat());
        client.set_token(Some("T".into()));

        let headers = client.request_headers(&Method::GET);
        assert_eq!(headers.get("Authorization"), Some("Bearer T"));
        assert_eq!(headers.get("Accept"), Some("application/json"));
        assert!(!headers.contains("X-CSRF-Token"));
    }

    #[test]
    fn client_without_token_sends_no_authorization() {
        let client = ServerClient::new(chat());
        assert!(!client.has_token());
        assert!(!client.request_headers(&Method::GET).contains("Authorization"));
    }

    #[test]
    fn csrf_token_only_for_mutating_methods() {
        let client = ServerClient::new(chat());
        client.set_csrf_token(Some("csrf".into()));

        assert!(!client.request_headers(&Method::GET).contains("X-CSRF-Token"));
        assert_eq!(
            client.request_headers(&Method::POST).get("X-CSRF-Token"),
            Some("csrf")
        );
    }

    #[test]
    fn extra_headers_override_defaults() {
        let client = ServerClient::new(chat())
            .with_extra_headers(Headers::from([("X-Requested-With", "vignette")]));
        assert_eq!(
            client.request_headers(&Method::GET).get("x-requested-with"),
            Some("vignette")
        );
    }

    #[test]
    fn registry_lookup_is_per_server() {
        let registry = InMemoryClientRegistry::new();
        registry.register(chat(), Arc::new(ServerClient::new(chat())));

        assert_eq!(registry.len(), 1);
        assert!(registry.client_for(&chat()).is_ok());

        let other = ServerIdentity::new("https://other.example.com");
        assert_eq!(
            registry.client_for(&other).unwrap_err(),
            ClientLookupError::NotRegistered { server: other }
        );

        assert!(registry.remove(&chat()).is_some());
        assert!(registry.is_empty());
    }
}
