//! Origin matching for authenticated image requests.
//!
//! Credentials for a server are only ever sent to that server's own API
//! namespace. Anything that cannot be parsed is treated as foreign.

use tracing::debug;
use url::Url;
use vignette_model::ServerIdentity;

/// Path prefix of the server's authenticated REST surface.
pub const DEFAULT_AUTH_PATH_PREFIX: &str = "/api/v4/";

/// Decides whether a request URI belongs to the active server's
/// authenticated API surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginMatcher {
    api_prefix: String,
}

impl Default for OriginMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_PATH_PREFIX)
    }
}

impl OriginMatcher {
    /// Build a matcher for `api_prefix`. A missing leading or trailing `/`
    /// is added so `api/v4` and `/api/v4/` behave the same.
    pub fn new(api_prefix: impl AsRef<str>) -> Self {
        Self {
            api_prefix: normalize_prefix(api_prefix.as_ref()),
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// True only when `uri` has exactly the server's origin and its path
    /// lies under the server's API namespace.
    pub fn should_attach_auth(
        &self,
        uri: Option<&str>,
        server: &ServerIdentity,
    ) -> bool {
        let Some(uri) = uri else {
            return false;
        };

        let Ok(request) = Url::parse(uri) else {
            debug!(uri, "request uri did not parse; not attaching auth");
            return false;
        };
        let Ok(server_url) = Url::parse(server.as_str()) else {
            debug!(%server, "server identity did not parse; not attaching auth");
            return false;
        };

        let origin = request.origin();
        if !origin.is_tuple() || origin != server_url.origin() {
            return false;
        }

        let namespace = self.namespace_for(&server_url);
        request.path().starts_with(&namespace)
    }

    // Sub-path deployments (`https://host/team`) serve the API under that
    // path, so the prefix is scoped to it.
    fn namespace_for(&self, server_url: &Url) -> String {
        let base = server_url.path().trim_end_matches('/');
        let mut namespace =
            String::with_capacity(base.len() + self.api_prefix.len());
        namespace.push_str(base);
        namespace.push_str(&self.api_prefix);
        namespace
    }
}

/// [`OriginMatcher::should_attach_auth`] with the default API prefix.
pub fn should_attach_auth(uri: Option<&str>, server: &ServerIdentity) -> bool {
    OriginMatcher::default().should_attach_auth(uri, server)
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    format!("/{trimmed}/")
}

#[cfg(test)]
mod tests {
    use super::{OriginMatcher, should_attach_auth};
    use vignette_model::ServerIdentity;

    fn server(url: &str) -> ServerIdentity {
        ServerIdentity::new(url)
    }

    #[test]
    fn same_origin_api_path_attaches() {
        let s = server("https://a.example.com");
        assert!(should_attach_auth(
            Some("https://a.example.com/api/v4/files/1"),
            &s
        ));
    }

    #[test]
    fn same_origin_static_path_does_not_attach() {
        let s = server("https://a.example.com");
        assert!(!should_attach_auth(
            Some("https://a.example.com/static/logo.png"),
            &s
        ));
    }

    #[test]
    fn other_host_never_attaches() {
        let s = server("https://a.example.com");
        assert!(!should_attach_auth(
            Some("https://b.example.com/api/v4/files/1"),
            &s
        ));
        assert!(!should_attach_auth(
            Some("https://a.example.com.evil.net/api/v4/files/1"),
            &s
        ));
    }

    #[test]
    fn scheme_and_port_are_part_of_origin() {
        let s = server("https://a.example.com");
        assert!(!should_attach_auth(
            Some("http://a.example.com/api/v4/files/1"),
            &s
        ));
        assert!(!should_attach_auth(
            Some("https://a.example.com:8443/api/v4/files/1"),
            &s
        ));
        assert!(should_attach_auth(
            Some("https://a.example.com:443/api/v4/files/1"),
            &s
        ));
    }

    #[test]
    fn missing_or_unparsable_input_fails_closed() {
        let s = server("https://a.example.com");
        assert!(!should_attach_auth(None, &s));
        assert!(!should_attach_auth(Some(""), &s));
        assert!(!should_attach_auth(Some("not a url"), &s));
        assert!(!should_attach_auth(Some("/api/v4/files/1"), &s));
        assert!(!should_attach_auth(
            Some("https://a.example.com/api/v4/files/1"),
            &server("a.example.com")
        ));
        assert!(!should_attach_auth(
            Some("https://a.example.com/api/v4/files/1"),
            &server("::::")
        ));
    }

    #[test]
    fn opaque_origins_never_match() {
        let s = server("data:text/plain,hi");
        assert!(!should_attach_auth(Some("data:text/plain,hi"), &s));
    }

    #[test]
    fn dot_segments_cannot_escape_into_namespace() {
        let s = server("https://a.example.com");
        assert!(!should_attach_auth(
            Some("https://a.example.com/api/v4/../../static/x.png"),
            &s
        ));
        assert!(!should_attach_auth(
            Some("https://a.example.com/api/v4x/files/1"),
            &s
        ));
    }

    #[test]
    fn subpath_deployments_scope_the_namespace() {
        let s = server("https://host.example.com/team/");
        assert!(should_attach_auth(
            Some("https://host.example.com/team/api/v4/files/1"),
            &s
        ));
        assert!(!should_attach_auth(
            Some("https://host.example.com/api/v4/files/1"),
            &s
        ));
    }

    #[test]
    fn custom_prefix_is_normalized() {
        let matcher = OriginMatcher::new("api/v5");
        assert_eq!(matcher.api_prefix(), "/api/v5/");
        let s = server("https://a.example.com");
        assert!(matcher.should_attach_auth(
            Some("https://a.example.com/api/v5/files/1"),
            &s
        ));
        assert!(!matcher.should_attach_auth(
            Some("https://a.example.com/api/v4/files/1"),
            &s
        ));
    }
}
