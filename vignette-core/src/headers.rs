//! Merging of server-issued and caller-supplied request headers.

use vignette_model::Headers;

/// Header the renderer negotiates itself. A carried-over value makes it
/// cache or decode the wrong format, so it is always removed.
pub const ACCEPT: &str = "Accept";

/// Combines auth headers from the server client with the caller's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMerger {
    stripped: Vec<String>,
}

impl Default for HeaderMerger {
    fn default() -> Self {
        Self {
            stripped: vec![ACCEPT.to_string()],
        }
    }
}

impl HeaderMerger {
    /// Build a merger that strips `extra` in addition to `Accept`.
    pub fn with_stripped<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merger = Self::default();
        for name in extra {
            let name = name.into();
            let name = name.trim();
            if name.is_empty()
                || merger
                    .stripped
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(name))
            {
                continue;
            }
            merger.stripped.push(name.to_string());
        }
        merger
    }

    pub fn stripped(&self) -> &[String] {
        &self.stripped
    }

    /// Without auth (or without server headers) the caller's headers pass
    /// through; with auth the server headers are overlaid by the caller's.
    /// Stripped names are removed from either result.
    pub fn merge(
        &self,
        base: Option<&Headers>,
        caller: Option<&Headers>,
        attach_auth: bool,
    ) -> Option<Headers> {
        let mut merged = match (attach_auth, base) {
            (true, Some(base)) => {
                let mut merged = base.clone();
                if let Some(caller) = caller {
                    merged.extend_from(caller);
                }
                merged
            }
            _ => caller?.clone(),
        };

        for name in &self.stripped {
            merged.remove(name);
        }
        Some(merged)
    }
}

/// [`HeaderMerger::merge`] with the default stripped set.
pub fn merge_headers(
    base: Option<&Headers>,
    caller: Option<&Headers>,
    attach_auth: bool,
) -> Option<Headers> {
    HeaderMerger::default().merge(base, caller, attach_auth)
}
