use std::fmt;

use url::Url;
use vignette_model::ServerIdentity;

use crate::ConfigLoadError;

/// Non-fatal adjustments made while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    AuthPathPrefixNormalized { from: String, to: String },
    AcceptAlwaysStripped,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::AuthPathPrefixNormalized { from, to } => {
                write!(f, "auth path prefix '{from}' normalized to '{to}'")
            }
            ConfigWarning::AcceptAlwaysStripped => f.write_str(
                "'Accept' is always stripped; listing it in strip_headers has no effect",
            ),
        }
    }
}

pub fn validate_server_url(raw: &str) -> Result<ServerIdentity, ConfigLoadError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| {
        ConfigLoadError::InvalidServerUrl {
            value: trimmed.to_string(),
            source,
        }
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigLoadError::UnsupportedServerScheme {
            value: trimmed.to_string(),
        });
    }
    Ok(ServerIdentity::new(trimmed))
}

pub fn validate_auth_path_prefix(
    raw: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') || trimmed.contains(['?', '#']) {
        return Err(ConfigLoadError::InvalidAuthPathPrefix {
            value: raw.to_string(),
        });
    }
    if trimmed.ends_with('/') {
        return Ok(trimmed.to_string());
    }

    let normalized = format!("{trimmed}/");
    warnings.push(ConfigWarning::AuthPathPrefixNormalized {
        from: trimmed.to_string(),
        to: normalized.clone(),
    });
    Ok(normalized)
}

pub fn validate_placeholder_marker(raw: &str) -> Result<String, ConfigLoadError> {
    let marker = raw.trim();
    let valid = !marker.is_empty()
        && marker
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'));
    if !valid {
        return Err(ConfigLoadError::InvalidPlaceholderMarker {
            value: raw.to_string(),
        });
    }
    Ok(marker.to_string())
}

pub fn validate_strip_headers(
    names: Vec<String>,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("accept") {
            warnings.push(ConfigWarning::AcceptAlwaysStripped);
            continue;
        }
        if !kept.iter().any(|k| k.eq_ignore_ascii_case(name)) {
            kept.push(name.to_string());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_url_requires_http_scheme() {
        assert_eq!(
            validate_server_url(" https://chat.example.com ")
                .unwrap()
                .as_str(),
            "https://chat.example.com"
        );
        assert!(matches!(
            validate_server_url("chat.example.com"),
            Err(ConfigLoadError::InvalidServerUrl { .. })
        ));
        assert!(matches!(
            validate_server_url("ftp://chat.example.com"),
            Err(ConfigLoadError::UnsupportedServerScheme { .. })
        ));
    }

    #[test]
    fn prefix_gets_trailing_slash_with_warning() {
        let mut warnings = Vec::new();
        assert_eq!(
            validate_auth_path_prefix("/api/v4", &mut warnings).unwrap(),
            "/api/v4/"
        );
        assert_eq!(warnings.len(), 1);

        assert!(validate_auth_path_prefix("api/v4/", &mut warnings).is_err());
        assert!(validate_auth_path_prefix("/api?x=1", &mut warnings).is_err());
    }

    #[test]
    fn marker_rejects_delimiters_and_blanks() {
        assert_eq!(validate_placeholder_marker("thumb").unwrap(), "thumb");
        assert!(validate_placeholder_marker("").is_err());
        assert!(validate_placeholder_marker("th@mb").is_err());
        assert!(validate_placeholder_marker("a/b").is_err());
    }

    #[test]
    fn strip_headers_dedupes_and_warns_on_accept() {
        let mut warnings = Vec::new();
        let kept = validate_strip_headers(
            vec![
                "X-Requested-With".into(),
                "ACCEPT".into(),
                "x-requested-with".into(),
                " ".into(),
            ],
            &mut warnings,
        );
        assert_eq!(kept, vec!["X-Requested-With".to_string()]);
        assert_eq!(warnings, vec![ConfigWarning::AcceptAlwaysStripped]);
    }
}
