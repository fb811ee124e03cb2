//! Per-server cache partitions and image cache keys.
//!
//! The partition name is for path legality only. It is neither secret nor
//! tamper resistant.

use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use sha2::{Digest, Sha256};
use vignette_model::{CacheKey, CachePath, ImageId, ServerIdentity};

/// Separates an escaped id from the variant marker in derived keys.
pub const VARIANT_DELIMITER: char = '@';

/// Marker appended to placeholder keys.
pub const DEFAULT_PLACEHOLDER_MARKER: &str = "thumb";

// `@` must never survive inside the id part of a derived key, and `%` has
// to be escaped as well to keep the escaping injective.
const KEY_ESCAPE: &AsciiSet = &CONTROLS.add(b'@').add(b'%');

/// Encoding used to turn a server identity into a partition name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CachePathEncoding {
    /// URL-safe base64 without padding. Reversible.
    #[default]
    Base64Url,
    /// Hex of the first 16 bytes of the SHA-256 digest.
    Sha256,
}

impl CachePathEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            CachePathEncoding::Base64Url => "base64",
            CachePathEncoding::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for CachePathEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown [`CachePathEncoding`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cache path encoding '{0}' (expected base64 or sha256)")]
pub struct UnknownCachePathEncoding(pub String);

impl FromStr for CachePathEncoding {
    type Err = UnknownCachePathEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" | "base64url" => Ok(CachePathEncoding::Base64Url),
            "sha256" => Ok(CachePathEncoding::Sha256),
            other => Err(UnknownCachePathEncoding(other.to_string())),
        }
    }
}

/// Derives cache coordinates for images of one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyDeriver {
    encoding: CachePathEncoding,
    placeholder_marker: String,
}

impl Default for CacheKeyDeriver {
    fn default() -> Self {
        Self::new(CachePathEncoding::default(), DEFAULT_PLACEHOLDER_MARKER)
    }
}

impl CacheKeyDeriver {
    pub fn new(
        encoding: CachePathEncoding,
        placeholder_marker: impl Into<String>,
    ) -> Self {
        let marker = placeholder_marker.into();
        let marker = if marker.is_empty() {
            DEFAULT_PLACEHOLDER_MARKER.to_string()
        } else {
            marker
        };
        Self {
            encoding,
            placeholder_marker: marker,
        }
    }

    pub fn encoding(&self) -> CachePathEncoding {
        self.encoding
    }

    pub fn placeholder_marker(&self) -> &str {
        &self.placeholder_marker
    }

    /// Partition name for `server`. The identity string is encoded exactly
    /// as given, so distinct identities get distinct partitions.
    pub fn cache_path_for(&self, server: &ServerIdentity) -> CachePath {
        let bytes = server.as_str().as_bytes();
        let encoded = match self.encoding {
            CachePathEncoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
            CachePathEncoding::Sha256 => {
                let digest = Sha256::digest(bytes);
                hex::encode(&digest[..16])
            }
        };
        CachePath::new(encoded)
    }

    pub fn primary_cache_key(&self, id: &ImageId) -> CacheKey {
        CacheKey::new(id.as_str().to_string())
    }

    /// Key for the placeholder variant of `id`; always distinct from the
    /// primary key of the same id.
    pub fn placeholder_cache_key(&self, id: &ImageId) -> CacheKey {
        let escaped = utf8_percent_encode(id.as_str(), KEY_ESCAPE).to_string();
        let mut key = String::with_capacity(
            escaped.len() + 1 + self.placeholder_marker.len(),
        );
        key.push_str(&escaped);
        key.push(VARIANT_DELIMITER);
        key.push_str(&self.placeholder_marker);
        CacheKey::new(key)
    }
}

/// [`CacheKeyDeriver::cache_path_for`] with the default encoding.
pub fn cache_path_for(server: &ServerIdentity) -> CachePath {
    CacheKeyDeriver::default().cache_path_for(server)
}

pub fn primary_cache_key(id: &ImageId) -> CacheKey {
    CacheKeyDeriver::default().primary_cache_key(id)
}

pub fn placeholder_cache_key(id: &ImageId) -> CacheKey {
    CacheKeyDeriver::default().placeholder_cache_key(id)
}

#[cfg(test)]
mod tests {
    use super::{
        CacheKeyDeriver, CachePathEncoding, cache_path_for,
        placeholder_cache_key, primary_cache_key,
    };
    use vignette_model::{ImageId, ServerIdentity};

    fn id(raw: &str) -> ImageId {
        ImageId::new(raw).unwrap()
    }

    fn assert_path_safe(path: &str) {
        assert!(!path.is_empty());
        assert!(
            path.bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            "unsafe character in {path}"
        );
    }

    #[test]
    fn cache_path_is_deterministic_and_path_safe() {
        let server = ServerIdentity::new("https://chat.example.com:8065/team?x=/");
        let a = cache_path_for(&server);
        let b = cache_path_for(&server);
        assert_eq!(a, b);
        assert_path_safe(a.as_str());
    }

    #[test]
    fn cache_path_is_plain_url_safe_base64() {
        let path = cache_path_for(&ServerIdentity::new("https://chat.example.com"));
        assert_eq!(path.as_str(), "aHR0cHM6Ly9jaGF0LmV4YW1wbGUuY29t");
    }

    #[test]
    fn distinct_servers_get_distinct_paths() {
        for encoding in [CachePathEncoding::Base64Url, CachePathEncoding::Sha256] {
            let deriver = CacheKeyDeriver::new(encoding, "thumb");
            let a = deriver.cache_path_for(&ServerIdentity::new("https://a.example.com"));
            let b = deriver.cache_path_for(&ServerIdentity::new("https://b.example.com"));
            let c = deriver.cache_path_for(&ServerIdentity::new("https://a.example.com/"));
            assert_ne!(a, b);
            assert_ne!(a, c);
            assert_path_safe(a.as_str());
        }
    }

    #[test]
    fn sha256_paths_are_fixed_width_hex() {
        let deriver = CacheKeyDeriver::new(CachePathEncoding::Sha256, "thumb");
        let path = deriver.cache_path_for(&ServerIdentity::new("https://a.example.com"));
        assert_eq!(path.as_str().len(), 32);
        assert!(path.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn primary_key_is_identity() {
        assert_eq!(primary_cache_key(&id("img-1")).as_str(), "img-1");
    }

    #[test]
    fn placeholder_key_is_distinct_and_deterministic() {
        let img = id("img-1");
        assert_ne!(primary_cache_key(&img), placeholder_cache_key(&img));
        assert_eq!(placeholder_cache_key(&img), placeholder_cache_key(&img));
        assert_eq!(placeholder_cache_key(&img).as_str(), "img-1@thumb");
    }

    #[test]
    fn placeholder_keys_escape_the_delimiter() {
        let tricky = id("a@thumb");
        assert_eq!(placeholder_cache_key(&tricky).as_str(), "a%40thumb@thumb");
        assert_ne!(
            placeholder_cache_key(&tricky),
            placeholder_cache_key(&id("a"))
        );
        assert_ne!(
            placeholder_cache_key(&id("a%40thumb")),
            placeholder_cache_key(&tricky)
        );
    }

    #[test]
    fn empty_marker_falls_back_to_default() {
        let deriver = CacheKeyDeriver::new(CachePathEncoding::Base64Url, "");
        assert_eq!(deriver.placeholder_marker(), "thumb");
    }

    #[test]
    fn encoding_names_parse() {
        assert_eq!(
            "base64".parse::<CachePathEncoding>(),
            Ok(CachePathEncoding::Base64Url)
        );
        assert_eq!(
            " SHA256 ".parse::<CachePathEncoding>(),
            Ok(CachePathEncoding::Sha256)
        );
        assert!("md5".parse::<CachePathEncoding>().is_err());
    }
}
