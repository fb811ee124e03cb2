use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, non-empty identifier for the logical image being rendered.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Returns `None` for empty or whitespace-only input, which callers
    /// treat the same as an absent id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageId").field(&self.0).finish()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the rendering collaborator should cache an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Disk cache keyed by `id`, partitioned per server.
    PersistentNamed { id: ImageId },
    /// No durable key. A supplied id is carried along but never used for
    /// caching.
    MemoryOnly { id: Option<ImageId> },
}

impl CachePolicy {
    pub fn persistent(id: ImageId) -> Self {
        CachePolicy::PersistentNamed { id }
    }

    pub fn memory_only() -> Self {
        CachePolicy::MemoryOnly { id: None }
    }

    /// Build a policy from loosely typed caller props.
    ///
    /// A persistent request without a usable id falls back to unkeyed
    /// caching instead of being rejected.
    pub fn from_props(id: Option<&str>, memory_only: bool) -> Self {
        let id = id.and_then(ImageId::new);
        match (memory_only, id) {
            (true, id) => CachePolicy::MemoryOnly { id },
            (false, Some(id)) => CachePolicy::PersistentNamed { id },
            (false, None) => CachePolicy::MemoryOnly { id: None },
        }
    }

    /// The id that should drive cache keys, if any.
    pub fn cache_id(&self) -> Option<&ImageId> {
        match self {
            CachePolicy::PersistentNamed { id } => Some(id),
            CachePolicy::MemoryOnly { .. } => None,
        }
    }
}

/// Key locating one cached artifact within a partition.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filesystem-safe, per-server cache partition name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachePath(String);

impl CachePath {
    pub fn new(path: String) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CachePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CachePath").field(&self.0).finish()
    }
}

impl fmt::Display for CachePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{CachePolicy, ImageId};

    #[test]
    fn blank_ids_are_absent() {
        assert!(ImageId::new("").is_none());
        assert!(ImageId::new("   ").is_none());
        assert!(ImageId::new("file-1").is_some());
    }

    #[test]
    fn memory_only_props_keep_id_but_expose_no_cache_id() {
        let policy = CachePolicy::from_props(Some("file-9"), true);
        assert_eq!(
            policy,
            CachePolicy::MemoryOnly {
                id: ImageId::new("file-9")
            }
        );
        assert!(policy.cache_id().is_none());
    }

    #[test]
    fn persistent_props_without_id_degrade_to_unkeyed() {
        assert_eq!(
            CachePolicy::from_props(None, false),
            CachePolicy::memory_only()
        );
        assert_eq!(
            CachePolicy::from_props(Some(""), false),
            CachePolicy::memory_only()
        );
    }

    #[test]
    fn persistent_props_with_id_are_keyed() {
        let policy = CachePolicy::from_props(Some("file-42"), false);
        assert_eq!(policy.cache_id().map(ImageId::as_str), Some("file-42"));
    }
}
