use serde::{Deserialize, Serialize};

use crate::{
    cache::{CacheKey, CachePath},
    headers::Headers,
    source::AssetHandle,
};

/// Normalized network request handed to the image renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<CacheKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<CachePath>,
}

/// Result of resolving one raw source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedSource {
    Remote(RequestDescriptor),
    Bundled(AssetHandle),
}

impl ResolvedSource {
    pub fn as_remote(&self) -> Option<&RequestDescriptor> {
        match self {
            ResolvedSource::Remote(descriptor) => Some(descriptor),
            ResolvedSource::Bundled(_) => None,
        }
    }
}

/// Resolved primary image and optional placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub source: ResolvedSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<ResolvedSource>,
}
