use serde::{Deserialize, Serialize};

use crate::headers::Headers;

/// Opaque handle to an image bundled with the application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssetHandle(pub u32);

/// Network image reference as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
}

impl RemoteSource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Raw image source: either a URI based reference or a bundled asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Remote(RemoteSource),
    Bundled(AssetHandle),
}

impl ImageSource {
    pub fn remote(uri: impl Into<String>) -> Self {
        ImageSource::Remote(RemoteSource::new(uri))
    }

    pub fn bundled(handle: u32) -> Self {
        ImageSource::Bundled(AssetHandle(handle))
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            ImageSource::Remote(remote) => Some(remote.uri.as_str()),
            ImageSource::Bundled(_) => None,
        }
    }
}

impl From<RemoteSource> for ImageSource {
    fn from(value: RemoteSource) -> Self {
        ImageSource::Remote(value)
    }
}

impl From<AssetHandle> for ImageSource {
    fn from(value: AssetHandle) -> Self {
        ImageSource::Bundled(value)
    }
}
