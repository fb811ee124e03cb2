use crate::{cache::CachePolicy, source::ImageSource};

/// Everything a caller declares for one rendered image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    pub source: ImageSource,
    pub placeholder: Option<ImageSource>,
    pub cache: CachePolicy,
}

impl ImageRequest {
    pub fn new(source: ImageSource, cache: CachePolicy) -> Self {
        Self {
            source,
            placeholder: None,
            cache,
        }
    }

    pub fn with_placeholder(mut self, placeholder: ImageSource) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}
