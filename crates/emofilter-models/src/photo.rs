//! Photo records.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A caller-owned photo record that can be classified and filtered.
///
/// Implementors are used as cache keys, so equality and hashing must be
/// stable for the lifetime of the filtering service.
pub trait PhotoSource: Clone + Eq + Hash + Send + Sync + 'static {
    /// Publicly reachable URL of the image.
    fn origin_url(&self) -> &str;
}

/// Basic photo record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoInfo {
    /// Caller-side identifier
    pub id: String,
    /// Image source URL
    pub origin_url: String,
    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PhotoInfo {
    pub fn new(id: impl Into<String>, origin_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin_url: origin_url.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl PhotoSource for PhotoInfo {
    fn origin_url(&self) -> &str {
        &self.origin_url
    }
}
