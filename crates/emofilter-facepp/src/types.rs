//! Face++ detect API response types.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Response from the `detect` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectResponse {
    /// Detected faces; absent or null when no face was found
    #[serde(default)]
    pub faces: Option<Vec<Face>>,
    /// Error code reported by Face++ on failed requests
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl DetectResponse {
    /// Detected faces, empty when the field was absent.
    pub fn faces(&self) -> &[Face] {
        self.faces.as_deref().unwrap_or_default()
    }
}

/// One detected face.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Face {
    #[serde(default)]
    pub face_token: Option<String>,
    /// Requested attributes; absent when Face++ could not classify the face
    #[serde(default)]
    pub attributes: Option<FaceAttributes>,
}

impl Face {
    /// Emotion distribution, if the face carries one.
    pub fn emotion(&self) -> Option<&EmotionDistribution> {
        self.attributes.as_ref()?.emotion.as_ref()
    }
}

/// Attributes returned for a face (only `emotion` is requested).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaceAttributes {
    #[serde(default)]
    pub emotion: Option<EmotionDistribution>,
}

/// Emotion label to probability entries, in the order Face++ sent them.
///
/// Order matters for tie-breaking, so this is a list rather than a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionDistribution(Vec<(String, f64)>);

impl EmotionDistribution {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, p)| (name.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for EmotionDistribution {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, p)| (name.into(), p)).collect())
    }
}

impl<'de> Deserialize<'de> for EmotionDistribution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = EmotionDistribution;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of emotion names to probabilities")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(7));
                while let Some((name, probability)) = map.next_entry::<String, f64>()? {
                    entries.push((name, probability));
                }
                Ok(EmotionDistribution(entries))
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}
