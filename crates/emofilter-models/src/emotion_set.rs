//! Per-photo emotion results.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

/// Dominant emotions detected in one photo, one entry per classifiable face.
///
/// Entries keep the face order returned by the API and may repeat when
/// several faces share the same dominant emotion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionIdSet(Vec<Emotion>);

impl EmotionIdSet {
    pub fn new(emotions: Vec<Emotion>) -> Self {
        Self(emotions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Emotion] {
        &self.0
    }

    /// Numeric identifiers in face order.
    pub fn ids(&self) -> Vec<u8> {
        self.0.iter().map(Emotion::id).collect()
    }

    /// True if at least one detected emotion is in `targets`.
    ///
    /// An empty target set never intersects.
    pub fn intersects(&self, targets: &HashSet<Emotion>) -> bool {
        self.0.iter().any(|emotion| targets.contains(emotion))
    }
}

impl From<Vec<Emotion>> for EmotionIdSet {
    fn from(emotions: Vec<Emotion>) -> Self {
        Self(emotions)
    }
}

impl FromIterator<Emotion> for EmotionIdSet {
    fn from_iter<I: IntoIterator<Item = Emotion>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for EmotionIdSet {
    type Item = Emotion;
    type IntoIter = std::vec::IntoIter<Emotion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
