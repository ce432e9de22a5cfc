//! Dominant-emotion extraction.

use emofilter_models::Emotion;

use crate::types::{EmotionDistribution, Face};

/// Pick the most probable emotion label of one face.
///
/// Scans entries in API order with a running maximum that starts at 0. An
/// entry only takes over when its probability is strictly greater, so ties
/// keep the first one seen and a distribution whose maximum is 0 has no
/// dominant emotion.
pub fn dominant_emotion(distribution: &EmotionDistribution) -> Option<&str> {
    let mut max_probability = 0.0_f64;
    let mut probable = None;

    for (name, probability) in distribution.iter() {
        if probability > max_probability {
            max_probability = probability;
            probable = Some(name);
        }
    }

    probable
}

/// Dominant emotion of a face, mapped through the catalog.
///
/// `None` when the face has no attributes, no emotion is above 0, or the
/// winning label is not a known emotion.
pub fn face_emotion(face: &Face) -> Option<Emotion> {
    let distribution = face.emotion()?;
    let name = dominant_emotion(distribution)?;
    let emotion = Emotion::id_for(name);

    if emotion.is_none() {
        tracing::debug!(label = %name, "Dropping unrecognized emotion label");
    }

    emotion
}
