//! Emotion catalog.
//!
//! The seven emotion categories reported by the face-analysis API, each with
//! a stable integer identifier:
//!
//! - `Sadness` (0)
//! - `Neutral` (1)
//! - `Disgust` (2)
//! - `Anger` (3)
//! - `Surprise` (4)
//! - `Fear` (5)
//! - `Happiness` (6)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Emotion category detected on a face.
///
/// The enum value doubles as the emotion identifier; use [`Emotion::id`] to
/// get the numeric form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Emotion {
    Sadness = 0,
    Neutral = 1,
    Disgust = 2,
    Anger = 3,
    Surprise = 4,
    Fear = 5,
    Happiness = 6,
}

impl Emotion {
    /// All emotions, ordered by identifier.
    pub const ALL: &'static [Emotion] = &[
        Emotion::Sadness,
        Emotion::Neutral,
        Emotion::Disgust,
        Emotion::Anger,
        Emotion::Surprise,
        Emotion::Fear,
        Emotion::Happiness,
    ];

    /// Stable numeric identifier.
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Look up an emotion by numeric identifier.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Look up an emotion by the label the face-analysis API uses.
    ///
    /// Exact, case-sensitive match. Unknown labels yield `None` so callers can
    /// drop them without aborting.
    pub fn id_for(name: &str) -> Option<Self> {
        match name {
            "sadness" => Some(Emotion::Sadness),
            "neutral" => Some(Emotion::Neutral),
            "disgust" => Some(Emotion::Disgust),
            "anger" => Some(Emotion::Anger),
            "surprise" => Some(Emotion::Surprise),
            "fear" => Some(Emotion::Fear),
            "happiness" => Some(Emotion::Happiness),
            _ => None,
        }
    }

    /// Returns the API label for this emotion.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Sadness => "sadness",
            Emotion::Neutral => "neutral",
            Emotion::Disgust => "disgust",
            Emotion::Anger => "anger",
            Emotion::Surprise => "surprise",
            Emotion::Fear => "fear",
            Emotion::Happiness => "happiness",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = EmotionParseError;

    /// Lenient parse for user input: case-insensitive, accepts numeric ids
    /// and a few common synonyms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        if let Ok(id) = normalized.parse::<u8>() {
            return Self::from_id(id).ok_or_else(|| EmotionParseError(s.to_string()));
        }

        match normalized.as_str() {
            "sad" => Ok(Emotion::Sadness),
            "happy" | "joy" => Ok(Emotion::Happiness),
            "angry" => Ok(Emotion::Anger),
            "surprised" => Ok(Emotion::Surprise),
            other => Self::id_for(other).ok_or_else(|| EmotionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown emotion: {0}")]
pub struct EmotionParseError(String);
