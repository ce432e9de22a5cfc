//! Shared data models for emotion-based photo filtering.
//!
//! This crate provides:
//! - The emotion catalog with stable identifiers
//! - Per-photo emotion results
//! - Photo records and the `PhotoSource` trait

pub mod emotion;
pub mod emotion_set;
pub mod photo;

pub use emotion::{Emotion, EmotionParseError};
pub use emotion_set::EmotionIdSet;
pub use photo::{PhotoInfo, PhotoSource};
