//! Face++ emotion classification and photo filtering.
//!
//! This crate provides:
//! - An HTTP client for the Face++ `detect` endpoint
//! - Dominant-emotion extraction per detected face
//! - A per-photo emotion resolver with an in-memory, single-flight cache
//! - `EmotionFilterService`, which keeps the photos showing any of a set of emotions

pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod resolver;
pub mod service;
pub mod types;

pub use client::{FaceAnalyzer, FacePlusPlusClient};
pub use config::{FacePlusPlusConfig, FailurePolicy};
pub use error::{FppError, FppResult};
pub use extractor::dominant_emotion;
pub use resolver::EmotionResolver;
pub use service::EmotionFilterService;
pub use types::{DetectResponse, EmotionDistribution, Face, FaceAttributes};
