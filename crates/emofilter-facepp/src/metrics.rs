//! Face++ metrics collection.
//!
//! Provides standardized metrics for monitoring emotion classification:
//! - Request counters by status
//! - Latency histograms
//! - Cache hit/miss counters

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total Face++ detect requests by status.
    pub const REQUESTS_TOTAL: &str = "facepp_requests_total";

    /// Detect request latency in seconds.
    pub const LATENCY_SECONDS: &str = "facepp_latency_seconds";

    /// Emotion cache lookups by result (hit/miss).
    pub const CACHE_LOOKUPS_TOTAL: &str = "facepp_emotion_cache_lookups_total";

    /// Photos kept or dropped by the filter.
    pub const PHOTOS_FILTERED_TOTAL: &str = "facepp_photos_filtered_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed detect request.
///
/// `status` is 0 when no HTTP response was received.
pub fn record_request(status: u16, latency_ms: f64) {
    counter!(names::REQUESTS_TOTAL, "status" => status.to_string()).increment(1);
    histogram!(names::LATENCY_SECONDS).record(latency_ms / 1000.0);
}

/// Record an emotion cache lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!(names::CACHE_LOOKUPS_TOTAL, "result" => result).increment(1);
}

/// Record a filtering decision.
pub fn record_filter_outcome(kept: bool) {
    let outcome = if kept { "kept" } else { "dropped" };
    counter!(names::PHOTOS_FILTERED_TOTAL, "outcome" => outcome).increment(1);
}

// =============================================================================
// Tests
// =============================================================================
