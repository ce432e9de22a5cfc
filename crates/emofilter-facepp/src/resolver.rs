//! Per-photo emotion resolution with an in-memory cache.
//!
//! Each distinct photo is classified at most once per resolver:
//! - Fast path: a resolved photo is served from the cache without I/O
//! - Slow path: one remote call per photo, even when several tasks ask for
//!   the same photo concurrently (single-flight per key)
//! - Failed resolutions leave no cache entry behind

use std::collections::HashMap;
use std::sync::Arc;

use emofilter_models::{EmotionIdSet, PhotoSource};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, trace};

use crate::client::FaceAnalyzer;
use crate::error::{FppError, FppResult};
use crate::extractor::face_emotion;
use crate::metrics::record_cache_lookup;
use crate::types::DetectResponse;

/// Resolves the dominant emotions of a photo and remembers the result.
///
/// The cache lives as long as the resolver and is never evicted.
pub struct EmotionResolver<P: PhotoSource> {
    cache: Mutex<HashMap<P, Arc<OnceCell<EmotionIdSet>>>>,
}

impl<P: PhotoSource> Default for EmotionResolver<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhotoSource> EmotionResolver<P> {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the emotions of `photo`, calling `session` only on a cache miss.
    pub async fn resolve(
        &self,
        session: &dyn FaceAnalyzer,
        photo: &P,
    ) -> FppResult<EmotionIdSet> {
        let cell = {
            let mut cache = self.cache.lock().await;
            Arc::clone(cache.entry(photo.clone()).or_default())
        };

        if let Some(emotions) = cell.get() {
            record_cache_lookup(true);
            trace!(photo = %photo.origin_url(), "Emotion cache HIT");
            return Ok(emotions.clone());
        }

        let result = cell
            .get_or_try_init(|| async {
                record_cache_lookup(false);
                debug!(photo = %photo.origin_url(), "Emotion cache MISS, classifying");

                let response = session.detect(photo.origin_url()).await?;
                Ok::<_, FppError>(collect_emotions(&response))
            })
            .await;

        match result {
            Ok(emotions) => Ok(emotions.clone()),
            Err(e) => {
                self.evict_unresolved(photo, &cell).await;
                Err(e)
            }
        }
    }

    /// Drop the entry for `photo` if it still holds this uninitialized cell.
    ///
    /// A concurrent caller may have re-inserted or initialized the slot in the
    /// meantime; those entries are left alone.
    async fn evict_unresolved(&self, photo: &P, cell: &Arc<OnceCell<EmotionIdSet>>) {
        let mut cache = self.cache.lock().await;
        let stale = cache
            .get(photo)
            .is_some_and(|stored| Arc::ptr_eq(stored, cell) && !stored.initialized());
        if stale {
            cache.remove(photo);
            trace!(photo = %photo.origin_url(), "Evicted failed cache slot");
        }
    }

    /// Cached result for `photo`, if it was already resolved.
    pub async fn cached(&self, photo: &P) -> Option<EmotionIdSet> {
        let cache = self.cache.lock().await;
        cache.get(photo).and_then(|cell| cell.get().cloned())
    }

    /// Number of resolved photos.
    pub async fn len(&self) -> usize {
        let cache = self.cache.lock().await;
        cache.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Dominant emotion of every classifiable face, in face order.
pub fn collect_emotions(response: &DetectResponse) -> EmotionIdSet {
    response
        .faces()
        .iter()
        .enumerate()
        .filter_map(|(index, face)| {
            if face.attributes.is_none() {
                trace!(face = index, "Skipping face without attributes");
            }
            face_emotion(face)
        })
        .collect()
}
