//! Emotion-based photo filtering service.

use std::collections::HashSet;
use std::pin::pin;

use emofilter_models::{Emotion, PhotoSource};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::client::{FaceAnalyzer, FacePlusPlusClient};
use crate::config::{FacePlusPlusConfig, FailurePolicy};
use crate::error::FppResult;
use crate::metrics::record_filter_outcome;
use crate::resolver::EmotionResolver;

/// Filters photos by the emotions expressed on their faces.
///
/// Holds the configuration and the emotion cache; a fresh HTTP session is
/// opened for every filtering pass.
pub struct EmotionFilterService<P: PhotoSource> {
    config: FacePlusPlusConfig,
    resolver: EmotionResolver<P>,
}

impl<P: PhotoSource> EmotionFilterService<P> {
    pub fn new(config: FacePlusPlusConfig) -> Self {
        Self {
            config,
            resolver: EmotionResolver::new(),
        }
    }

    /// Build the service from an optional config.
    ///
    /// `None` means the service is unavailable; callers must check before use.
    pub fn from_config(config: Option<FacePlusPlusConfig>) -> Option<Self> {
        config.map(Self::new)
    }

    /// Create from environment variables, or `None` if credentials are missing.
    pub fn from_env() -> Option<Self> {
        Self::from_config(FacePlusPlusConfig::from_env())
    }

    pub fn config(&self) -> &FacePlusPlusConfig {
        &self.config
    }

    pub fn resolver(&self) -> &EmotionResolver<P> {
        &self.resolver
    }

    /// Keep the photos showing at least one of `targets`, in input order.
    ///
    /// Opens one HTTP session for the whole pass and closes it on return,
    /// whether the pass succeeded or not.
    pub async fn filter_by_emotions(
        &self,
        photos: &[P],
        targets: &HashSet<Emotion>,
    ) -> FppResult<Vec<P>> {
        if photos.is_empty() || targets.is_empty() {
            debug!(
                photos = photos.len(),
                targets = targets.len(),
                "Nothing to filter"
            );
            return Ok(Vec::new());
        }

        let session = FacePlusPlusClient::open(&self.config)?;
        let result = self.filter_with_session(&session, photos, targets).await;
        drop(session);

        result
    }

    /// Same as [`filter_by_emotions`](Self::filter_by_emotions) over a
    /// caller-provided session.
    pub async fn filter_with_session(
        &self,
        session: &dyn FaceAnalyzer,
        photos: &[P],
        targets: &HashSet<Emotion>,
    ) -> FppResult<Vec<P>> {
        let span = info_span!(
            "filter_by_emotions",
            photos = photos.len(),
            targets = ?targets,
            concurrency = self.config.max_concurrency
        );

        self.run_filter(session, photos, targets).instrument(span).await
    }

    async fn run_filter(
        &self,
        session: &dyn FaceAnalyzer,
        photos: &[P],
        targets: &HashSet<Emotion>,
    ) -> FppResult<Vec<P>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        // `buffered` yields results in input order regardless of completion order.
        let mut resolved = pin!(stream::iter(photos)
            .map(|photo| async move { (photo, self.resolver.resolve(session, photo).await) })
            .buffered(self.config.max_concurrency.max(1)));

        let mut kept = Vec::new();
        let mut skipped = 0usize;

        while let Some((photo, outcome)) = resolved.next().await {
            let emotions = match outcome {
                Ok(emotions) => emotions,
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::AbortBatch => {
                        warn!(photo = %photo.origin_url(), error = %e, "Aborting emotion filter");
                        return Err(e);
                    }
                    FailurePolicy::SkipPhoto => {
                        warn!(photo = %photo.origin_url(), error = %e, "Skipping photo after classification failure");
                        skipped += 1;
                        record_filter_outcome(false);
                        continue;
                    }
                },
            };

            let matched = emotions.intersects(targets);
            record_filter_outcome(matched);
            debug!(
                photo = %photo.origin_url(),
                emotions = ?emotions.as_slice(),
                matched,
                "Photo classified"
            );

            if matched {
                kept.push(photo.clone());
            }
        }

        info!(
            total = photos.len(),
            kept = kept.len(),
            skipped,
            "Emotion filter completed"
        );

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use emofilter_models::PhotoInfo;

    use crate::error::FppError;
    use crate::types::DetectResponse;

    /// Responds per image URL; unknown URLs fail with a 500.
    struct ScriptedAnalyzer {
        responses: HashMap<String, &'static str>,
        delays: HashMap<String, u64>,
        calls: AtomicUsize,
    }

    impl ScriptedAnalyzer {
        fn new(responses: &[(&PhotoInfo, &'static str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(p, body)| (p.origin_url.clone(), *body))
                    .collect(),
                delays: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, photo: &PhotoInfo, millis: u64) -> Self {
            self.delays.insert(photo.origin_url.clone(), millis);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FaceAnalyzer for ScriptedAnalyzer {
        async fn detect(&self, image_url: &str) -> FppResult<DetectResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(millis) = self.delays.get(image_url) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            match self.responses.get(image_url) {
                Some(body) => Ok(serde_json::from_str(body)?),
                None => Err(FppError::from_http_status(500, "INTERNAL_ERROR")),
            }
        }
    }

    const HAPPY: &str = r#"{"faces": [{"attributes": {"emotion": {"happiness": 0.9, "anger": 0.1}}}]}"#;
    const ANGRY: &str = r#"{"faces": [{"attributes": {"emotion": {"happiness": 0.2, "anger": 0.8}}}]}"#;
    const NO_FACES: &str = r#"{"request_id": "r"}"#;
    const ALL_ZERO: &str = r#"{"faces": [{"attributes": {"emotion": {"sadness": 0, "neutral": 0}}}]}"#;

    fn photo(id: &str) -> PhotoInfo {
        PhotoInfo::new(id, format!("https://img.example/{}.jpg", id))
    }

    fn config() -> FacePlusPlusConfig {
        FacePlusPlusConfig::from_values(
            Some("key".into()),
            Some("secret".into()),
            Some("https://api.example/facepp/v3/detect".into()),
        )
        .unwrap()
    }

    fn targets(emotions: &[Emotion]) -> HashSet<Emotion> {
        emotions.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let (a, b) = (photo("a"), photo("b"));
        let session = ScriptedAnalyzer::new(&[(&a, HAPPY), (&b, NO_FACES)]);
        let service = EmotionFilterService::new(config());

        let kept = service
            .filter_with_session(&session, &[a.clone(), b], &targets(&[Emotion::Happiness]))
            .await
            .unwrap();

        assert_eq!(kept, vec![a]);
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let (p1, p2, p3) = (photo("1"), photo("2"), photo("3"));
        let session = ScriptedAnalyzer::new(&[(&p1, HAPPY), (&p2, ANGRY), (&p3, HAPPY)]);
        let service = EmotionFilterService::new(config());

        let kept = service
            .filter_with_session(
                &session,
                &[p1.clone(), p2, p3.clone()],
                &targets(&[Emotion::Happiness, Emotion::Surprise]),
            )
            .await
            .unwrap();

        assert_eq!(kept, vec![p1, p3]);
    }

    #[tokio::test]
    async fn test_empty_targets_yield_nothing() {
        let a = photo("a");
        let session = ScriptedAnalyzer::new(&[(&a, HAPPY)]);
        let service = EmotionFilterService::new(config());

        let kept = service
            .filter_with_session(&session, &[a], &HashSet::new())
            .await
            .unwrap();

        assert!(kept.is_empty());
        assert_eq!(session.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_zero_distribution_is_excluded() {
        let a = photo("a");
        let session = ScriptedAnalyzer::new(&[(&a, ALL_ZERO)]);
        let service = EmotionFilterService::new(config());

        let everything: HashSet<_> = Emotion::ALL.iter().copied().collect();
        let kept = service
            .filter_with_session(&session, &[a], &everything)
            .await
            .unwrap();

        assert!(kept.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_passes_hit_the_cache() {
        let a = photo("a");
        let session = ScriptedAnalyzer::new(&[(&a, HAPPY)]);
        let service = EmotionFilterService::new(config());
        let wanted = targets(&[Emotion::Happiness]);

        service.filter_with_session(&session, &[a.clone()], &wanted).await.unwrap();
        let kept = service
            .filter_with_session(&session, &[a.clone(), a.clone()], &wanted)
            .await
            .unwrap();

        // Duplicates in the input are kept; classification happens once.
        assert_eq!(kept, vec![a.clone(), a]);
        assert_eq!(session.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_aborts_batch_by_default() {
        let (a, broken, c) = (photo("a"), photo("broken"), photo("c"));
        let session = ScriptedAnalyzer::new(&[(&a, HAPPY), (&c, HAPPY)]);
        let service = EmotionFilterService::new(config());

        let result = service
            .filter_with_session(&session, &[a, broken, c], &targets(&[Emotion::Happiness]))
            .await;

        assert!(matches!(result, Err(FppError::RequestFailed { status: 500, .. })));
        // Photos after the failure are never classified.
        assert_eq!(session.calls(), 2);
    }

    #[tokio::test]
    async fn test_skip_policy_isolates_failures() {
        let (a, broken, c) = (photo("a"), photo("broken"), photo("c"));
        let session = ScriptedAnalyzer::new(&[(&a, HAPPY), (&c, HAPPY)]);
        let service = EmotionFilterService::new(
            config().with_failure_policy(FailurePolicy::SkipPhoto),
        );

        let kept = service
            .filter_with_session(
                &session,
                &[a.clone(), broken, c.clone()],
                &targets(&[Emotion::Happiness]),
            )
            .await
            .unwrap();

        assert_eq!(kept, vec![a, c]);
    }

    #[tokio::test]
    async fn test_concurrent_fan_out_preserves_order() {
        let (p1, p2, p3, p4) = (photo("1"), photo("2"), photo("3"), photo("4"));
        let session = ScriptedAnalyzer::new(&[
            (&p1, HAPPY),
            (&p2, ANGRY),
            (&p3, HAPPY),
            (&p4, ANGRY),
        ])
        .with_delay(&p1, 40)
        .with_delay(&p3, 5);
        let service = EmotionFilterService::new(config().with_max_concurrency(4));

        let kept = service
            .filter_with_session(
                &session,
                &[p1.clone(), p2.clone(), p3.clone(), p4.clone(), p1.clone()],
                &targets(&[Emotion::Happiness, Emotion::Anger]),
            )
            .await
            .unwrap();

        assert_eq!(kept, vec![p1.clone(), p2, p3, p4, p1]);
        assert_eq!(session.calls(), 4);
        assert_eq!(service.resolver().len().await, 4);
    }

    #[tokio::test]
    async fn test_empty_input_skips_session() {
        let service: EmotionFilterService<PhotoInfo> = EmotionFilterService::new(config());
        let kept = service
            .filter_by_emotions(&[], &targets(&[Emotion::Fear]))
            .await
            .unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_unavailable_without_config() {
        assert!(EmotionFilterService::<PhotoInfo>::from_config(None).is_none());
        assert!(EmotionFilterService::<PhotoInfo>::from_config(Some(config())).is_some());
    }
}
