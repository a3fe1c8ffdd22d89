use anyhow::Context;
use std::time::Duration;

use crate::config::Config;
use crate::extractors::VideoIdMode;
use crate::output::format_lines;
use crate::sources::{
    FallbackSource, PrimarySource, TimedTextSource, TranscriptSegment, YoutubeTranscriptSource,
};
use crate::{Result, TranscriptError, TranscriptorError};

pub mod cache;

use cache::TranscriptCache;

/// Language preference sent to the primary source
pub const DEFAULT_LANGUAGES: [&str; 3] = ["pt", "pt-BR", "en"];

/// Main transcript acquisition pipeline
pub struct TranscriptPipeline {
    primary: Box<dyn PrimarySource>,
    fallback: Box<dyn FallbackSource>,
    cache: TranscriptCache,
    languages: Vec<String>,
    id_mode: VideoIdMode,
}

impl TranscriptPipeline {
    pub fn new(
        primary: Box<dyn PrimarySource>,
        fallback: Box<dyn FallbackSource>,
        cache: TranscriptCache,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            id_mode: VideoIdMode::default(),
        }
    }

    /// Build the pipeline with the YouTube transcript API and the timed-text fallback
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = &config.transcript;
        let ttl = config.cache_ttl().ok_or_else(|| {
            TranscriptorError::InvalidConfig(format!(
                "cache.ttl_hours {} is out of range",
                config.cache.ttl_hours
            ))
        })?;

        let primary = YoutubeTranscriptSource::new(
            settings.preserve_formatting,
            Duration::from_secs(settings.primary_timeout_secs),
        )
        .context("Failed to create primary transcript source")?;

        let fallback = TimedTextSource::new(
            &settings.fallback_url,
            &settings.fallback_lang,
            Duration::from_secs(settings.fallback_timeout_secs),
        )
        .context("Failed to create timed-text source")?;

        let cache = TranscriptCache::with_ttl(ttl);

        Ok(Self::new(Box::new(primary), Box::new(fallback), cache)
            .with_languages(settings.languages.clone())
            .with_id_mode(settings.video_id_mode))
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_id_mode(mut self, id_mode: VideoIdMode) -> Self {
        self.id_mode = id_mode;
        self
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    /// Produce numbered transcript lines for a video URL.
    ///
    /// Callers only ever see [`TranscriptError::MissingInput`] or
    /// [`TranscriptError::AcquisitionFailed`]; the technical cause is logged here.
    pub async fn handle(&self, video_url: Option<&str>) -> std::result::Result<Vec<String>, TranscriptError> {
        let video_url = video_url.ok_or(TranscriptError::MissingInput)?;

        self.acquire(video_url).await.map_err(|e| {
            tracing::error!("Failed to process request: {:#}", e);
            TranscriptError::AcquisitionFailed
        })
    }

    async fn acquire(&self, video_url: &str) -> Result<Vec<String>> {
        let video_id = self.id_mode.extract(video_url)?;

        // An empty cached transcript does not count as a hit
        if let Some(lines) = self.cache.get(&video_id).filter(|lines| !lines.is_empty()) {
            tracing::info!("Serving transcript for {} from cache", video_id);
            return Ok(lines);
        }

        let segments = match self.primary.fetch(&video_id, &self.languages).await {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!("Primary source failed for video {}: {}", video_id, e);
                self.fallback
                    .fetch(&video_id)
                    .await
                    .with_context(|| format!("Fallback source failed for video {}", video_id))?
            }
        };

        Ok(self.store(&video_id, &segments))
    }

    fn store(&self, video_id: &str, segments: &[TranscriptSegment]) -> Vec<String> {
        let lines = format_lines(segments);
        tracing::info!(
            "Acquired {} transcript lines for {} ({} segments)",
            lines.len(),
            video_id,
            segments.len()
        );
        self.cache.put(video_id, lines.clone());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockFallbackSource, MockPrimarySource};
    use crate::{SourceError, ACQUISITION_FAILED_MESSAGE, MISSING_INPUT_MESSAGE};

    const VIDEO_URL: &str = "https://www.youtube.com/watch?v=jNQXAC9IVRw";

    fn segments(texts: &[&str]) -> Vec<TranscriptSegment> {
        texts.iter().map(|t| TranscriptSegment::new(*t)).collect()
    }

    fn unavailable() -> SourceError {
        SourceError::UpstreamUnavailable("no captions".to_string())
    }

    fn pipeline(primary: MockPrimarySource, fallback: MockFallbackSource) -> TranscriptPipeline {
        TranscriptPipeline::new(Box::new(primary), Box::new(fallback), TranscriptCache::new())
    }

    #[tokio::test]
    async fn test_missing_input() {
        let pipeline = pipeline(MockPrimarySource::new(), MockFallbackSource::new());

        let err = pipeline.handle(None).await.unwrap_err();
        assert_eq!(err, TranscriptError::MissingInput);
        assert_eq!(err.to_string(), MISSING_INPUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_primary_success_is_shaped_and_cached() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .withf(|id, languages| {
                id == "jNQXAC9IVRw" && languages.to_vec() == vec!["pt", "pt-BR", "en"]
            })
            .times(1)
            .returning(|_, _| Ok(segments(&["", "a", "  ", "b"])));
        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline = pipeline(primary, fallback);
        let lines = pipeline.handle(Some(VIDEO_URL)).await.unwrap();

        assert_eq!(lines, vec!["1. a", "2. b"]);
        assert_eq!(pipeline.cache().get("jNQXAC9IVRw"), Some(lines));
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_fails() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(unavailable()));
        let mut fallback = MockFallbackSource::new();
        fallback
            .expect_fetch()
            .withf(|id| id == "jNQXAC9IVRw")
            .times(1)
            .returning(|_| Ok(segments(&["hello", "", "world"])));

        let pipeline = pipeline(primary, fallback);
        let lines = pipeline.handle(Some(VIDEO_URL)).await.unwrap();

        assert_eq!(lines, vec!["1. hello", "2. world"]);
        assert_eq!(pipeline.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_both_sources_failing() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Err(unavailable()));
        let mut fallback = MockFallbackSource::new();
        fallback
            .expect_fetch()
            .times(1)
            .returning(|_| Err(SourceError::UpstreamUnavailable("HTTP 404".to_string())));

        let pipeline = pipeline(primary, fallback);
        let err = pipeline.handle(Some(VIDEO_URL)).await.unwrap_err();

        assert_eq!(err, TranscriptError::AcquisitionFailed);
        assert_eq!(err.to_string(), ACQUISITION_FAILED_MESSAGE);
        assert!(pipeline.cache().is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_sources() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .times(1)
            .returning(|_, _| Ok(segments(&["a", "b"])));
        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline = pipeline(primary, fallback);
        let first = pipeline.handle(Some(VIDEO_URL)).await.unwrap();
        let second = pipeline
            .handle(Some("https://www.youtube.com/watch?v=jNQXAC9IVRw&t=10s"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_cached_result_is_refetched() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(segments(&[" "])));
        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline = pipeline(primary, fallback);
        assert!(pipeline.handle(Some(VIDEO_URL)).await.unwrap().is_empty());
        assert!(pipeline.handle(Some(VIDEO_URL)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_before_fetching() {
        let mut primary = MockPrimarySource::new();
        primary.expect_fetch().never();
        let mut fallback = MockFallbackSource::new();
        fallback.expect_fetch().never();

        let pipeline = pipeline(primary, fallback).with_id_mode(VideoIdMode::Strict);
        let err = pipeline
            .handle(Some("https://www.youtube.com/watch?v=invalid"))
            .await
            .unwrap_err();

        assert_eq!(err, TranscriptError::AcquisitionFailed);
    }

    #[test]
    fn test_from_config_rejects_oversized_ttl() {
        let mut config = Config::default();
        config.cache.ttl_hours = i64::MAX;

        let err = TranscriptPipeline::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("cache.ttl_hours"));
    }

    #[tokio::test]
    async fn test_custom_language_preference() {
        let mut primary = MockPrimarySource::new();
        primary
            .expect_fetch()
            .withf(|_, languages| languages.to_vec() == vec!["en"])
            .times(1)
            .returning(|_, _| Ok(segments(&["hi"])));

        let pipeline = pipeline(primary, MockFallbackSource::new())
            .with_languages(vec!["en".to_string()]);

        assert_eq!(pipeline.handle(Some(VIDEO_URL)).await.unwrap(), vec!["1. hi"]);
    }
}
