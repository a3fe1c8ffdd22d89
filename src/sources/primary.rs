use async_trait::async_trait;
use std::time::Duration;
use yt_transcript_rs::api::YouTubeTranscriptApi;

use super::{PrimarySource, TranscriptSegment};
use crate::SourceError;

/// Primary source backed by the YouTube transcript API client
pub struct YoutubeTranscriptSource {
    api: YouTubeTranscriptApi,
    preserve_formatting: bool,
    timeout: Duration,
}

impl YoutubeTranscriptSource {
    pub fn new(preserve_formatting: bool, timeout: Duration) -> Result<Self, SourceError> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            SourceError::UpstreamUnavailable(format!("Failed to initialise transcript API: {}", e))
        })?;

        Ok(Self {
            api,
            preserve_formatting,
            timeout,
        })
    }
}

#[async_trait]
impl PrimarySource for YoutubeTranscriptSource {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, SourceError> {
        let languages: Vec<&str> = languages.iter().map(String::as_str).collect();

        tracing::debug!(
            "Requesting transcript for {} (languages: {:?})",
            video_id,
            languages
        );

        let request = self
            .api
            .fetch_transcript(video_id, &languages, self.preserve_formatting);

        // Every failure mode collapses into one kind: the caller only needs to know to fall back
        let transcript = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                SourceError::UpstreamUnavailable(format!(
                    "transcript API timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| SourceError::UpstreamUnavailable(e.to_string()))?;

        Ok(transcript
            .snippets
            .into_iter()
            .map(|snippet| TranscriptSegment {
                text: snippet.text,
                start: Some(snippet.start),
                duration: Some(snippet.duration),
            })
            .collect())
    }
}
