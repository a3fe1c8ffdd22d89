use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod primary;
pub mod timedtext;

pub use primary::YoutubeTranscriptSource;
pub use timedtext::{parse_timed_text, TimedTextSource};

use crate::SourceError;

/// One captioned utterance, in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text exactly as delivered
    pub text: String,

    /// Start time in seconds, if the source reports it
    pub start: Option<f64>,

    /// Duration in seconds, if the source reports it
    pub duration: Option<f64>,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            duration: None,
        }
    }
}

/// Structured transcript retrieval, tried first
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrimarySource: Send + Sync {
    /// Fetch the transcript in the first available language from `languages`
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, SourceError>;
}

/// Raw timed-text retrieval, tried when the primary source fails
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallbackSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, SourceError>;
}
