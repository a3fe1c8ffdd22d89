use serde::{Deserialize, Serialize};
use url::Url;

use crate::TranscriptorError;

/// Length of a YouTube video identifier
const VIDEO_ID_LEN: usize = 11;

/// Which extraction rule the pipeline applies to incoming URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoIdMode {
    /// Take whatever follows the last `v=`, no validation
    #[default]
    Permissive,
    /// Require a well-formed watch or short URL with an 11-character id
    Strict,
}

impl VideoIdMode {
    pub fn extract(&self, url: &str) -> Result<String, TranscriptorError> {
        match self {
            VideoIdMode::Permissive => Ok(extract_video_id(url)),
            VideoIdMode::Strict => extract_video_id_strict(url),
        }
    }
}

impl std::fmt::Display for VideoIdMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoIdMode::Permissive => write!(f, "permissive"),
            VideoIdMode::Strict => write!(f, "strict"),
        }
    }
}

/// Pull the video identifier out of a URL.
///
/// Everything after the last `v=` and before the next `&`. Nothing is validated: a URL
/// without `v=` yields the whole input, and an empty or garbage id is left for the
/// transcript lookup to reject.
pub fn extract_video_id(url: &str) -> String {
    let after = url.rsplit("v=").next().unwrap_or(url);
    after.split('&').next().unwrap_or(after).to_string()
}

/// Validating variant of [`extract_video_id`].
///
/// Accepts `http(s)` watch URLs carrying a `v` query parameter and `youtu.be/<id>` short
/// links. The id must be 11 characters of `[A-Za-z0-9_-]`.
pub fn extract_video_id_strict(url: &str) -> Result<String, TranscriptorError> {
    let parsed = Url::parse(url.trim())
        .map_err(|_| TranscriptorError::InvalidVideoUrl(url.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TranscriptorError::InvalidVideoUrl(url.to_string()));
    }

    let candidate = match parsed.host_str() {
        Some("youtu.be") => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(|s| s.to_string()),
        Some(_) => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        None => None,
    };

    match candidate {
        Some(id) if is_valid_video_id(&id) => Ok(id),
        _ => Err(TranscriptorError::InvalidVideoUrl(url.to_string())),
    }
}

fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
