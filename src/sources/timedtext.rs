use async_trait::async_trait;
use std::time::Duration;

use super::{FallbackSource, TranscriptSegment};
use crate::SourceError;

/// Fallback source reading the raw timed-text XML endpoint
pub struct TimedTextSource {
    client: reqwest::Client,
    base_url: String,
    lang: String,
}

impl TimedTextSource {
    pub fn new(base_url: &str, lang: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::UpstreamUnavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('?').to_string(),
            lang: lang.to_string(),
        })
    }

    fn request_url(&self, video_id: &str) -> String {
        format!(
            "{}?lang={}&v={}",
            self.base_url,
            urlencoding::encode(&self.lang),
            urlencoding::encode(video_id)
        )
    }
}

#[async_trait]
impl FallbackSource for TimedTextSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, SourceError> {
        let url = self.request_url(video_id);
        tracing::debug!("Fetching timed-text XML: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::UpstreamUnavailable(format!("timed-text request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(SourceError::UpstreamUnavailable(format!(
                "timed-text returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::UpstreamUnavailable(format!("timed-text body unreadable: {}", e)))?;

        let body = body.trim();
        if body.is_empty() {
            return Err(SourceError::UpstreamUnavailable(
                "caption unavailable or blocked".to_string(),
            ));
        }

        parse_timed_text(body)
    }
}

/// Parse a timed-text document into segments.
///
/// Only direct `text` children of the root element are read, in document order. An
/// element contributes a segment when its leading text content is present and non-empty.
/// A document type declaration is tolerated.
pub fn parse_timed_text(xml: &str) -> Result<Vec<TranscriptSegment>, SourceError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| SourceError::UpstreamUnavailable(format!("malformed timed-text XML: {}", e)))?;

    let segments = doc
        .root_element()
        .children()
        .filter(|node| node.has_tag_name("text"))
        .filter_map(|node| {
            let text = leading_text(node);
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: node.attribute("start").and_then(|s| s.parse().ok()),
                duration: node.attribute("dur").and_then(|s| s.parse().ok()),
            })
        })
        .collect();

    Ok(segments)
}

/// Text of `node` up to its first child element, with comments and processing
/// instructions left out
fn leading_text(node: roxmltree::Node<'_, '_>) -> String {
    node.children()
        .take_while(|child| !child.is_element())
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}
