use crate::sources::TranscriptSegment;

/// Turn segments into numbered lines.
///
/// Segments whose text is empty or whitespace-only are dropped; survivors are numbered
/// from 1 in order, so the index counts retained lines. The text itself is kept verbatim.
pub fn format_lines(segments: &[TranscriptSegment]) -> Vec<String> {
    segments
        .iter()
        .filter(|segment| !segment.text.trim().is_empty())
        .enumerate()
        .map(|(i, segment)| format!("{}. {}", i + 1, segment.text))
        .collect()
}
