//! In-memory transcript cache with lazy expiry.
//!
//! Entries live until a lookup finds them older than the TTL, or until an explicit
//! [`TranscriptCache::purge_expired`] sweep. There is no capacity bound.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Default lifetime of a cached transcript
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct CacheEntry {
    lines: Vec<String>,
    inserted_at: DateTime<Utc>,
}

/// Video id to transcript lines
#[derive(Debug)]
pub struct TranscriptCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached lines for `video_id`, or `None` if absent or expired. Expired entries are removed.
    pub fn get(&self, video_id: &str) -> Option<Vec<String>> {
        let now = Utc::now();
        let mut entries = self.entries.lock();

        let entry = entries.get(video_id)?;
        if now - entry.inserted_at < self.ttl {
            return Some(entry.lines.clone());
        }

        entries.remove(video_id);
        tracing::debug!("Cache entry for {} expired", video_id);
        None
    }

    /// Store or overwrite the lines for `video_id`, stamped with the current time
    pub fn put(&self, video_id: &str, lines: Vec<String>) {
        self.insert_at(video_id, lines, Utc::now());
    }

    pub(crate) fn insert_at(&self, video_id: &str, lines: Vec<String>, inserted_at: DateTime<Utc>) {
        self.entries
            .lock()
            .insert(video_id.to_string(), CacheEntry { lines, inserted_at });
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.inserted_at < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for TranscriptCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_put_then_get() {
        let cache = TranscriptCache::new();
        cache.put("abc", lines(&["1. a", "2. b"]));

        assert_eq!(cache.get("abc"), Some(lines(&["1. a", "2. b"])));
        assert_eq!(cache.get("other"), None);
        assert_eq!(cache.ttl(), Duration::hours(24));
    }

    #[test]
    fn test_put_overwrites() {
        let cache = TranscriptCache::new();
        cache.put("abc", lines(&["1. old"]));
        cache.put("abc", lines(&["1. new"]));

        assert_eq!(cache.get("abc"), Some(lines(&["1. new"])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_removed_on_get() {
        let cache = TranscriptCache::new();
        let stale = Utc::now() - Duration::hours(24) - Duration::seconds(1);
        cache.insert_at("abc", lines(&["1. a"]), stale);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get("abc"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_just_inside_window_is_served() {
        let cache = TranscriptCache::new();
        let recent = Utc::now() - Duration::hours(23);
        cache.insert_at("abc", lines(&["1. a"]), recent);

        assert_eq!(cache.get("abc"), Some(lines(&["1. a"])));
    }

    #[test]
    fn test_purge_expired() {
        let cache = TranscriptCache::with_ttl(Duration::minutes(10));
        cache.insert_at("old", lines(&["1. x"]), Utc::now() - Duration::minutes(11));
        cache.put("fresh", lines(&["1. y"]));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(TranscriptCache::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("video-{}", i % 10);
                        cache.put(&id, vec![format!("1. writer {}", n)]);
                        assert!(cache.get(&id).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
