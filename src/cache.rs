use std::time::{Duration, Instant};

use dashmap::DashMap;

const LISTING_CACHE_EXPIRATION: Duration = Duration::from_secs(5 * 60);

/// An `(id, label)` pair remembered from a listing, used for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    pub id: String,
    pub label: String,
}

impl CachedItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

struct CacheEntry {
    items: Vec<CachedItem>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(items: Vec<CachedItem>, ttl: Duration) -> Self {
        Self {
            items,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Listings fetched once and filtered locally by the completer.
///
/// Keys are folder uuids, or `@agents`/`@actions`/`@extensions` for the
/// server-side feature lists.
pub struct ListingCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingCache {
    pub fn new() -> Self {
        Self::with_ttl(LISTING_CACHE_EXPIRATION)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<CachedItem>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
            return Some(entry.items.clone());
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, items: Vec<CachedItem>) {
        self.entries
            .insert(key.into(), CacheEntry::new(items, self.ttl));
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Items under `key` whose id or label starts with `partial` (labels
    /// compared case-insensitively).
    pub fn matching(&self, key: &str, partial: &str) -> Vec<CachedItem> {
        let lowered = partial.to_lowercase();
        self.get(key)
            .unwrap_or_default()
            .into_iter()
            .filter(|item| {
                item.id.starts_with(partial) || item.label.to_lowercase().starts_with(&lowered)
            })
            .collect()
    }
}
