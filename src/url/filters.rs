//! Site filters: process-wide URL exclusion rules
//!
//! A filter entry is a URL/domain fragment. Any candidate URL containing an
//! active fragment is excluded from recording entirely. Filters are shared
//! by all jobs and mutable at any time; they apply to future registrations
//! only. The set is an explicit value passed to the registry, not ambient
//! global state, so tests can run with isolated filter sets.

use std::sync::RwLock;

/// A mutable, shared set of URL exclusion fragments
#[derive(Debug, Default)]
pub struct SiteFilterSet {
    entries: RwLock<Vec<String>>,
}

impl SiteFilterSet {
    /// Creates an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter set seeded with the given fragments
    pub fn from_entries(entries: Vec<String>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Adds a filter fragment; duplicates are ignored
    pub fn add(&self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        let mut entries = self.entries.write().unwrap();
        if !entries.iter().any(|e| e == fragment) {
            entries.push(fragment.to_string());
        }
    }

    /// Removes a filter fragment; returns true if it was present
    pub fn remove(&self, fragment: &str) -> bool {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|e| e != fragment);
        entries.len() != before
    }

    /// Returns a snapshot of all active filter fragments
    pub fn list(&self) -> Vec<String> {
        self.entries.read().unwrap().clone()
    }

    /// Returns true if the given (normalized) URL matches any active filter
    pub fn matches(&self, url: &str) -> bool {
        self.entries
            .read()
            .unwrap()
            .iter()
            .any(|fragment| url.contains(fragment.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_matches_nothing() {
        let filters = SiteFilterSet::new();
        assert!(!filters.matches("https://ads.example.com/track"));
    }

    #[test]
    fn test_substring_match() {
        let filters = SiteFilterSet::from_entries(vec!["ads.example.com".to_string()]);
        assert!(filters.matches("https://ads.example.com/track"));
        assert!(filters.matches("https://ads.example.com"));
        assert!(!filters.matches("https://example.com/ads"));
    }

    #[test]
    fn test_add_and_remove() {
        let filters = SiteFilterSet::new();
        filters.add("tracker.io");
        assert!(filters.matches("https://tracker.io/p"));

        assert!(filters.remove("tracker.io"));
        assert!(!filters.matches("https://tracker.io/p"));
        assert!(!filters.remove("tracker.io"));
    }

    #[test]
    fn test_add_ignores_duplicates_and_blank() {
        let filters = SiteFilterSet::new();
        filters.add("spam.net");
        filters.add("spam.net");
        filters.add("   ");
        assert_eq!(filters.list(), vec!["spam.net".to_string()]);
    }

    #[test]
    fn test_list_snapshot() {
        let filters = SiteFilterSet::from_entries(vec!["a.com".into(), "b.com".into()]);
        let listed = filters.list();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&"a.com".to_string()));
    }
}
