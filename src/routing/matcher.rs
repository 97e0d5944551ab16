//! Path prefix matching.
//!
//! # Responsibilities
//! - Normalize configured prefixes (leading '/', no trailing '/')
//! - Match request paths on path-segment boundaries
//! - Strip a matched prefix from a path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api/a` matches `/api/a` and `/api/a/x`, never `/api/ab`
//! - No regex to guarantee O(n) matching

/// Matches the request path against a normalized prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Normalize and wrap a prefix.
    ///
    /// Returns `None` when the prefix does not start with '/' or is empty
    /// once trailing slashes are removed.
    pub fn new(prefix: &str) -> Option<Self> {
        if !prefix.starts_with('/') {
            return None;
        }
        let normalized = prefix.trim_end_matches('/');
        if normalized.is_empty() {
            return None;
        }
        Some(Self {
            prefix: normalized.to_string(),
        })
    }

    /// The normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True if `path == prefix` or `path` starts with `prefix + "/"`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Remove the prefix from a matching path. An empty remainder becomes "/".
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_prefix(self.prefix.as_str()) {
            Some("") | None => "/",
            Some(rest) => rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(PathPrefixMatcher::new("/api/a/").unwrap().prefix(), "/api/a");
        assert_eq!(PathPrefixMatcher::new("/api//").unwrap().prefix(), "/api");
        assert!(PathPrefixMatcher::new("api").is_none());
        assert!(PathPrefixMatcher::new("").is_none());
        assert!(PathPrefixMatcher::new("/").is_none());
    }

    #[test]
    fn test_segment_aligned_match() {
        let matcher = PathPrefixMatcher::new("/api/a").unwrap();
        assert!(matcher.matches("/api/a"));
        assert!(matcher.matches("/api/a/"));
        assert!(matcher.matches("/api/a/x/y"));
        assert!(!matcher.matches("/api/ab"));
        assert!(!matcher.matches("/api"));
        assert!(!matcher.matches("/API/a"));
    }

    #[test]
    fn test_strip() {
        let matcher = PathPrefixMatcher::new("/api/service1").unwrap();
        assert_eq!(matcher.strip("/api/service1/orders"), "/orders");
        assert_eq!(matcher.strip("/api/service1/"), "/");
        assert_eq!(matcher.strip("/api/service1"), "/");
    }
}
