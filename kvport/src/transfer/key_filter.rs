use crate::errors::KvPortResult;
use regex::RegexSet;

/// Keys the backends generate themselves: session records and search-index
/// artifacts. They are rebuilt on the destination rather than copied.
pub const DEFAULT_EXCLUSION_PATTERNS: [&str; 3] = [
    "sess:.*",
    "nodebbpostsearch:.*",
    "nodebbtopicsearch:.*",
];

/// Pattern-based exclusion of keys that must not be ported.
///
/// A key is portable iff it matches none of the patterns. Patterns are not
/// anchored: `sess:.*` also excludes `app:sess:1`.
///
/// # Usage
/// ```text
/// let filter = KeyFilter::new(DEFAULT_EXCLUSION_PATTERNS)?;
/// assert!(!filter.is_portable("sess:abc"));
/// let keys = filter.filter_portable(all_keys);
/// ```
#[derive(Clone, Debug)]
pub struct KeyFilter {
    patterns: Vec<String>,
    set: RegexSet,
}

impl KeyFilter {
    /// Compiles the given patterns. An invalid pattern is a
    /// `ConfigurationError`.
    pub fn new<I, S>(patterns: I) -> KvPortResult<KeyFilter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        let set = RegexSet::new(&patterns)?;
        Ok(KeyFilter { patterns, set })
    }

    /// Filter with the reference exclusion set.
    pub fn reference() -> KvPortResult<KeyFilter> {
        KeyFilter::new(DEFAULT_EXCLUSION_PATTERNS)
    }

    /// Filter that lets every key through.
    pub fn allow_all() -> KeyFilter {
        KeyFilter {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[inline]
    pub fn is_portable(&self, key: &str) -> bool {
        !self.set.is_match(key)
    }

    /// Keeps the portable keys, in their original order.
    pub fn filter_portable(&self, keys: Vec<String>) -> Vec<String> {
        keys.into_iter().filter(|key| self.is_portable(key)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_reference_set_excludes_sessions_and_search() {
        let filter = KeyFilter::reference().unwrap();
        assert!(!filter.is_portable("sess:abc"));
        assert!(!filter.is_portable("nodebbpostsearch:12"));
        assert!(!filter.is_portable("nodebbtopicsearch:7"));
    }

    #[test]
    fn test_reference_set_keeps_regular_keys() {
        let filter = KeyFilter::reference().unwrap();
        assert!(filter.is_portable("cfg:title"));
        assert!(filter.is_portable("user:1"));
        assert!(filter.is_portable("session"));
        assert!(filter.is_portable("sess"));
    }

    #[test]
    fn test_patterns_are_unanchored() {
        let filter = KeyFilter::reference().unwrap();
        assert!(!filter.is_portable("app:sess:1"));
        assert!(!filter.is_portable("xsess:1"));
    }

    #[test]
    fn test_filter_portable_preserves_order() {
        let filter = KeyFilter::reference().unwrap();
        let result = filter.filter_portable(keys(&["b", "sess:1", "a", "nodebbpostsearch:2", "c"]));
        assert_eq!(result, keys(&["b", "a", "c"]));
    }

    #[test]
    fn test_filter_portable_empty_input() {
        let filter = KeyFilter::reference().unwrap();
        assert!(filter.filter_portable(Vec::new()).is_empty());
    }

    #[test]
    fn test_allow_all_keeps_everything() {
        let filter = KeyFilter::allow_all();
        assert!(filter.is_portable("sess:abc"));
        assert!(filter.patterns().is_empty());
    }

    #[test]
    fn test_custom_patterns() {
        let filter = KeyFilter::new(["^tmp:", "cache$"]).unwrap();
        assert!(!filter.is_portable("tmp:1"));
        assert!(filter.is_portable("x:tmp:1"));
        assert!(!filter.is_portable("page:cache"));
        assert_eq!(filter.patterns(), &["^tmp:".to_string(), "cache$".to_string()]);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = KeyFilter::new(["(unclosed"]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }
}
