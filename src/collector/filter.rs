//! Allow/deny filtering of counter names.
//!
//! At most one pattern may be active; supplying both is a configuration
//! error caught at startup, so the filter itself never sees that state.
//! Matching is anchored at the start of the name (not full-string), the
//! conventional "match" semantics.

use regex::Regex;

/// Compiles `pattern` anchored at the start of the subject.
///
/// `rx` matches `rx_packets` but not `tx_rx_mixed`; `rx$` matches
/// neither. Used for both counter-name and interface-name patterns.
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})", pattern))
}

/// Error constructing a [`StatFilter`].
#[derive(Debug)]
pub enum FilterError {
    /// Allow and deny patterns are mutually exclusive.
    BothPatterns,
    /// One of the patterns failed to compile.
    Pattern(regex::Error),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::BothPatterns => {
                write!(f, "whitelist and blacklist patterns are mutually exclusive")
            }
            FilterError::Pattern(e) => write!(f, "invalid pattern: {}", e),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<regex::Error> for FilterError {
    fn from(e: regex::Error) -> Self {
        FilterError::Pattern(e)
    }
}

/// Counter-name inclusion policy. A pure function of name and config.
#[derive(Debug, Clone, Default)]
pub enum StatFilter {
    /// Include only names matching the pattern.
    Allow(Regex),
    /// Include only names NOT matching the pattern.
    Deny(Regex),
    /// Include everything.
    #[default]
    None,
}

impl StatFilter {
    /// Builds a filter from optional allow/deny patterns.
    ///
    /// Exactly one may be set; both set is [`FilterError::BothPatterns`].
    pub fn from_patterns(
        allow: Option<&str>,
        deny: Option<&str>,
    ) -> Result<Self, FilterError> {
        match (allow, deny) {
            (Some(_), Some(_)) => Err(FilterError::BothPatterns),
            (Some(pattern), None) => Ok(StatFilter::Allow(anchored(pattern)?)),
            (None, Some(pattern)) => Ok(StatFilter::Deny(anchored(pattern)?)),
            (None, None) => Ok(StatFilter::None),
        }
    }

    /// Whether a counter with this name should be included.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            StatFilter::Allow(re) => re.is_match(name),
            StatFilter::Deny(re) => !re.is_match(name),
            StatFilter::None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_includes_everything() {
        let filter = StatFilter::from_patterns(None, None).unwrap();
        assert!(filter.includes("rx_packets"));
        assert!(filter.includes("anything_at_all"));
    }

    #[test]
    fn test_allow_pattern() {
        let filter = StatFilter::from_patterns(Some("rx_"), None).unwrap();
        assert!(filter.includes("rx_packets"));
        assert!(filter.includes("rx_errors"));
        assert!(!filter.includes("tx_packets"));
    }

    #[test]
    fn test_deny_pattern() {
        let filter = StatFilter::from_patterns(None, Some("^rx_errors$")).unwrap();
        assert!(!filter.includes("rx_errors"));
        assert!(filter.includes("rx_packets"));
    }

    #[test]
    fn test_match_is_anchored_at_start_not_full_string() {
        // "rx" must match the prefix of "rx_packets" but not an interior "rx".
        let filter = StatFilter::from_patterns(Some("rx"), None).unwrap();
        assert!(filter.includes("rx_packets"));
        assert!(!filter.includes("tx_rx_mixed"));
    }

    #[test]
    fn test_both_patterns_rejected() {
        let err = StatFilter::from_patterns(Some("a"), Some("b")).unwrap_err();
        assert!(matches!(err, FilterError::BothPatterns));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = StatFilter::from_patterns(Some("("), None).unwrap_err();
        assert!(matches!(err, FilterError::Pattern(_)));
    }

    #[test]
    fn test_decision_is_idempotent() {
        let filter = StatFilter::from_patterns(None, Some("rx_")).unwrap();
        let first = filter.includes("rx_dropped");
        let second = filter.includes("rx_dropped");
        assert_eq!(first, second);
        assert!(!first);
    }
}
