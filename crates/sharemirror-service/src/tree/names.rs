//! Name comparison between remote entries and persisted nodes.

/// How remote entry names are matched against node names.
///
/// Exact comparison is the default. Case-insensitive matching can be
/// switched on for servers that fold case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameMatcher {
    case_insensitive: bool,
}

impl NameMatcher {
    /// Creates a matcher.
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Lookup key for `name`.
    pub fn key(&self, name: &str) -> String {
        if self.case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Whether two names refer to the same entry.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_by_default() {
        let matcher = NameMatcher::default();
        assert!(matcher.matches("Scan.dcm", "Scan.dcm"));
        assert!(!matcher.matches("Scan.dcm", "scan.dcm"));
        assert_ne!(matcher.key("A"), matcher.key("a"));
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = NameMatcher::new(true);
        assert!(matcher.matches("Reports", "reports"));
        assert_eq!(matcher.key("Reports"), matcher.key("REPORTS"));
    }
}
