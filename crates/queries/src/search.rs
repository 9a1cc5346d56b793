/// A case-insensitive free-text filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` for a missing or blank search, which matches everything.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let term = raw?.trim();
        if term.is_empty() {
            return None;
        }
        Some(Self(term.to_lowercase()))
    }

    /// Returns true if any field contains the term.
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        fields
            .iter()
            .any(|field| field.to_lowercase().contains(&self.0))
    }
}

/// Applies an optional search term.
pub(crate) fn matches(term: Option<&SearchTerm>, fields: &[&str]) -> bool {
    term.is_none_or(|term| term.matches_any(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_search_is_no_filter() {
        assert_eq!(SearchTerm::parse(None), None);
        assert_eq!(SearchTerm::parse(Some("   ")), None);
        assert!(matches(None, &["anything"]));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let term = SearchTerm::parse(Some(" ORD-2024 ")).unwrap();
        assert!(term.matches_any(&["ord-20240131-000001"]));
        assert!(term.matches_any(&["nope", "xx ord-2024 xx"]));
        assert!(!term.matches_any(&["ORD-2023"]));
    }
}
