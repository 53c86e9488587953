//! Keyword table filters: brand exclusion and free-text search.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandFilter {
    terms: Vec<String>,
}

impl BrandFilter {
    /// Parse a comma-separated term list such as `"Acme, acme shop"`.
    pub fn parse(raw: &str) -> Self {
        let terms = raw
            .split(',')
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Case-insensitive substring match against any brand term.
    pub fn is_brand(&self, text: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.terms.iter().any(|term| text.contains(term.as_str()))
    }

    /// Keep only rows whose text is not a brand query.
    pub fn exclude<T, F>(&self, items: Vec<T>, text_fn: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        if self.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| !self.is_brand(text_fn(item)))
            .collect()
    }
}

/// Case-insensitive substring search; an empty query matches everything.
pub fn matches_search(text: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalises_terms() {
        let filter = BrandFilter::parse(" Acme , ,ACME Shop,");
        assert_eq!(filter.terms, vec!["acme".to_string(), "acme shop".to_string()]);
    }

    #[test]
    fn brand_match_is_case_insensitive_substring() {
        let filter = BrandFilter::parse("acme");
        assert!(filter.is_brand("Acme Schuhe kaufen"));
        assert!(filter.is_brand("bestacmedeals"));
        assert!(!filter.is_brand("schuhe kaufen"));
    }

    #[test]
    fn empty_filter_excludes_nothing() {
        let filter = BrandFilter::parse("  ");
        assert!(filter.is_empty());
        assert!(!filter.is_brand("anything"));
        let kept = filter.exclude(vec!["a", "b"], |s| *s);
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn exclude_drops_brand_rows() {
        let filter = BrandFilter::parse("acme,ac-me");
        let kept = filter.exclude(
            vec!["acme login", "running shoes", "AC-ME outlet", "trail shoes"],
            |s| *s,
        );
        assert_eq!(kept, vec!["running shoes", "trail shoes"]);
    }

    #[test]
    fn search_matches_substrings() {
        assert!(matches_search("Running Shoes", "shoe"));
        assert!(matches_search("anything", ""));
        assert!(!matches_search("boots", "shoe"));
    }
}
