use regex::Regex;

/// Compiled whole-word matchers for the tracked-term watchlist. Terms are
/// matched case-insensitively against extracted document text; multi-word
/// terms match as a literal phrase.
pub struct TermMatcher {
    compiled: Vec<(i32, String, Regex)>,
}

impl TermMatcher {
    pub fn compile(terms: &[(i32, String)]) -> Self {
        let compiled = terms
            .iter()
            .filter_map(|(id, term)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
                match Regex::new(&pattern) {
                    Ok(re) => Some((*id, term.clone(), re)),
                    Err(e) => {
                        tracing::warn!(term, error = %e, "skipping unmatchable term");
                        None
                    }
                }
            })
            .collect();
        Self { compiled }
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Term ids that occur in `text`, each at most once.
    pub fn matches(&self, text: &str) -> Vec<i32> {
        self.compiled
            .iter()
            .filter(|(_, _, re)| re.is_match(text))
            .map(|(id, _, _)| *id)
            .collect()
    }

    pub fn term_for(&self, id: i32) -> Option<&str> {
        self.compiled
            .iter()
            .find(|(tid, _, _)| *tid == id)
            .map(|(_, term, _)| term.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TermMatcher {
        TermMatcher::compile(&[
            (1, "zoning".to_string()),
            (2, "short-term rental".to_string()),
            (3, "I-35".to_string()),
        ])
    }

    #[test]
    fn whole_word_only() {
        let m = matcher();
        assert_eq!(m.matches("A rezoning case was heard."), Vec::<i32>::new());
        assert_eq!(m.matches("The zoning map changes."), vec![1]);
    }

    #[test]
    fn case_insensitive_phrases() {
        let m = matcher();
        assert_eq!(m.matches("Regulating Short-Term Rental operators."), vec![2]);
    }

    #[test]
    fn punctuation_in_terms_is_literal() {
        let m = matcher();
        assert_eq!(m.matches("Expansion of I-35 through downtown."), vec![3]);
        assert!(m.matches("Expansion of I235 through downtown.").is_empty());
    }

    #[test]
    fn each_term_reported_once() {
        let m = matcher();
        assert_eq!(m.matches("zoning, zoning, and more zoning"), vec![1]);
    }

    #[test]
    fn term_lookup() {
        let m = matcher();
        assert_eq!(m.term_for(2), Some("short-term rental"));
        assert_eq!(m.term_for(99), None);
    }
}
