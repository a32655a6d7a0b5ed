use lazy_static::lazy_static;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref STOPWORDS: HashSet<&'static str> = include_str!("english-stopwords.txt")
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect();
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Normalizes free text into the keyword tokens used for indexing and scoring.
///
/// A keyword is a whitespace-separated token, NFKC-normalized and lowercased
/// (via `str::to_lowercase`), with every non-alphanumeric character stripped
/// when punctuation filtering is on, that is longer than 3 characters and not
/// an English stop word. Order and duplicates are preserved; callers that need
/// a set collect into one themselves.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    filter_punctuation: bool,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self { filter_punctuation: true }
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_punctuation_filter() -> Self {
        Self { filter_punctuation: false }
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut keywords = Vec::new();
        for token in normalized.split_whitespace() {
            let word = if self.filter_punctuation {
                token.chars().filter(|c| c.is_alphanumeric()).collect()
            } else {
                token.to_string()
            };
            if word.chars().count() > 3 && !is_stopword(&word) {
                keywords.push(word);
            }
        }
        keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_short_tokens() {
        let ex = KeywordExtractor::new();
        let words = ex.extract("Blood-cancer, a.k.a. leukemia!");
        assert_eq!(words, vec!["bloodcancer", "leukemia"]);
    }

    #[test]
    fn keeps_input_order_and_duplicates() {
        let ex = KeywordExtractor::new();
        let words = ex.extract("cancer research cancer");
        assert_eq!(words, vec!["cancer", "research", "cancer"]);
    }
}
