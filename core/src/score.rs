use crate::keywords::KeywordExtractor;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A metadata document as returned by the external document search. Identity
/// is the URI; title and description are only re-tokenized to count terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub uri: String,
    pub title: String,
    pub description: String,
}

/// The external document-search collaborator. Implementations run the actual
/// store queries (triple store, in-memory corpus, ...); the scorer only needs
/// exact-word matching and the corpus size.
pub trait DocumentSearch: Sync {
    /// Every document whose indexed content contains the exact word.
    fn find_by_word(&self, word: &str) -> Result<Vec<Document>>;

    /// Total number of documents in the corpus, used for IDF.
    fn count_total_documents(&self) -> Result<usize>;
}

/// Accumulated per-document scores, keyed by URI. Remembers the order in
/// which documents were first inserted so that ranking ties stay stable.
#[derive(Debug, Default)]
pub struct ScoreMap {
    entries: Vec<(Document, f64)>,
    by_uri: HashMap<String, usize>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the document's running score, starting at 0 for
    /// documents seen for the first time.
    pub fn add(&mut self, document: Document, delta: f64) {
        match self.by_uri.get(&document.uri) {
            Some(&i) => self.entries[i].1 += delta,
            None => {
                self.by_uri.insert(document.uri.clone(), self.entries.len());
                self.entries.push((document, delta));
            }
        }
    }

    pub fn score(&self, uri: &str) -> Option<f64> {
        self.by_uri.get(uri).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(Document, f64)> {
        self.entries
    }
}

/// Searches the corpus for every word and scores each matched document by
/// TF-IDF, added up across words.
///
/// The per-word store lookups fan out across scoped threads, one per word;
/// accumulation happens afterwards in sorted word order, so scores and
/// insertion order are reproducible regardless of thread timing. Any lookup
/// failure fails the whole call; a partial score map is never returned.
pub fn score_words<S: DocumentSearch + ?Sized>(
    extractor: &KeywordExtractor,
    search: &S,
    words: &HashSet<String>,
) -> Result<ScoreMap> {
    let mut sorted: Vec<&str> = words.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    // Fixed once per invocation so IDF values are consistent across words.
    let total = search.count_total_documents()?;

    let matches: Vec<Result<Vec<Document>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = sorted
            .iter()
            .map(|word| scope.spawn(move || search.find_by_word(word)))
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("document lookup panicked")),
            })
            .collect()
    });

    let mut scores = ScoreMap::new();
    // Token lists per URI, computed at most once per invocation.
    let mut tokens_by_uri: HashMap<String, Vec<String>> = HashMap::new();

    for (word, results) in sorted.iter().zip(matches) {
        let results = results?;
        if results.is_empty() {
            continue;
        }
        tracing::debug!(word, matches = results.len(), "scoring word");

        let idf = ((total as f64) / (results.len() as f64)).ln();

        for document in results {
            let tokens = tokens_by_uri
                .entry(document.uri.clone())
                .or_insert_with(|| {
                    extractor.extract(&format!("{} {}", document.title, document.description))
                });
            let word_count = tokens.len();
            if word_count == 0 {
                // All-stop-word document: term frequency is undefined, so it
                // contributes nothing rather than dividing by zero.
                scores.add(document, 0.0);
                continue;
            }
            let occurrences = tokens.iter().filter(|t| t.as_str() == *word).count();
            let tf = (occurrences as f64) / (word_count as f64);
            scores.add(document, tf * idf);
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct FixedCorpus {
        total: usize,
        by_word: HashMap<String, Vec<Document>>,
    }

    impl DocumentSearch for FixedCorpus {
        fn find_by_word(&self, word: &str) -> Result<Vec<Document>> {
            Ok(self.by_word.get(word).cloned().unwrap_or_default())
        }

        fn count_total_documents(&self) -> Result<usize> {
            Ok(self.total)
        }
    }

    struct FailingCorpus;

    impl DocumentSearch for FailingCorpus {
        fn find_by_word(&self, _word: &str) -> Result<Vec<Document>> {
            bail!("store unavailable")
        }

        fn count_total_documents(&self) -> Result<usize> {
            Ok(1)
        }
    }

    fn doc(uri: &str, title: &str, description: &str) -> Document {
        Document {
            uri: uri.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    // A document whose title+description tokenize to exactly 20 keywords,
    // one of which is "cancer".
    fn twenty_keyword_doc(uri: &str) -> Document {
        let filler = (0..19)
            .map(|i| format!("filler{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        doc(uri, "cancer", &filler)
    }

    #[test]
    fn tf_idf_matches_hand_computation() {
        // 10 documents total, "cancer" matches 2, each with tf = 1/20.
        let by_word = HashMap::from([(
            "cancer".to_string(),
            vec![twenty_keyword_doc("d/1"), twenty_keyword_doc("d/2")],
        )]);
        let corpus = FixedCorpus { total: 10, by_word };
        let words = HashSet::from(["cancer".to_string()]);

        let scores = score_words(&KeywordExtractor::new(), &corpus, &words).unwrap();
        let expected = (10.0f64 / 2.0).ln() * (1.0 / 20.0);
        assert!((expected - 0.0805).abs() < 1e-3);
        assert!((scores.score("d/1").unwrap() - expected).abs() < 1e-12);
        assert!((scores.score("d/2").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_match_words_contribute_nothing() {
        let by_word = HashMap::from([(
            "cancer".to_string(),
            vec![doc("d/1", "cancer research", "about cancer")],
        )]);
        let corpus = FixedCorpus { total: 5, by_word };
        let words = HashSet::from(["cancer".to_string(), "unmatched".to_string()]);

        let scores = score_words(&KeywordExtractor::new(), &corpus, &words).unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores.score("d/1").unwrap() > 0.0);
    }

    #[test]
    fn all_stop_word_documents_score_zero() {
        let by_word = HashMap::from([(
            "cancer".to_string(),
            vec![doc("d/1", "the and", "of to")],
        )]);
        let corpus = FixedCorpus { total: 2, by_word };
        let words = HashSet::from(["cancer".to_string()]);

        let scores = score_words(&KeywordExtractor::new(), &corpus, &words).unwrap();
        assert_eq!(scores.score("d/1"), Some(0.0));
    }

    #[test]
    fn word_in_every_document_contributes_zero() {
        let by_word = HashMap::from([(
            "cancer".to_string(),
            vec![
                doc("d/1", "cancer", "cancer notes"),
                doc("d/2", "cancer", "more cancer notes"),
            ],
        )]);
        let corpus = FixedCorpus { total: 2, by_word };
        let words = HashSet::from(["cancer".to_string()]);

        let scores = score_words(&KeywordExtractor::new(), &corpus, &words).unwrap();
        assert_eq!(scores.score("d/1"), Some(0.0));
        assert_eq!(scores.score("d/2"), Some(0.0));
    }

    #[test]
    fn scores_accumulate_across_words() {
        let shared = doc("d/1", "blood cancer", "blood cancer study notes");
        let by_word = HashMap::from([
            ("blood".to_string(), vec![shared.clone()]),
            ("cancer".to_string(), vec![shared]),
        ]);
        let corpus = FixedCorpus { total: 4, by_word };
        let words = HashSet::from(["blood".to_string(), "cancer".to_string()]);

        let scores = score_words(&KeywordExtractor::new(), &corpus, &words).unwrap();
        // 6 keywords, each word occurs twice, idf = ln(4/1) for both.
        let expected = 2.0 * (2.0 / 6.0) * 4.0f64.ln();
        assert!((scores.score("d/1").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn lookup_failure_fails_the_whole_call() {
        let words = HashSet::from(["cancer".to_string()]);
        let result = score_words(&KeywordExtractor::new(), &FailingCorpus, &words);
        assert!(result.is_err());
    }
}
