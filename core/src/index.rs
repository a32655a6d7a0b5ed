use crate::keywords::KeywordExtractor;
use crate::ontology::OntologyClass;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Keyword statistics derived from one or more ontologies: a global keyword
/// frequency table and a co-occurrence association table.
///
/// Associations are directional and run from keywords of label annotations to
/// every keyword of every annotation on the same class, itself included.
/// Association lists are append-only and keep duplicates; duplicate entries
/// carry co-occurrence strength even though expansion only reads membership.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OntologyIndex {
    keyword_counts: HashMap<String, u32>,
    associations: HashMap<String, Vec<String>>,
}

impl OntologyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds every class of an ontology into the index. Indexing is additive:
    /// feeding the same ontology twice doubles its counts.
    pub fn index_ontology<I>(&mut self, extractor: &KeywordExtractor, classes: I)
    where
        I: IntoIterator<Item = OntologyClass>,
    {
        for class in classes {
            self.index_class(extractor, &class);
        }
    }

    /// Indexes the annotations of a single class. Annotation values that are
    /// not plain string literals are skipped silently.
    pub fn index_class(&mut self, extractor: &KeywordExtractor, class: &OntologyClass) {
        for annotation in &class.annotations {
            let Some(text) = annotation.plain_string() else {
                continue;
            };
            for keyword in extractor.extract(&text) {
                *self.keyword_counts.entry(keyword.clone()).or_insert(0) += 1;
                if annotation.is_label {
                    self.link_key_to_annotations(extractor, keyword, class);
                }
            }
        }
    }

    fn link_key_to_annotations(
        &mut self,
        extractor: &KeywordExtractor,
        key: String,
        class: &OntologyClass,
    ) {
        let list = self.associations.entry(key).or_default();
        for annotation in &class.annotations {
            let Some(text) = annotation.plain_string() else {
                continue;
            };
            list.extend(extractor.extract(&text));
        }
    }

    /// How often the keyword occurred across all indexed annotation values.
    pub fn keyword_count(&self, keyword: &str) -> u32 {
        self.keyword_counts.get(keyword).copied().unwrap_or(0)
    }

    /// Frequency-based weight, `1/count`. Rarer keywords weigh more. This is
    /// a secondary signal next to the TF-IDF rank, not part of it. `None` for
    /// keywords the index has never seen.
    pub fn ranking_score(&self, keyword: &str) -> Option<f64> {
        self.keyword_counts
            .get(keyword)
            .map(|&count| 1.0 / f64::from(count))
    }

    /// All keywords associated with `keyword`, duplicates included. Unknown
    /// keywords yield an empty slice.
    pub fn associations(&self, keyword: &str) -> &[String] {
        self.associations
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Single-hop query expansion: the query's own keywords plus everything
    /// their association lists reach. Associated keywords are not themselves
    /// re-expanded.
    pub fn expanded_keywords(&self, extractor: &KeywordExtractor, query: &str) -> HashSet<String> {
        let mut words = HashSet::new();
        for key in extractor.extract(query) {
            words.extend(self.associations(&key).iter().cloned());
            words.insert(key);
        }
        words
    }

    pub fn num_keywords(&self) -> usize {
        self.keyword_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyword_counts.is_empty()
    }
}
