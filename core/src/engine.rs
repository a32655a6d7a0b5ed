use crate::index::OntologyIndex;
use crate::keywords::KeywordExtractor;
use crate::ontology::OntologySource;
use crate::rank::{rank, RankedDocument};
use crate::score::{score_words, DocumentSearch};
use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// The relevance-search engine: holds the keyword extractor and the published
/// ontology index, and composes query expansion, TF-IDF scoring and ranking.
///
/// The index behind the lock is only ever swapped as a whole. Builds happen
/// on a private copy and publish atomically, so concurrent searches always
/// read a fully constructed index.
pub struct SearchEngine {
    extractor: KeywordExtractor,
    index: RwLock<Arc<OntologyIndex>>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(KeywordExtractor::new())
    }
}

impl SearchEngine {
    pub fn new(extractor: KeywordExtractor) -> Self {
        Self {
            extractor,
            index: RwLock::new(Arc::new(OntologyIndex::new())),
        }
    }

    pub fn with_index(extractor: KeywordExtractor, index: OntologyIndex) -> Self {
        Self {
            extractor,
            index: RwLock::new(Arc::new(index)),
        }
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    /// Snapshot of the currently published index.
    pub fn index(&self) -> Arc<OntologyIndex> {
        self.index.read().clone()
    }

    /// Indexes one ontology source on top of whatever is already published.
    /// If the source fails, the error is logged and surfaced and the
    /// published index stays exactly as it was.
    pub fn build_index(&self, source: &dyn OntologySource) -> Result<()> {
        let classes = match source.classes() {
            Ok(classes) => classes,
            Err(error) => {
                tracing::error!(source = source.name(), %error, "ontology source failed");
                return Err(error);
            }
        };
        tracing::info!(source = source.name(), classes = classes.len(), "indexing ontology");

        let mut next = OntologyIndex::clone(&self.index());
        next.index_ontology(&self.extractor, classes);
        self.publish(next);
        Ok(())
    }

    /// Indexes every source, skipping the ones that fail. Always leaves a
    /// usable (possibly unchanged) index behind.
    pub fn build_index_all<'a, I>(&self, sources: I)
    where
        I: IntoIterator<Item = &'a dyn OntologySource>,
    {
        for source in sources {
            if self.build_index(source).is_err() {
                tracing::warn!(source = source.name(), "skipping failed ontology source");
            }
        }
    }

    /// Atomically replaces the published index, e.g. with one loaded from a
    /// persisted snapshot.
    pub fn replace_index(&self, index: OntologyIndex) {
        self.publish(index);
    }

    pub fn clear_index(&self) {
        self.publish(OntologyIndex::new());
    }

    fn publish(&self, index: OntologyIndex) {
        *self.index.write() = Arc::new(index);
    }

    /// Expands a free-text query into its keywords plus every keyword one
    /// association hop away.
    pub fn expand_query(&self, query: &str) -> HashSet<String> {
        self.index().expanded_keywords(&self.extractor, query)
    }

    /// Full search: expand the query, score every matched document by
    /// TF-IDF and return them ranked best-first.
    pub fn ranked_search<S: DocumentSearch + ?Sized>(
        &self,
        query: &str,
        search: &S,
    ) -> Result<Vec<RankedDocument>> {
        let words = self.expand_query(query);
        tracing::info!(query, words = words.len(), "running ranked search");
        let scores = score_words(&self.extractor, search, &words)?;
        Ok(rank(scores))
    }
}
