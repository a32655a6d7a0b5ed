use crate::score::{Document, ScoreMap};
use serde::Serialize;

/// A document together with its aggregate relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    pub document: Document,
    pub score: f64,
}

/// Orders scored documents by descending score. The sort is stable, so
/// documents with equal scores keep the order in which they first entered
/// the score map, making repeated rankings reproducible.
pub fn rank(scores: ScoreMap) -> Vec<RankedDocument> {
    let mut ranked: Vec<RankedDocument> = scores
        .into_entries()
        .into_iter()
        .map(|(document, score)| RankedDocument { document, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(uri: &str) -> Document {
        Document {
            uri: uri.into(),
            title: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn sorts_by_descending_score() {
        let mut scores = ScoreMap::new();
        scores.add(doc("d/low"), 0.1);
        scores.add(doc("d/high"), 0.9);
        scores.add(doc("d/mid"), 0.5);

        let ranked = rank(scores);
        let uris: Vec<&str> = ranked.iter().map(|r| r.document.uri.as_str()).collect();
        assert_eq!(uris, ["d/high", "d/mid", "d/low"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        for _ in 0..10 {
            let mut scores = ScoreMap::new();
            scores.add(doc("d/first"), 0.5);
            scores.add(doc("d/second"), 0.5);
            scores.add(doc("d/third"), 0.7);

            let uris: Vec<String> = rank(scores)
                .into_iter()
                .map(|r| r.document.uri)
                .collect();
            assert_eq!(uris, ["d/third", "d/first", "d/second"]);
        }
    }
}
