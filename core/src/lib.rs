pub mod engine;
pub mod index;
pub mod keywords;
pub mod ontology;
pub mod persist;
pub mod rank;
pub mod score;

pub use engine::SearchEngine;
pub use index::OntologyIndex;
pub use keywords::KeywordExtractor;
pub use ontology::{Annotation, AnnotationValue, OntologyClass, OntologySource};
pub use rank::RankedDocument;
pub use score::{Document, DocumentSearch, ScoreMap};
