use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref STRING_LITERAL: Regex =
        Regex::new(r#"(?i)^"(.*)"\^\^xsd:string$"#).expect("valid regex");
}

/// The value attached to a class annotation. Only plain string literals take
/// part in indexing; resources and literals of other datatypes are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// Raw lexical form of a literal, e.g. `"Blood Cancer"^^xsd:string`.
    Literal(String),
    /// An IRI pointing at another resource.
    Resource(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Whether this is a label-type annotation (the primary human-readable
    /// name of the class). Label keywords anchor the association table.
    pub is_label: bool,
    pub value: AnnotationValue,
}

impl Annotation {
    /// Builds an annotation carrying a plain `xsd:string` literal.
    pub fn string_literal(is_label: bool, text: &str) -> Self {
        Self {
            is_label,
            value: AnnotationValue::Literal(format!("\"{text}\"^^xsd:string")),
        }
    }

    /// Returns the text of a plain string literal, or `None` for resources
    /// and literals of any other datatype.
    pub fn plain_string(&self) -> Option<String> {
        match &self.value {
            AnnotationValue::Literal(lexical) => STRING_LITERAL
                .captures(lexical)
                .map(|caps| caps[1].to_string()),
            AnnotationValue::Resource(_) => None,
        }
    }
}

/// A concept node of an external ontology, carrying its human-readable
/// annotations (labels, synonyms, definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyClass {
    pub iri: String,
    pub annotations: Vec<Annotation>,
}

/// Produces the classes of one ontology. Parsing, caching and network fetch
/// live behind this trait; the engine only consumes the class sequence.
pub trait OntologySource {
    /// A short name used in logs when the source fails.
    fn name(&self) -> &str;

    fn classes(&self) -> Result<Vec<OntologyClass>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string_parses_xsd_string_literals() {
        let ann = Annotation::string_literal(true, "Blood Cancer");
        assert_eq!(ann.plain_string().as_deref(), Some("Blood Cancer"));
    }

    #[test]
    fn plain_string_rejects_other_datatypes() {
        let ann = Annotation {
            is_label: false,
            value: AnnotationValue::Literal("\"42\"^^xsd:integer".into()),
        };
        assert_eq!(ann.plain_string(), None);

        let ann = Annotation {
            is_label: false,
            value: AnnotationValue::Resource("http://example.org/thing".into()),
        };
        assert_eq!(ann.plain_string(), None);
    }
}
