use core::keywords::KeywordExtractor;

#[test]
fn it_lowercases_and_strips_punctuation() {
    let ex = KeywordExtractor::new();
    let words = ex.extract("Metadata, Catalogues & (sub)Datasets!");
    assert_eq!(words, vec!["metadata", "catalogues", "subdatasets"]);
}

#[test]
fn it_never_emits_short_tokens() {
    let ex = KeywordExtractor::new();
    for word in ex.extract("a an the DNA RNA gene protein x-ray") {
        assert!(word.chars().count() > 3, "short token leaked: {word}");
    }
}

#[test]
fn it_filters_stop_words() {
    let ex = KeywordExtractor::new();
    let words = ex.extract("nothing about these records would otherwise match");
    assert!(!words.contains(&"about".to_string()));
    assert!(!words.contains(&"these".to_string()));
    assert!(!words.contains(&"would".to_string()));
    assert!(!words.contains(&"otherwise".to_string()));
    assert!(words.contains(&"records".to_string()));
    assert!(words.contains(&"match".to_string()));
}

#[test]
fn it_never_emits_punctuation_when_filtering() {
    let ex = KeywordExtractor::new();
    for word in ex.extract("semi;colons, (parens) [brackets] {braces} and/or ... dots") {
        assert!(
            word.chars().all(char::is_alphanumeric),
            "punctuation leaked: {word}"
        );
    }
}

#[test]
fn punctuation_filter_can_be_disabled() {
    let ex = KeywordExtractor::without_punctuation_filter();
    let words = ex.extract("x-ray imaging datasets");
    assert_eq!(words, vec!["x-ray", "imaging", "datasets"]);
}

#[test]
fn it_handles_unicode_text() {
    let ex = KeywordExtractor::new();
    // NFKC folds the ligature; to_lowercase handles non-ASCII letters.
    let words = ex.extract("ﬁlament Übersicht");
    assert_eq!(words, vec!["filament", "übersicht"]);
}
