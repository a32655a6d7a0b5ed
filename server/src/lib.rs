use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use onto_core::persist::{load_index, IndexPaths};
use onto_core::{Document, DocumentSearch, KeywordExtractor, SearchEngine};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub uri: String,
    pub score: f64,
    pub title: String,
    pub snippet: String,
}

#[derive(Serialize)]
pub struct ExpandResponse {
    pub query: String,
    pub words: Vec<String>,
}

/// In-memory implementation of the document-search collaborator, loaded from
/// a JSONL dump of uri/title/description records. Keyword lists per document
/// are precomputed once at load time.
pub struct MemoryDocumentStore {
    docs: Vec<(Document, Vec<String>)>,
}

impl MemoryDocumentStore {
    pub fn load<P: AsRef<Path>>(path: P, extractor: &KeywordExtractor) -> Result<Self> {
        let f = File::open(path.as_ref())
            .with_context(|| format!("opening document dump {}", path.as_ref().display()))?;
        let reader = BufReader::new(f);
        let mut docs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: Document = serde_json::from_str(&line)?;
            let keywords = extractor.extract(&format!("{} {}", doc.title, doc.description));
            docs.push((doc, keywords));
        }
        Ok(Self { docs })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentSearch for MemoryDocumentStore {
    fn find_by_word(&self, word: &str) -> Result<Vec<Document>> {
        Ok(self
            .docs
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| k == word))
            .map(|(doc, _)| doc.clone())
            .collect())
    }

    fn count_total_documents(&self) -> Result<usize> {
        Ok(self.docs.len())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub store: Arc<MemoryDocumentStore>,
    pub index_dir: PathBuf,
    pub admin_token: Option<String>,
}

pub fn build_app(index_dir: String, documents_path: String) -> Result<Router> {
    let extractor = KeywordExtractor::new();
    let store = MemoryDocumentStore::load(&documents_path, &extractor)?;

    // A missing index snapshot is not fatal: searches degrade to the plain
    // query keywords until a reindex publishes one.
    let index_paths = IndexPaths::new(&index_dir);
    let engine = match load_index(&index_paths) {
        Ok(index) => SearchEngine::with_index(extractor, index),
        Err(error) => {
            tracing::warn!(%error, "no ontology index snapshot, starting empty");
            SearchEngine::new(extractor)
        }
    };

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState {
        engine: Arc::new(engine),
        store: Arc::new(store),
        index_dir: PathBuf::from(&index_dir),
        admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/expand", get(expand_handler))
        .route("/stats", get(stats_handler))
        .route("/reindex", post(reindex_handler))
        .with_state(app_state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();

    let words = state.engine.expand_query(&params.q);
    let ranked = state
        .engine
        .ranked_search(&params.q, state.store.as_ref())
        .map_err(|error| (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()))?;

    let total_hits = ranked.len();
    let k = params.k.max(1).min(100);
    let results = ranked
        .into_iter()
        .take(k)
        .map(|r| SearchHit {
            uri: r.document.uri,
            score: r.score,
            title: r.document.title,
            snippet: highlight_words(&r.document.description, &words),
        })
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn expand_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<ExpandResponse> {
    let mut words: Vec<String> = state.engine.expand_query(&params.q).into_iter().collect();
    words.sort_unstable();
    Json(ExpandResponse { query: params.q, words })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "num_keywords": state.engine.index().num_keywords(),
        "num_documents": state.store.len(),
    }))
}

/// Reloads the index snapshot written by the indexer and publishes it
/// atomically, replacing whatever was live before.
async fn reindex_handler(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let paths = IndexPaths::new(&state.index_dir);
    let index = load_index(&paths)
        .map_err(|error| (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()))?;
    let num_keywords = index.num_keywords();
    state.engine.replace_index(index);
    tracing::info!(num_keywords, "republished ontology index");
    Ok(Json(serde_json::json!({ "num_keywords": num_keywords })))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// Wraps every occurrence of a search word in the snippet with `<em>` tags.
fn highlight_words(snippet: &str, words: &HashSet<String>) -> String {
    let mut s = snippet.to_string();
    for word in words {
        if word.trim().is_empty() {
            continue;
        }
        let Ok(pat) = regex::RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        s = pat
            .replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0]))
            .to_string();
    }
    s
}
