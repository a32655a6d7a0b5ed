use anyhow::Result;
use clap::{Parser, Subcommand};
use core::ontology::{Annotation, AnnotationValue, OntologyClass};
use core::persist::{save_index, save_meta, IndexPaths, MetaFile};
use core::{KeywordExtractor, OntologyIndex};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One annotation of a dumped ontology class. `value` is plain text; any
/// datatype other than xsd:string makes it a non-string literal, which the
/// index skips.
#[derive(Debug, Deserialize)]
struct InputAnnotation {
    #[serde(default)]
    label: bool,
    value: String,
    #[serde(default)]
    datatype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InputClass {
    iri: String,
    #[serde(default)]
    annotations: Vec<InputAnnotation>,
}

impl From<InputClass> for OntologyClass {
    fn from(input: InputClass) -> Self {
        let annotations = input
            .annotations
            .into_iter()
            .map(|ann| match ann.datatype.as_deref() {
                None | Some("xsd:string") => Annotation::string_literal(ann.label, &ann.value),
                Some(datatype) => Annotation {
                    is_label: ann.label,
                    value: AnnotationValue::Literal(format!("\"{}\"^^{datatype}", ann.value)),
                },
            })
            .collect();
        OntologyClass { iri: input.iri, annotations }
    }
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the ontology keyword index from class dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL class dumps or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Keep punctuation inside keywords instead of stripping it
        #[arg(long, default_value_t = false)]
        keep_punctuation: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, keep_punctuation } => {
            build_index(&input, &output, keep_punctuation)
        }
    }
}

fn build_index(input: &str, output: &str, keep_punctuation: bool) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    let extractor = if keep_punctuation {
        KeywordExtractor::without_punctuation_filter()
    } else {
        KeywordExtractor::new()
    };
    let mut index = OntologyIndex::new();
    let mut num_classes: u64 = 0;

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    for file in files {
        // One bad dump must not abort the whole build.
        let result = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            index_jsonl(&file, &extractor, &mut index, &mut num_classes)
        } else {
            index_json(&file, &extractor, &mut index, &mut num_classes)
        };
        if let Err(error) = result {
            tracing::error!(file = %file.display(), %error, "skipping unreadable class dump");
        }
    }

    tracing::info!(num_classes, num_keywords = index.num_keywords(), "ingested ontology classes");

    save_index(&out_paths, &index)?;
    let meta = MetaFile {
        num_classes,
        num_keywords: index.num_keywords() as u64,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn index_jsonl(
    file: &Path,
    extractor: &KeywordExtractor,
    index: &mut OntologyIndex,
    num_classes: &mut u64,
) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let class: InputClass = serde_json::from_str(&line)?;
        ingest_class(class, extractor, index, num_classes);
    }
    Ok(())
}

fn index_json(
    file: &Path,
    extractor: &KeywordExtractor,
    index: &mut OntologyIndex,
    num_classes: &mut u64,
) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let class: InputClass = serde_json::from_value(v)?;
                ingest_class(class, extractor, index, num_classes);
            }
        }
        serde_json::Value::Object(_) => {
            let class: InputClass = serde_json::from_value(json)?;
            ingest_class(class, extractor, index, num_classes);
        }
        _ => {}
    }
    Ok(())
}

fn ingest_class(
    class: InputClass,
    extractor: &KeywordExtractor,
    index: &mut OntologyIndex,
    num_classes: &mut u64,
) {
    index.index_class(extractor, &class.into());
    *num_classes += 1;
}
