use crate::index::OntologyIndex;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_classes: u64,
    pub num_keywords: u64,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("ontology-index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &OntologyIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<OntologyIndex> {
    let mut f = File::open(paths.index())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = bincode::deserialize(&buf)?;
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordExtractor;
    use crate::ontology::{Annotation, OntologyClass};
    use tempfile::tempdir;

    #[test]
    fn index_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());

        let extractor = KeywordExtractor::new();
        let mut index = OntologyIndex::new();
        index.index_class(
            &extractor,
            &OntologyClass {
                iri: "http://example.org/C0001".into(),
                annotations: vec![Annotation::string_literal(true, "Blood Cancer")],
            },
        );
        save_index(&paths, &index).unwrap();

        let loaded = load_index(&paths).unwrap();
        assert_eq!(loaded.keyword_count("cancer"), 1);
        assert_eq!(loaded.associations("cancer"), index.associations("cancer"));
    }
}
