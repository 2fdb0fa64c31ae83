//! Content store seam and a JSON file implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::model::{DrillSet, Phrase, PhraseId};
use crate::error::StoreError;

/// External source of drill content and owner of favorite flags
pub trait ContentStore {
    /// Words in rank order, each with phrases in sequence order
    fn load_drill_set(&self, corpus_id: &str) -> Result<DrillSet, StoreError>;

    fn set_favorite(&mut self, phrase_id: PhraseId, value: bool) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    corpora: BTreeMap<String, DrillSet>,
}

/// Drill sets kept in a single JSON document.
///
/// ```json
/// { "corpora": { "semis-1": { "corpus_name": "...", "words": [ ... ] } } }
/// ```
pub struct JsonContentStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl JsonContentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| StoreError::ContentLoad(format!("{}: {}", path.display(), e)))?;
        let doc: StoreDocument = serde_json::from_str(&content)
            .map_err(|e| StoreError::ContentLoad(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded content store {} ({} corpora)",
            path.display(),
            doc.corpora.len()
        );
        Ok(Self { path, doc })
    }

    pub fn corpus_ids(&self) -> impl Iterator<Item = &str> {
        self.doc.corpora.keys().map(String::as_str)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn phrase_mut(&mut self, phrase_id: PhraseId) -> Option<&mut Phrase> {
        self.doc
            .corpora
            .values_mut()
            .flat_map(|set| set.words.iter_mut())
            .flat_map(|word| word.phrases.iter_mut())
            .find(|p| p.id == phrase_id)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.doc)
            .map_err(|e| StoreError::FavoriteWrite(e.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::FavoriteWrite(format!("{}: {}", self.path.display(), e)))
    }
}

impl ContentStore for JsonContentStore {
    fn load_drill_set(&self, corpus_id: &str) -> Result<DrillSet, StoreError> {
        let mut set = self
            .doc
            .corpora
            .get(corpus_id)
            .cloned()
            .ok_or_else(|| StoreError::CorpusNotFound(corpus_id.to_string()))?;

        for word in &mut set.words {
            word.phrases.sort_by_key(|p| p.seq_no);
        }
        Ok(set)
    }

    fn set_favorite(&mut self, phrase_id: PhraseId, value: bool) -> Result<(), StoreError> {
        let phrase = self
            .phrase_mut(phrase_id)
            .ok_or_else(|| StoreError::FavoriteWrite(format!("unknown phrase {}", phrase_id)))?;
        let previous = std::mem::replace(&mut phrase.is_favorite, value);

        if let Err(e) = self.persist() {
            // Keep the document in step with what is on disk
            if let Some(phrase) = self.phrase_mut(phrase_id) {
                phrase.is_favorite = previous;
            }
            return Err(e);
        }
        debug!("Phrase {} favorite = {}", phrase_id, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "corpora": {
            "semis": {
                "corpus_name": "Semiconductor Sales",
                "words": [
                    {"id": 1, "text": "supply", "gloss": "供給する", "phrases": [
                        {"id": 12, "text": "We have supplied them since 2019.", "translation": "", "step": 5, "seq_no": 2},
                        {"id": 11, "text": "We supply SiC substrates.", "translation": "", "step": 1, "seq_no": 1}
                    ]}
                ]
            }
        }
    }"#;

    fn write_doc() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_sorts_phrases() {
        let file = write_doc();
        let store = JsonContentStore::open(file.path()).unwrap();
        assert_eq!(store.corpus_ids().collect::<Vec<_>>(), vec!["semis"]);

        let set = store.load_drill_set("semis").unwrap();
        assert_eq!(set.corpus_name, "Semiconductor Sales");
        let ids: Vec<PhraseId> = set.words[0].phrases.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[test]
    fn test_missing_corpus() {
        let file = write_doc();
        let store = JsonContentStore::open(file.path()).unwrap();
        assert_eq!(
            store.load_drill_set("nope"),
            Err(StoreError::CorpusNotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_open_errors() {
        assert!(matches!(
            JsonContentStore::open("/nonexistent/store.json"),
            Err(StoreError::ContentLoad(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(matches!(
            JsonContentStore::open(file.path()),
            Err(StoreError::ContentLoad(_))
        ));
    }

    #[test]
    fn test_favorite_persists() {
        let file = write_doc();
        let mut store = JsonContentStore::open(file.path()).unwrap();
        store.set_favorite(12, true).unwrap();

        let reopened = JsonContentStore::open(file.path()).unwrap();
        let set = reopened.load_drill_set("semis").unwrap();
        assert!(set.words[0].phrases[1].is_favorite);
        assert!(!set.words[0].phrases[0].is_favorite);

        assert!(matches!(
            store.set_favorite(999, true),
            Err(StoreError::FavoriteWrite(_))
        ));
    }

    #[test]
    fn test_failed_favorite_write_is_not_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drills.json");
        std::fs::write(&path, DOC).unwrap();
        let mut store = JsonContentStore::open(&path).unwrap();

        // A directory in place of the file makes the write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(
            store.set_favorite(11, true),
            Err(StoreError::FavoriteWrite(_))
        ));
        let set = store.load_drill_set("semis").unwrap();
        assert!(!set.words[0].phrases[0].is_favorite);

        // The next successful write must not carry the failed flag
        std::fs::remove_dir(&path).unwrap();
        store.set_favorite(12, true).unwrap();

        let reopened = JsonContentStore::open(&path).unwrap();
        let set = reopened.load_drill_set("semis").unwrap();
        assert!(!set.words[0].phrases[0].is_favorite);
        assert!(set.words[0].phrases[1].is_favorite);
    }
}
