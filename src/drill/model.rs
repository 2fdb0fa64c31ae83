//! Drill content: words, their practice phrases and drill steps

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;

pub type WordId = u64;
pub type PhraseId = u64;

/// Pedagogical step of a phrase (1..=5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrillStep(pub u8);

impl DrillStep {
    /// Fixed label of a known step
    pub fn label(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("S+V (Core Business)"),
            2 => Some("Adding Technical Domain"),
            3 => Some("Strategic Solution"),
            4 => Some("PAST (Performance Result)"),
            5 => Some("PRESENT PERFECT (Key Success)"),
            _ => None,
        }
    }
}

impl std::fmt::Display for DrillStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => write!(f, "STEP {}: {}", self.0, label),
            None => write!(f, "STEP {}", self.0),
        }
    }
}

/// A practice sentence for a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: PhraseId,
    /// Target-language sentence
    pub text: String,
    /// Native-language translation
    pub translation: String,
    pub step: DrillStep,
    pub seq_no: u32,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Target-language display form
    pub text: String,
    /// Native-language gloss
    pub gloss: String,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
}

impl Word {
    /// Upper-cased first letter, used for alphabetical sections
    pub fn initial(&self) -> Option<char> {
        self.text
            .trim_start()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

fn default_corpus_name() -> String {
    "Training".to_string()
}

/// Words of one corpus, in rank order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSet {
    #[serde(default = "default_corpus_name")]
    pub corpus_name: String,
    pub words: Vec<Word>,
}

impl DrillSet {
    pub fn new(corpus_name: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            corpus_name: corpus_name.into(),
            words,
        }
    }

    /// A drill needs at least one word, and every word needs a phrase
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.words.is_empty() {
            return Err(SequenceError::InvalidDrillSet(format!(
                "corpus {:?} has no words",
                self.corpus_name
            )));
        }
        if let Some(word) = self.words.iter().find(|w| w.phrases.is_empty()) {
            return Err(SequenceError::InvalidDrillSet(format!(
                "word {:?} (id {}) has no phrases",
                word.text, word.id
            )));
        }
        Ok(())
    }

    pub fn phrase_count(&self) -> usize {
        self.words.iter().map(|w| w.phrases.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(id: PhraseId) -> Phrase {
        Phrase {
            id,
            text: "We supply SiC substrates.".to_string(),
            translation: "SiC基板を供給しています。".to_string(),
            step: DrillStep(1),
            seq_no: 1,
            is_favorite: false,
        }
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(DrillStep(1).to_string(), "STEP 1: S+V (Core Business)");
        assert_eq!(DrillStep(5).to_string(), "STEP 5: PRESENT PERFECT (Key Success)");
        assert_eq!(DrillStep(9).to_string(), "STEP 9");
        assert_eq!(DrillStep(0).label(), None);
    }

    #[test]
    fn test_word_initial() {
        let word = Word {
            id: 1,
            text: "  étude".to_string(),
            gloss: "study".to_string(),
            phrases: vec![],
        };
        assert_eq!(word.initial(), Some('É'));
    }

    #[test]
    fn test_validate() {
        let empty = DrillSet::new("Empty", vec![]);
        assert!(matches!(empty.validate(), Err(SequenceError::InvalidDrillSet(_))));

        let hollow = DrillSet::new(
            "Hollow",
            vec![Word {
                id: 1,
                text: "supply".to_string(),
                gloss: "供給する".to_string(),
                phrases: vec![],
            }],
        );
        assert!(hollow.validate().is_err());

        let good = DrillSet::new(
            "Good",
            vec![Word {
                id: 1,
                text: "supply".to_string(),
                gloss: "供給する".to_string(),
                phrases: vec![phrase(10), phrase(11)],
            }],
        );
        assert!(good.validate().is_ok());
        assert_eq!(good.phrase_count(), 2);
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "words": [{
                "id": 3, "text": "yield", "gloss": "歩留まり",
                "phrases": [{"id": 30, "text": "Yield improved.", "translation": "歩留まりが改善した。", "step": 4, "seq_no": 1}]
            }]
        }"#;
        let set: DrillSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.corpus_name, "Training");
        assert_eq!(set.words[0].phrases[0].step, DrillStep(4));
        assert!(!set.words[0].phrases[0].is_favorite);
    }
}
