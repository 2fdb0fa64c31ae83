//! Drill sequencing over a loaded word list
//!
//! `advance()` always walks words in rank order and wraps around; the sort
//! order only changes how the navigation index is presented.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::model::{DrillSet, Phrase, PhraseId, Word};
use super::store::ContentStore;
use crate::error::{DrillError, SequenceError};

/// Presentation order of the navigation index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Load order (frequency rank)
    #[default]
    Rank,
    /// By display form, case-insensitive
    Alphabetical,
}

/// Cursor into the word list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DrillPosition {
    pub word: usize,
    pub phrase: usize,
}

/// One row of the navigation index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry<'a> {
    /// Rank position, valid for `jump_to`
    pub position: usize,
    pub word: &'a Word,
    pub is_current: bool,
    /// Initial of a new alphabetical section starting at this row
    pub section: Option<char>,
}

pub struct DrillSequencer {
    set: DrillSet,
    position: DrillPosition,
    sort_order: SortOrder,
}

impl DrillSequencer {
    /// Start at the first phrase of the first word
    pub fn new(set: DrillSet) -> Result<Self, SequenceError> {
        set.validate()?;
        debug!(
            "Drill {:?} loaded: {} words, {} phrases",
            set.corpus_name,
            set.words.len(),
            set.phrase_count()
        );

        Ok(Self {
            set,
            position: DrillPosition::default(),
            sort_order: SortOrder::Rank,
        })
    }

    pub fn corpus_name(&self) -> &str {
        &self.set.corpus_name
    }

    pub fn words(&self) -> &[Word] {
        &self.set.words
    }

    pub fn len(&self) -> usize {
        self.set.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.words.is_empty()
    }

    pub fn position(&self) -> DrillPosition {
        self.position
    }

    pub fn current(&self) -> (&Word, &Phrase) {
        let word = &self.set.words[self.position.word];
        (word, &word.phrases[self.position.phrase])
    }

    /// Move to the next phrase, or the first phrase of the next word
    pub fn advance(&mut self) -> DrillPosition {
        let phrase_count = self.set.words[self.position.word].phrases.len();

        if self.position.phrase + 1 < phrase_count {
            self.position.phrase += 1;
        } else {
            self.position.phrase = 0;
            self.position.word = (self.position.word + 1) % self.set.words.len();
        }

        debug!(
            "Advanced to word {} phrase {}",
            self.position.word, self.position.phrase
        );
        self.position
    }

    /// Jump to the first phrase of the word at rank position `index`
    pub fn jump_to(&mut self, index: usize) -> Result<(), SequenceError> {
        let len = self.set.words.len();
        if index >= len {
            return Err(SequenceError::OutOfRangeJump { index, len });
        }

        self.position = DrillPosition {
            word: index,
            phrase: 0,
        };
        Ok(())
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, mode: SortOrder) {
        self.sort_order = mode;
    }

    /// Rank positions in presentation order
    fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.set.words.len()).collect();
        if self.sort_order == SortOrder::Alphabetical {
            // Stable: ties keep rank order
            order.sort_by_cached_key(|&idx| self.set.words[idx].text.to_lowercase());
        }
        order
    }

    /// Navigation index in the current sort order
    pub fn index(&self) -> Vec<IndexEntry<'_>> {
        let alphabetical = self.sort_order == SortOrder::Alphabetical;
        let mut previous_initial = None;

        self.display_order()
            .into_iter()
            .map(|position| {
                let word = &self.set.words[position];
                let initial = word.initial();
                let section = if alphabetical && initial != previous_initial {
                    initial
                } else {
                    None
                };
                previous_initial = initial;

                IndexEntry {
                    position,
                    word,
                    is_current: position == self.position.word,
                    section,
                }
            })
            .collect()
    }

    /// Distinct initials of the alphabetical index; empty in rank order
    pub fn section_initials(&self) -> Vec<char> {
        if self.sort_order != SortOrder::Alphabetical {
            return Vec::new();
        }
        let mut initials: Vec<char> = self.set.words.iter().filter_map(Word::initial).collect();
        initials.sort_unstable();
        initials.dedup();
        initials
    }

    fn phrase_mut(&mut self, id: PhraseId) -> Option<&mut Phrase> {
        self.set
            .words
            .iter_mut()
            .flat_map(|w| w.phrases.iter_mut())
            .find(|p| p.id == id)
    }

    pub fn is_favorite(&self, id: PhraseId) -> Option<bool> {
        self.set
            .words
            .iter()
            .flat_map(|w| w.phrases.iter())
            .find(|p| p.id == id)
            .map(|p| p.is_favorite)
    }

    /// Flip the local favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: PhraseId) -> Result<bool, SequenceError> {
        let phrase = self
            .phrase_mut(id)
            .ok_or(SequenceError::UnknownPhrase(id))?;
        phrase.is_favorite = !phrase.is_favorite;
        Ok(phrase.is_favorite)
    }

    /// Set the local favorite flag, e.g. to revert a failed write
    pub fn set_favorite(&mut self, id: PhraseId, value: bool) -> Result<(), SequenceError> {
        let phrase = self
            .phrase_mut(id)
            .ok_or(SequenceError::UnknownPhrase(id))?;
        phrase.is_favorite = value;
        Ok(())
    }

    /// Toggle optimistically, write through `store`, and revert on failure
    pub fn commit_favorite<S: ContentStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: PhraseId,
    ) -> Result<bool, DrillError> {
        let value = self.toggle_favorite(id)?;

        if let Err(e) = store.set_favorite(id, value) {
            warn!("Favorite write for phrase {} failed, reverting: {}", id, e);
            self.set_favorite(id, !value)?;
            return Err(e.into());
        }
        Ok(value)
    }
}
