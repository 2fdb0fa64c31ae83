//! Drill content and sequencing

pub mod model;
pub mod sequencer;
pub mod store;

pub use model::{DrillSet, DrillStep, Phrase, PhraseId, Word, WordId};
pub use sequencer::{DrillPosition, DrillSequencer, IndexEntry, SortOrder};
pub use store::{ContentStore, JsonContentStore};
