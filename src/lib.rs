//! Pronunciation Drill Engine
//!
//! Captures a learner's spoken attempt at a target phrase, scores how close
//! it is, classifies the score into a feedback tier and advances through a
//! sequence of vocabulary phrase drills.
//!
//! # Architecture
//!
//! The system is organized into the following modules:
//!
//! - `scoring`: Normalized edit-distance similarity and feedback tiers
//! - `speech`: Capture session state machine and the capability seams it drives
//! - `drill`: Drill content, sequencing and the content store seam
//! - `output`: Feedback formatting and writing
//! - `config`: Configuration structures
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use drill_rs::{Config, DrillSequencer, JsonContentStore, ContentStore, SpeechSession};
//! use drill_rs::speech::{ScriptedCapability, ScriptedPlayback};
//!
//! let config = Config::default();
//!
//! // Load a drill and pick the current phrase
//! let store = JsonContentStore::open("drills.json").unwrap();
//! let sequencer = DrillSequencer::new(store.load_drill_set("semis").unwrap()).unwrap();
//! let (_, phrase) = sequencer.current();
//!
//! // Listen for an attempt
//! let capability = ScriptedCapability::new();
//! let mut session = SpeechSession::new(&config, capability.clone(), ScriptedPlayback::new());
//! session.begin_attempt(&phrase.text).unwrap();
//! capability.say("we supply sic substrates");
//! session.pump().unwrap();
//! let result = session.end_attempt().unwrap();
//! println!("{} ({:.0}%)", result.feedback.label, result.similarity * 100.0);
//! ```

pub mod config;
pub mod drill;
pub mod error;
pub mod output;
pub mod scoring;
pub mod speech;

// Re-exports for convenience
pub use config::{Config, OutputConfig, PlaybackConfig, SessionConfig};
pub use drill::{ContentStore, DrillSequencer, DrillSet, JsonContentStore, Phrase, SortOrder, Word};
pub use error::{ConfigError, DrillError, Result, SequenceError, SessionError, StoreError};
pub use output::FeedbackWriter;
pub use scoring::{classify, similarity, Feedback, Tier};
pub use speech::{BeginOutcome, RecognitionResult, SessionState, SpeechSession, StopReason};
