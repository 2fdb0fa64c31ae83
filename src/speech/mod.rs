//! Speech capture session and the capability seams it drives

pub mod capability;
pub mod clock;
pub mod console;
pub mod scripted;
pub mod session;

pub use capability::{
    AttemptId, CaptureErrorReason, CaptureEvent, CaptureHandle, CaptureRequest, EventSink,
    SpeechCapability, SpeechPlayback, TaggedEvent,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use console::{ConsoleCapability, ConsolePlayback};
pub use scripted::{ScriptedCapability, ScriptedPlayback, Utterance};
pub use session::{
    BeginOutcome, RecognitionResult, SessionListener, SessionState, SpeechSession, StopReason,
};
