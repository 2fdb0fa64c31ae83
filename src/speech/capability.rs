//! Seams to the platform speech capabilities
//!
//! Capture is modeled as an event stream: every event a capability emits is
//! tagged with the attempt it was opened for, so a callback from a stopped
//! capture can never reach a newer attempt.

use crossbeam_channel::{Sender, TrySendError};
use tracing::warn;

use crate::error::SessionError;

/// Identifies one listen-and-score cycle within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameters passed to the capability when capture opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
}

/// Reason codes reported by a capture capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorReason {
    /// No speech capture on this platform
    Unsupported,
    /// Any runtime recognition failure
    Generic(String),
}

impl CaptureErrorReason {
    /// Parse a platform reason code (`unsupported`, `generic-error`, ...)
    pub fn from_code(code: &str) -> Self {
        match code {
            "unsupported" | "not-supported" | "service-not-allowed" => Self::Unsupported,
            other => Self::Generic(other.to_string()),
        }
    }
}

impl From<CaptureErrorReason> for SessionError {
    fn from(reason: CaptureErrorReason) -> Self {
        match reason {
            CaptureErrorReason::Unsupported => SessionError::CapabilityUnavailable,
            CaptureErrorReason::Generic(msg) => SessionError::RecognitionFailure(msg),
        }
    }
}

/// Something the capture capability reported
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Latest transcript; `is_final` marks the end of an utterance
    Transcript { text: String, is_final: bool },
    Error(CaptureErrorReason),
    /// Capture ended on its own
    Ended,
}

/// A capture event tagged with its attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub attempt: AttemptId,
    pub event: CaptureEvent,
}

/// Per-attempt sending half of the session's event stream
#[derive(Debug, Clone)]
pub struct EventSink {
    attempt: AttemptId,
    sender: Sender<TaggedEvent>,
}

impl EventSink {
    pub(crate) fn new(attempt: AttemptId, sender: Sender<TaggedEvent>) -> Self {
        Self { attempt, sender }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Deliver a transcript. Returns false if the event could not be queued.
    pub fn transcript(&self, text: impl Into<String>, is_final: bool) -> bool {
        self.send(CaptureEvent::Transcript {
            text: text.into(),
            is_final,
        })
    }

    pub fn error(&self, reason: CaptureErrorReason) -> bool {
        self.send(CaptureEvent::Error(reason))
    }

    pub fn ended(&self) -> bool {
        self.send(CaptureEvent::Ended)
    }

    fn send(&self, event: CaptureEvent) -> bool {
        let tagged = TaggedEvent {
            attempt: self.attempt,
            event,
        };
        match self.sender.try_send(tagged) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Capture event queue full - dropping event for attempt {}", self.attempt);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Platform speech-to-text capability
pub trait SpeechCapability {
    type Handle: CaptureHandle;

    /// Open one capture instance. Events for it must go through `sink`.
    fn open(
        &mut self,
        request: &CaptureRequest,
        sink: EventSink,
    ) -> Result<Self::Handle, CaptureErrorReason>;
}

/// An open capture instance
pub trait CaptureHandle {
    /// Stop capturing. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Platform text-to-speech capability
///
/// Speaking cancels any utterance still in progress.
pub trait SpeechPlayback {
    fn speak(&mut self, text: &str, locale: &str, rate: f32);

    fn cancel(&mut self);
}
