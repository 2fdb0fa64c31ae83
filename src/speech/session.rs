//! Speech capture session
//!
//! Drives one external capture capability through
//! `Idle -> Listening -> Evaluated -> Idle`. While listening, each transcript
//! is scored against the target; reaching the auto-stop threshold schedules
//! a short grace deadline, and the hard timeout bounds the whole attempt.
//! Deadlines live inside the active attempt, so leaving `Listening` drops
//! them and nothing can fire afterwards.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::capability::{
    AttemptId, CaptureEvent, CaptureHandle, CaptureRequest, EventSink, SpeechCapability,
    SpeechPlayback, TaggedEvent,
};
use super::clock::{Clock, SystemClock};
use crate::config::{Config, PlaybackConfig, SessionConfig};
use crate::error::SessionError;
use crate::scoring::{classify, similarity, Feedback};

const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Listening,
    Evaluated,
}

/// Why an attempt left `Listening`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Transcript matched closely enough
    AutoStop,
    /// Hard timeout elapsed
    Timeout,
    /// `end_attempt()` or a second `begin_attempt()`
    Manual,
    /// The capability ended capture itself
    CaptureEnded,
}

/// Outcome of one attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    pub attempt: AttemptId,
    /// Last transcript heard (empty if nothing was recognized)
    pub transcript: String,
    pub target: String,
    pub similarity: f64,
    pub feedback: Feedback,
    pub stop_reason: StopReason,
    /// Time spent listening (milliseconds)
    pub elapsed_ms: u64,
}

/// What `begin_attempt` did
#[derive(Debug, Clone, PartialEq)]
pub enum BeginOutcome {
    /// Capture opened for a new attempt
    Started(AttemptId),
    /// Already listening: the in-flight attempt was finalized instead
    Finalized(RecognitionResult),
}

/// Caller-supplied sink for session events
pub trait SessionListener {
    fn on_transcript_update(&mut self, _text: &str) {}

    fn on_result(&mut self, _result: &RecognitionResult) {}

    fn on_error(&mut self, _error: &SessionError) {}
}

impl SessionListener for () {}

struct ActiveAttempt<H> {
    id: AttemptId,
    target: String,
    handle: H,
    heard: String,
    similarity: f64,
    started_at: Instant,
    timeout_at: Instant,
    grace_at: Option<Instant>,
}

impl<H> ActiveAttempt<H> {
    fn next_deadline(&self) -> Instant {
        match self.grace_at {
            Some(grace_at) => grace_at.min(self.timeout_at),
            None => self.timeout_at,
        }
    }
}

/// Speech capture session controller
pub struct SpeechSession<C: SpeechCapability, P: SpeechPlayback, K: Clock = SystemClock> {
    config: SessionConfig,
    playback_config: PlaybackConfig,
    capability: C,
    playback: P,
    clock: K,
    listener: Box<dyn SessionListener>,
    sender: Sender<TaggedEvent>,
    receiver: Receiver<TaggedEvent>,
    attempts: u64,
    state: SessionState,
    active: Option<ActiveAttempt<C::Handle>>,
    last_result: Option<RecognitionResult>,
}

impl<C: SpeechCapability, P: SpeechPlayback> SpeechSession<C, P, SystemClock> {
    /// Create a session on the wall clock
    pub fn new(config: &Config, capability: C, playback: P) -> Self {
        Self::with_clock(config, capability, playback, SystemClock)
    }
}

impl<C: SpeechCapability, P: SpeechPlayback, K: Clock> SpeechSession<C, P, K> {
    pub fn with_clock(config: &Config, capability: C, playback: P, clock: K) -> Self {
        let (sender, receiver) = bounded(EVENT_QUEUE_CAPACITY);

        Self {
            config: config.session.clone(),
            playback_config: config.playback.clone(),
            capability,
            playback,
            clock,
            listener: Box::new(()),
            sender,
            receiver,
            attempts: 0,
            state: SessionState::Idle,
            active: None,
            last_result: None,
        }
    }

    /// Register the sink for transcript updates, results and errors
    pub fn set_listener(&mut self, listener: impl SessionListener + 'static) {
        self.listener = Box::new(listener);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Target of the attempt in progress
    pub fn target(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.target.as_str())
    }

    /// Latest transcript of the attempt in progress
    pub fn heard(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.heard.as_str())
    }

    /// Result of the last finished attempt, until `reset()`
    pub fn last_result(&self) -> Option<&RecognitionResult> {
        self.last_result.as_ref()
    }

    /// Number of attempts opened so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Time left before the hard timeout while listening
    pub fn remaining(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.active
            .as_ref()
            .map(|a| a.timeout_at.saturating_duration_since(now))
    }

    /// Start listening for `target`.
    ///
    /// While already listening this acts as a stop toggle: the in-flight
    /// attempt is finalized with the transcript heard so far and no second
    /// capture is opened. From `Evaluated` the previous result is cleared first.
    pub fn begin_attempt(&mut self, target: &str) -> Result<BeginOutcome, SessionError> {
        if let Some(result) = self.finalize(StopReason::Manual) {
            return Ok(BeginOutcome::Finalized(result));
        }

        self.reset();
        if self.playback_config.exclusive_with_capture {
            self.playback.cancel();
        }

        let now = self.clock.now();
        let timeout = self.config.hard_timeout();
        let Some(timeout_at) = now.checked_add(timeout) else {
            return Err(self.fail(SessionError::WindowOutOfRange(timeout)));
        };

        self.attempts += 1;
        let id = AttemptId(self.attempts);
        let request = CaptureRequest {
            locale: self.config.locale.clone(),
            continuous: self.config.continuous,
            interim_results: self.config.interim_results,
        };
        let sink = EventSink::new(id, self.sender.clone());

        let handle = match self.capability.open(&request, sink) {
            Ok(handle) => handle,
            Err(reason) => return Err(self.fail(reason.into())),
        };

        self.active = Some(ActiveAttempt {
            id,
            target: target.to_string(),
            handle,
            heard: String::new(),
            similarity: 0.0,
            started_at: now,
            timeout_at,
            grace_at: None,
        });
        self.state = SessionState::Listening;

        info!("Attempt {} listening ({:.1}s window): {:?}", id, timeout.as_secs_f32(), target);
        Ok(BeginOutcome::Started(id))
    }

    /// Stop listening now and report the result. `None` if not listening.
    ///
    /// Events still queued and not yet pumped are not applied.
    pub fn end_attempt(&mut self) -> Option<RecognitionResult> {
        self.finalize(StopReason::Manual)
    }

    /// Return to `Idle`, abandoning any attempt in progress without a result
    pub fn reset(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.stop();
            debug!("Attempt {} abandoned", active.id);
        }
        // Anything still queued belongs to an attempt that is over
        while self.receiver.try_recv().is_ok() {}

        self.last_result = None;
        self.state = SessionState::Idle;
    }

    /// Speak `text` through the playback capability
    pub fn speak(&mut self, text: &str) -> Result<(), SessionError> {
        if self.playback_config.exclusive_with_capture && self.is_listening() {
            debug!("Playback refused while listening");
            return Err(SessionError::PlaybackBlocked);
        }
        self.playback
            .speak(text, &self.playback_config.locale, self.playback_config.rate);
        Ok(())
    }

    pub fn cancel_playback(&mut self) {
        self.playback.cancel();
    }

    /// Apply every queued event, then fire due deadlines, without blocking.
    ///
    /// Returns the result if the attempt finished during this call.
    pub fn pump(&mut self) -> Result<Option<RecognitionResult>, SessionError> {
        while let Ok(tagged) = self.receiver.try_recv() {
            if let Some(result) = self.apply(tagged)? {
                return Ok(Some(result));
            }
        }
        Ok(self.fire_due_timers())
    }

    /// Block until the attempt in progress finishes.
    ///
    /// Needs a clock that advances on its own; returns `Ok(None)` immediately
    /// when not listening.
    pub fn wait(&mut self) -> Result<Option<RecognitionResult>, SessionError> {
        loop {
            let deadline = match self.active.as_ref() {
                Some(active) => active.next_deadline(),
                None => return Ok(None),
            };
            let timeout = deadline.saturating_duration_since(self.clock.now());

            match self.receiver.recv_timeout(timeout) {
                Ok(tagged) => {
                    if let Some(result) = self.apply(tagged)? {
                        return Ok(Some(result));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }

            if let Some(result) = self.fire_due_timers() {
                return Ok(Some(result));
            }
        }
    }

    fn apply(&mut self, tagged: TaggedEvent) -> Result<Option<RecognitionResult>, SessionError> {
        let now = self.clock.now();
        let threshold = self.config.auto_stop_threshold;
        let grace = self.config.grace_delay();

        let Some(active) = self.active.as_mut().filter(|a| a.id == tagged.attempt) else {
            warn!("Discarding stale capture event from attempt {}", tagged.attempt);
            return Ok(None);
        };

        match tagged.event {
            CaptureEvent::Transcript { text, is_final } => {
                active.similarity = similarity(&text, &active.target);
                active.heard = text;
                debug!(
                    "Attempt {} heard {:?} (final: {}, similarity: {:.2})",
                    active.id, active.heard, is_final, active.similarity
                );

                if active.similarity >= threshold {
                    if active.grace_at.is_none() {
                        active.grace_at = Some(now.checked_add(grace).unwrap_or(active.timeout_at));
                        trace!("Auto-stop scheduled in {}ms", grace.as_millis());
                    }
                } else if active.grace_at.take().is_some() {
                    trace!("Auto-stop cancelled (similarity {:.2})", active.similarity);
                }

                self.listener.on_transcript_update(&active.heard);
                Ok(None)
            }
            CaptureEvent::Error(reason) => Err(self.fail(reason.into())),
            CaptureEvent::Ended => Ok(self.finalize(StopReason::CaptureEnded)),
        }
    }

    fn fire_due_timers(&mut self) -> Option<RecognitionResult> {
        let now = self.clock.now();
        let threshold = self.config.auto_stop_threshold;
        let active = self.active.as_mut()?;
        let timeout_at = active.timeout_at;

        // When both are overdue the earlier deadline decides the stop reason
        if let Some(grace_at) = active.grace_at {
            if now >= grace_at && grace_at <= timeout_at {
                // Re-check against the latest transcript before stopping
                if active.similarity >= threshold {
                    return self.finalize(StopReason::AutoStop);
                }
                active.grace_at = None;
            }
        }

        if now >= timeout_at {
            debug!("Attempt {} hit the hard timeout", active.id);
            return self.finalize(StopReason::Timeout);
        }
        None
    }

    fn finalize(&mut self, reason: StopReason) -> Option<RecognitionResult> {
        let mut active = self.active.take()?;
        active.handle.stop();

        let score = if active.heard.is_empty() {
            0.0
        } else {
            similarity(&active.heard, &active.target)
        };
        let elapsed = self.clock.now().saturating_duration_since(active.started_at);

        let result = RecognitionResult {
            attempt: active.id,
            transcript: active.heard,
            target: active.target,
            similarity: score,
            feedback: classify(score),
            stop_reason: reason,
            elapsed_ms: elapsed.as_millis() as u64,
        };
        self.state = SessionState::Evaluated;

        info!(
            "Attempt {} finished ({:?}): {} {:.0}%",
            result.attempt,
            reason,
            result.feedback.tier,
            result.similarity * 100.0
        );
        self.listener.on_result(&result);
        self.last_result = Some(result.clone());
        Some(result)
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        if let Some(mut active) = self.active.take() {
            active.handle.stop();
        }
        self.state = SessionState::Idle;

        warn!("Speech capture failed: {}", error);
        self.listener.on_error(&error);
        error
    }
}

impl<C: SpeechCapability, P: SpeechPlayback, K: Clock> Drop for SpeechSession<C, P, K> {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.stop();
        }
    }
}
