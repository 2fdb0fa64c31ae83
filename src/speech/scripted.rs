//! Scripted capture and playback capabilities
//!
//! Deterministic stand-ins for the platform capabilities: transcripts are
//! pushed by the caller instead of coming from a microphone. Used by the
//! `replay` command and by tests. Clones share state, so one clone can be
//! handed to a session while another drives it.

use parking_lot::Mutex;
use std::sync::Arc;

use super::capability::{
    CaptureErrorReason, CaptureHandle, CaptureRequest, EventSink, SpeechCapability,
    SpeechPlayback,
};

#[derive(Default)]
struct ScriptState {
    requests: Vec<CaptureRequest>,
    /// Sink of every capture ever opened, in order
    sinks: Vec<EventSink>,
    /// Index into `sinks` of the open capture
    live: Option<usize>,
    stops: usize,
    fail_next: Option<CaptureErrorReason>,
}

#[derive(Clone, Default)]
pub struct ScriptedCapability {
    inner: Arc<Mutex<ScriptState>>,
}

impl ScriptedCapability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail with `reason`
    pub fn fail_next_open(&self, reason: CaptureErrorReason) {
        self.inner.lock().fail_next = Some(reason);
    }

    /// Deliver an interim transcript to the open capture
    pub fn say(&self, text: &str) -> bool {
        self.with_live(|sink| sink.transcript(text, false))
    }

    /// Deliver a final transcript to the open capture
    pub fn say_final(&self, text: &str) -> bool {
        self.with_live(|sink| sink.transcript(text, true))
    }

    /// Report a recognition error from the open capture
    pub fn raise(&self, reason: CaptureErrorReason) -> bool {
        self.with_live(|sink| sink.error(reason))
    }

    /// Report that the open capture ended on its own
    pub fn end(&self) -> bool {
        self.with_live(|sink| sink.ended())
    }

    /// Deliver a transcript through the sink of the `index`-th capture, open or not
    pub fn say_on(&self, index: usize, text: &str) -> bool {
        let state = self.inner.lock();
        state
            .sinks
            .get(index)
            .map(|sink| sink.transcript(text, false))
            .unwrap_or(false)
    }

    pub fn end_on(&self, index: usize) -> bool {
        let state = self.inner.lock();
        state
            .sinks
            .get(index)
            .map(|sink| sink.ended())
            .unwrap_or(false)
    }

    pub fn open_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }

    pub fn stop_count(&self) -> usize {
        self.inner.lock().stops
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().live.is_some()
    }

    pub fn last_request(&self) -> Option<CaptureRequest> {
        self.inner.lock().requests.last().cloned()
    }

    fn with_live(&self, f: impl FnOnce(&EventSink) -> bool) -> bool {
        let state = self.inner.lock();
        match state.live.and_then(|idx| state.sinks.get(idx)) {
            Some(sink) => f(sink),
            None => false,
        }
    }
}

impl SpeechCapability for ScriptedCapability {
    type Handle = ScriptedHandle;

    fn open(
        &mut self,
        request: &CaptureRequest,
        sink: EventSink,
    ) -> Result<Self::Handle, CaptureErrorReason> {
        let mut state = self.inner.lock();
        if let Some(reason) = state.fail_next.take() {
            return Err(reason);
        }

        state.requests.push(request.clone());
        state.sinks.push(sink);
        let index = state.sinks.len() - 1;
        state.live = Some(index);

        Ok(ScriptedHandle {
            inner: Arc::clone(&self.inner),
            index,
            stopped: false,
        })
    }
}

pub struct ScriptedHandle {
    inner: Arc<Mutex<ScriptState>>,
    index: usize,
    stopped: bool,
}

impl CaptureHandle for ScriptedHandle {
    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        let mut state = self.inner.lock();
        state.stops += 1;
        if state.live == Some(self.index) {
            state.live = None;
        }
    }
}

/// One recorded `speak` call
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f32,
}

/// Playback that records what it was asked to say
#[derive(Clone, Default)]
pub struct ScriptedPlayback {
    spoken: Arc<Mutex<Vec<Utterance>>>,
    cancels: Arc<Mutex<usize>>,
}

impl ScriptedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().clone()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock()
    }
}

impl SpeechPlayback for ScriptedPlayback {
    fn speak(&mut self, text: &str, locale: &str, rate: f32) {
        self.spoken.lock().push(Utterance {
            text: text.to_string(),
            locale: locale.to_string(),
            rate,
        });
    }

    fn cancel(&mut self) {
        *self.cancels.lock() += 1;
    }
}
