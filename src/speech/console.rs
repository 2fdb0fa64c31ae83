//! Terminal-backed capabilities
//!
//! Lines typed on stdin stand in for recognized speech, and playback is
//! printed instead of synthesized.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::capability::{
    CaptureErrorReason, CaptureHandle, CaptureRequest, EventSink, SpeechCapability,
    SpeechPlayback,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn a thread that forwards stdin lines into a channel
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (sender, receiver) = unbounded();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        debug!("stdin reader finished");
    });

    receiver
}

/// Capture capability fed by typed lines.
///
/// Each non-empty line is a final transcript; an empty line ends capture.
pub struct ConsoleCapability {
    lines: Receiver<String>,
}

impl ConsoleCapability {
    pub fn new(lines: Receiver<String>) -> Self {
        Self { lines }
    }
}

impl SpeechCapability for ConsoleCapability {
    type Handle = ConsoleHandle;

    fn open(
        &mut self,
        request: &CaptureRequest,
        sink: EventSink,
    ) -> Result<Self::Handle, CaptureErrorReason> {
        let running = Arc::new(AtomicBool::new(true));
        let is_running = Arc::clone(&running);
        let lines = self.lines.clone();

        info!("Console capture opened (locale: {})", request.locale);

        let worker = std::thread::Builder::new()
            .name(format!("capture-{}", sink.attempt().0))
            .spawn(move || {
                while is_running.load(Ordering::Relaxed) {
                    match lines.recv_timeout(POLL_INTERVAL) {
                        Ok(line) => {
                            let line = line.trim();
                            if line.is_empty() {
                                sink.ended();
                                break;
                            }
                            sink.transcript(line, true);
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => {
                            sink.error(CaptureErrorReason::Generic("input closed".to_string()));
                            break;
                        }
                    }
                }
            })
            .map_err(|e| CaptureErrorReason::Generic(e.to_string()))?;

        Ok(ConsoleHandle {
            running,
            worker: Some(worker),
        })
    }
}

pub struct ConsoleHandle {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureHandle for ConsoleHandle {
    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Console capture thread panicked");
            }
            debug!("Console capture stopped");
        }
    }
}

impl Drop for ConsoleHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Playback that prints the utterance
#[derive(Debug, Default)]
pub struct ConsolePlayback {
    current: Option<String>,
}

impl SpeechPlayback for ConsolePlayback {
    fn speak(&mut self, text: &str, locale: &str, rate: f32) {
        if let Some(previous) = self.current.replace(text.to_string()) {
            debug!("Playback interrupted: {:?}", previous);
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "  \u{1F50A} {} ({}, {:.2}x)", text, locale, rate);
        let _ = stdout.flush();
    }

    fn cancel(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!("Playback cancelled: {:?}", previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::capability::{AttemptId, CaptureEvent};
    use crossbeam_channel::bounded;

    fn request() -> CaptureRequest {
        CaptureRequest {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }

    #[test]
    fn test_lines_become_transcripts() {
        let (line_tx, line_rx) = unbounded();
        let (event_tx, event_rx) = bounded(8);
        let mut capability = ConsoleCapability::new(line_rx);

        let mut handle = capability
            .open(&request(), EventSink::new(AttemptId(1), event_tx))
            .unwrap();

        line_tx.send("  we supply  ".to_string()).unwrap();
        line_tx.send(String::new()).unwrap();

        let first = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            first.event,
            CaptureEvent::Transcript {
                text: "we supply".to_string(),
                is_final: true
            }
        );
        let second = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(second.event, CaptureEvent::Ended);

        handle.stop();
        handle.stop();
    }

    #[test]
    fn test_closed_input_reports_error() {
        let (line_tx, line_rx) = unbounded::<String>();
        let (event_tx, event_rx) = bounded(8);
        let mut capability = ConsoleCapability::new(line_rx);
        let _handle = capability
            .open(&request(), EventSink::new(AttemptId(2), event_tx))
            .unwrap();

        drop(line_tx);
        drop(capability);

        let event = event_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event.event, CaptureEvent::Error(CaptureErrorReason::Generic(_))));
    }
}
