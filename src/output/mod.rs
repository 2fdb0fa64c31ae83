//! Attempt feedback output

pub mod formats;

use std::io::{self, Write};

use crate::config::{OutputConfig, OutputFormat};
use crate::speech::RecognitionResult;

pub use formats::{format_json, format_prompt, format_text};

/// Writes one line of feedback per finished attempt
pub struct FeedbackWriter<W: Write = io::Stdout> {
    config: OutputConfig,
    out: W,
    sequence_number: u32,
}

impl FeedbackWriter<io::Stdout> {
    /// Writer on stdout
    pub fn new(config: OutputConfig) -> Self {
        Self::with_writer(config, io::stdout())
    }
}

impl<W: Write> FeedbackWriter<W> {
    pub fn with_writer(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            sequence_number: 0,
        }
    }

    /// Write a recognition result
    pub fn write(&mut self, result: &RecognitionResult) -> io::Result<()> {
        self.sequence_number += 1;

        let formatted = match self.config.format {
            OutputFormat::Text => format_text(result, self.sequence_number),
            OutputFormat::Json => format_json(result, self.sequence_number),
        };

        writeln!(self.out, "{}", formatted)?;
        self.out.flush()
    }

    /// Number of results written so far
    pub fn written(&self) -> u32 {
        self.sequence_number
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Format milliseconds as MM:SS.mmm (HH:MM:SS.mmm past an hour)
pub fn format_timestamp(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
    }
}

/// Format a countdown as whole seconds, rounded up
pub fn format_countdown(remaining: std::time::Duration) -> String {
    let secs = (remaining.as_millis() + 999) / 1000;
    format!("{}s", secs)
}
