//! Output format implementations

use serde::Serialize;

use super::format_timestamp;
use crate::drill::{DrillPosition, Phrase, Word};
use crate::speech::{RecognitionResult, StopReason};

/// JSON output structure
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    sequence: u32,
    #[serde(flatten)]
    result: &'a RecognitionResult,
}

fn stop_reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::AutoStop => "auto-stop",
        StopReason::Timeout => "time up",
        StopReason::Manual => "stopped",
        StopReason::CaptureEnded => "ended",
    }
}

/// Format as a single human-readable line
pub fn format_text(result: &RecognitionResult, sequence: u32) -> String {
    let heard = if result.transcript.is_empty() {
        "(nothing heard)".to_string()
    } else {
        format!("{:?}", result.transcript)
    };

    format!(
        "[#{} {}] {} {:.0}% - {} after {} ({})",
        sequence,
        if result.feedback.is_success { "PASS" } else { "RETRY" },
        result.feedback.label,
        result.similarity * 100.0,
        heard,
        format_timestamp(result.elapsed_ms as i64),
        stop_reason_label(result.stop_reason),
    )
}

/// Format as JSON
pub fn format_json(result: &RecognitionResult, sequence: u32) -> String {
    let output = JsonOutput { sequence, result };
    serde_json::to_string(&output)
        .unwrap_or_else(|_| format!("{{\"transcript\": {:?}}}", result.transcript))
}

/// Format the drill card for the current phrase
pub fn format_prompt(word: &Word, phrase: &Phrase, position: DrillPosition, total: usize) -> String {
    let star = if phrase.is_favorite { "\u{2605}" } else { "\u{2606}" };
    format!(
        "{} {}/{} {} ({})  {}/{}\n{}\n  {}\n  {}",
        star,
        position.word + 1,
        total,
        word.text,
        word.gloss,
        position.phrase + 1,
        word.phrases.len(),
        phrase.step,
        phrase.text,
        phrase.translation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::DrillStep;
    use crate::scoring::classify;
    use crate::speech::AttemptId;

    fn result(transcript: &str, similarity: f64) -> RecognitionResult {
        RecognitionResult {
            attempt: AttemptId(3),
            transcript: transcript.to_string(),
            target: "We supply SiC substrates.".to_string(),
            similarity,
            feedback: classify(similarity),
            stop_reason: StopReason::AutoStop,
            elapsed_ms: 2_250,
        }
    }

    #[test]
    fn test_format_text() {
        let line = format_text(&result("we supply sic substrates", 1.0), 1);
        assert_eq!(
            line,
            "[#1 PASS] Excellent 100% - \"we supply sic substrates\" after 00:02.250 (auto-stop)"
        );

        let line = format_text(&result("", 0.0), 2);
        assert!(line.starts_with("[#2 RETRY] Poor 0%"));
        assert!(line.contains("(nothing heard)"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&result("we supply", 0.4), 7);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sequence"], 7);
        assert_eq!(value["attempt"], 3);
        assert_eq!(value["transcript"], "we supply");
        assert_eq!(value["feedback"]["tier"], "fair");
        assert_eq!(value["feedback"]["is_success"], false);
        assert_eq!(value["stop_reason"], "auto_stop");
    }

    #[test]
    fn test_format_prompt() {
        let phrase = Phrase {
            id: 1,
            text: "We supply SiC substrates.".to_string(),
            translation: "SiC基板を供給しています。".to_string(),
            step: DrillStep(1),
            seq_no: 1,
            is_favorite: true,
        };
        let word = Word {
            id: 1,
            text: "supply".to_string(),
            gloss: "供給する".to_string(),
            phrases: vec![phrase.clone()],
        };
        let card = format_prompt(&word, &phrase, DrillPosition::default(), 12);
        assert!(card.starts_with("\u{2605} 1/12 supply (供給する)  1/1"));
        assert!(card.contains("STEP 1: S+V (Core Business)"));
    }
}
