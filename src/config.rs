//! Configuration structures for the drill engine

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Hard listening window used by the vocabulary drill (seconds)
pub const VOCABULARY_DRILL_TIMEOUT_SECS: f32 = 7.0;

/// Hard listening window used by the phrase drill (seconds)
pub const PHRASE_DRILL_TIMEOUT_SECS: f32 = 10.0;

/// Longest hard listening window accepted (seconds)
pub const MAX_HARD_TIMEOUT_SECS: f32 = 3600.0;

/// Longest auto-stop grace delay accepted (milliseconds)
pub const MAX_GRACE_DELAY_MS: u64 = 60_000;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub playback: PlaybackConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        let timeout = session.hard_timeout_secs;
        if !(timeout.is_finite() && timeout > 0.0 && timeout <= MAX_HARD_TIMEOUT_SECS) {
            return Err(invalid("session.hard_timeout_secs", timeout));
        }
        if session.grace_delay_ms > MAX_GRACE_DELAY_MS {
            return Err(invalid("session.grace_delay_ms", session.grace_delay_ms));
        }
        if !(0.0..=1.0).contains(&session.auto_stop_threshold) {
            return Err(invalid(
                "session.auto_stop_threshold",
                session.auto_stop_threshold,
            ));
        }
        if session.locale.trim().is_empty() {
            return Err(invalid("session.locale", "\"\""));
        }

        let rate = self.playback.rate;
        if !(rate.is_finite() && rate > 0.0 && rate <= 10.0) {
            return Err(invalid("playback.rate", rate));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Speech capture session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recognition locale (BCP 47)
    pub locale: String,
    /// Hard listening window per attempt (seconds)
    pub hard_timeout_secs: f32,
    /// Similarity at which capture stops early (0.0 - 1.0)
    pub auto_stop_threshold: f64,
    /// Delay between reaching the threshold and stopping (milliseconds)
    pub grace_delay_ms: u64,
    /// Keep capturing across pauses
    pub continuous: bool,
    /// Ask the capability for provisional transcripts
    pub interim_results: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            hard_timeout_secs: VOCABULARY_DRILL_TIMEOUT_SECS,
            auto_stop_threshold: 0.90,
            grace_delay_ms: 250,
            continuous: true,
            interim_results: true,
        }
    }
}

impl SessionConfig {
    /// Session config with an explicit hard timeout
    pub fn with_hard_timeout(timeout: Duration) -> Self {
        Self {
            hard_timeout_secs: timeout.as_secs_f32(),
            ..Default::default()
        }
    }

    /// Hard listening window, capped at `MAX_HARD_TIMEOUT_SECS`.
    ///
    /// A value that is not a valid duration falls back to the vocabulary drill window.
    pub fn hard_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.hard_timeout_secs.min(MAX_HARD_TIMEOUT_SECS))
            .unwrap_or_else(|_| Duration::from_secs_f32(VOCABULARY_DRILL_TIMEOUT_SECS))
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms.min(MAX_GRACE_DELAY_MS))
    }
}

/// Speech playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Synthesis locale (BCP 47)
    pub locale: String,
    /// Speaking rate (1.0 = normal)
    pub rate: f32,
    /// Refuse playback while an attempt is listening
    pub exclusive_with_capture: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            rate: 0.85,
            exclusive_with_capture: true,
        }
    }
}

/// Feedback output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
    /// Show the remaining listening time when an attempt starts
    pub show_countdown: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_countdown: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable line per attempt
    Text,
    /// One JSON object per attempt
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.locale, "en-US");
        assert_eq!(config.session.hard_timeout_secs, VOCABULARY_DRILL_TIMEOUT_SECS);
        assert_eq!(config.session.auto_stop_threshold, 0.90);
        assert_eq!(config.session.grace_delay(), Duration::from_millis(250));
        assert_eq!(config.playback.rate, 0.85);
        assert!(config.playback.exclusive_with_capture);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
            [session]
            hard_timeout_secs = 10.0
            grace_delay_ms = 200

            [output]
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.hard_timeout(), Duration::from_secs(10));
        assert_eq!(config.session.grace_delay_ms, 200);
        assert_eq!(config.session.locale, "en-US");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_explicit_timeout() {
        let session = SessionConfig::with_hard_timeout(Duration::from_secs_f32(
            PHRASE_DRILL_TIMEOUT_SECS,
        ));
        assert_eq!(session.hard_timeout(), Duration::from_secs(10));
        assert_eq!(session.auto_stop_threshold, 0.90);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.auto_stop_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "session.auto_stop_threshold"
        ));

        let mut config = Config::default();
        config.session.hard_timeout_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.playback.rate = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_listening_window() {
        let mut config = Config::default();
        config.session.hard_timeout_secs = 1.0e30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "session.hard_timeout_secs"
        ));

        config.session.hard_timeout_secs = MAX_HARD_TIMEOUT_SECS;
        assert!(config.validate().is_ok());

        config.session.grace_delay_ms = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "session.grace_delay_ms"
        ));
    }

    #[test]
    fn test_output_format_values() {
        use clap::ValueEnum;

        assert_eq!(OutputFormat::from_str("json", true), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TEXT", true), Ok(OutputFormat::Text));
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }

    #[test]
    fn test_out_of_range_durations_do_not_panic() {
        let mut session = SessionConfig::default();
        session.hard_timeout_secs = 1.0e30;
        assert_eq!(session.hard_timeout(), Duration::from_secs(3600));

        session.hard_timeout_secs = f32::NAN;
        assert_eq!(session.hard_timeout(), Duration::from_secs(3600));

        session.hard_timeout_secs = -1.0;
        assert_eq!(session.hard_timeout(), Duration::from_secs(7));

        session.grace_delay_ms = u64::MAX;
        assert_eq!(session.grace_delay(), Duration::from_secs(60));
    }
}
