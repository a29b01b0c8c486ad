//! Logging setup built on the tracing ecosystem.
//!
//! Logs go to stderr so they never interleave with the chat on stdout; the
//! default level is `warn`, which keeps an interactive session quiet.
//!
//! # Environment Variables
//!
//! - `SOCRATIC_LOG`: Filter directive (like `RUST_LOG`), e.g., `socratic_agent=debug`
//! - `SOCRATIC_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `SOCRATIC_LOG_DIR`: Directory for the rolling log file (default `~/.socratic/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//!
//! [logging.privacy]
//! log_message_text = false
//! truncate_length = 200
//! ```
//!
//! # Example
//!
//! ```no_run
//! use socratic_core::logging;
//!
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), socratic_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig as ConfigLoggingConfig;
use std::env;
use std::io;
use std::path::PathBuf;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Privacy controls for chat text in logs.
#[derive(Debug, Clone)]
pub struct PrivacyConfig {
    /// Include message text at all
    pub log_message_text: bool,
    /// Maximum characters kept when text is logged
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_text: false, truncate_length: 200 }
    }
}

/// Runtime logging settings, bridged from the `[logging]` config section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// Directory for the rolling log file; `None` disables file logging.
    pub file_dir: Option<PathBuf>,
    /// Privacy controls for message text.
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file_dir: None, privacy: PrivacyConfig::default() }
    }
}

impl TryFrom<ConfigLoggingConfig> for LoggingConfig {
    type Error = Error;

    fn try_from(config: ConfigLoggingConfig) -> Result<Self, Self::Error> {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let file_dir = if config.file.enabled {
            Some(match config.file.directory {
                Some(dir) => dir,
                None => LoggingConfig::default_log_dir()?,
            })
        } else {
            None
        };

        Ok(Self {
            level: config.level,
            format,
            file_dir,
            privacy: PrivacyConfig {
                log_message_text: config.privacy.log_message_text,
                truncate_length: config.privacy.truncate_length,
            },
        })
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file_dir = Some(dir.into());
        self
    }

    pub fn with_privacy(mut self, config: PrivacyConfig) -> Self {
        self.privacy = config;
        self
    }

    fn build_env_filter(&self) -> EnvFilter {
        let filter = env::var("SOCRATIC_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("SOCRATIC_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format != LogFormat::Pretty || Self::is_tty() { self.format } else { LogFormat::Compact }
    }

    fn default_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("SOCRATIC_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".socratic").join("logs"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Sets up an env-based filter (`SOCRATIC_LOG` or `RUST_LOG`), formatted
/// stderr output and, when a file directory is configured, a daily rolling
/// JSON log. The returned guard flushes the file writer and must be held for
/// the life of the process.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let env_filter = config.build_env_filter();
    let format = config.detect_format();

    let registry = Registry::default().with(env_filter);

    if let Some(log_dir) = &config.file_dir {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "socratic.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;

        Ok(Some(guard))
    } else {
        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .try_init(),
            LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(io::stderr)).try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;

        Ok(None)
    }
}

/// Prepare chat text for a log field according to the privacy settings.
pub fn redact_text(content: &str, privacy: &PrivacyConfig) -> String {
    if !privacy.log_message_text {
        return format!("[REDACTED {} chars]", content.chars().count());
    }

    let total = content.chars().count();
    if total <= privacy.truncate_length {
        return content.to_string();
    }

    let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
    truncated.push_str("...");
    truncated.push_str(&format!(" ({} total chars)", total));
    truncated
}
