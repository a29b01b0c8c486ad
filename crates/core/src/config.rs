use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "socratic.toml";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Which backend answers model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Mock => "mock",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase", deny_unknown_fields)]
pub enum ProviderConfig {
    /// Google Gemini configuration
    #[serde(rename = "gemini")]
    Gemini {
        /// Model name (e.g., "gemini-1.5-flash")
        #[serde(default = "default_gemini_model")]
        model: String,
        /// Base URL for the API
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
        /// Environment variable holding the API key
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
    /// Scripted offline replies
    #[serde(rename = "mock")]
    Mock {
        /// TOML file with `[[responses]]` entries
        #[serde(default)]
        responses_file: Option<PathBuf>,
    },
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Gemini {
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::Gemini { .. } => ProviderKind::Gemini,
            ProviderConfig::Mock { .. } => ProviderKind::Mock,
        }
    }

    /// Model name shown to the user
    pub fn model_name(&self) -> &str {
        match self {
            ProviderConfig::Gemini { model, .. } => model,
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    /// Read the API key from the environment.
    ///
    /// Returns `Ok(None)` for providers that need no credential. A missing or
    /// blank key for Gemini is a configuration error.
    pub fn api_key(&self) -> Result<Option<String>> {
        match self {
            ProviderConfig::Gemini { api_key_env, .. } => match std::env::var(api_key_env) {
                Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
                _ => Err(Error::Config(ConfigError::MissingApiKey(api_key_env.clone()).to_string())),
            },
            ProviderConfig::Mock { .. } => Ok(None),
        }
    }
}

/// Sampling parameters sent with every model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Chat page settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ChatConfig {
    /// Seed reply shown when a chat starts
    pub opening_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            opening_message: "Hey! I'm your assistant. What would you like to learn about sorting algorithms today?"
                .to_string(),
        }
    }
}

/// Where learn-page images live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AssetsConfig {
    pub dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("assets") }
    }
}

/// External speech-to-text command; its stdout is taken as the utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VoiceConfig {
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl VoiceConfig {
    pub fn is_configured(&self) -> bool {
        self.command.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: FileLoggingConfig,
    pub privacy: PrivacySettings,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file: FileLoggingConfig::default(),
            privacy: PrivacySettings::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    /// Overrides `SOCRATIC_LOG_DIR` and the home directory default
    pub directory: Option<PathBuf>,
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PrivacySettings {
    /// Include chat text in debug logs
    pub log_message_text: bool,
    pub truncate_length: usize,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self { log_message_text: false, truncate_length: 200 }
    }
}

/// Root configuration structure for socratic.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(|e| Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `socratic.toml` in the working
    /// directory is used when present, otherwise built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(ConfigError::FileNotFound(path.to_path_buf()).to_string()));
                }
                Self::from_file(path)
            }
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() { Self::from_file(local) } else { Ok(Self::default()) }
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::Config(ConfigError::InvalidValue(msg).to_string()));

        if let ProviderConfig::Gemini { model, api_key_env, .. } = &self.provider {
            if model.trim().is_empty() {
                return invalid("provider.model cannot be empty".to_string());
            }
            if api_key_env.trim().is_empty() {
                return invalid("provider.api_key_env cannot be empty".to_string());
            }
        }

        let generation = &self.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return invalid(format!("generation.temperature must be within 0..=2, got {}", generation.temperature));
        }
        if !(0.0..=1.0).contains(&generation.top_p) {
            return invalid(format!("generation.top_p must be within 0..=1, got {}", generation.top_p));
        }
        if generation.max_output_tokens == 0 {
            return invalid("generation.max_output_tokens must be positive".to_string());
        }

        if self.chat.opening_message.trim().is_empty() {
            return invalid("chat.opening_message cannot be empty".to_string());
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Socratic configuration example
# Save as socratic.toml in the working directory or pass --config PATH

[provider]
# Provider type: "gemini" or "mock"
provider = "gemini"
model = "gemini-1.5-flash"
# The API key is never stored here; it is read from this environment variable
# (a .env file in the working directory is loaded first)
api_key_env = "GEMINI_API_KEY"
# base_url = "https://generativelanguage.googleapis.com/v1beta"

[generation]
temperature = 1.0
top_p = 0.95
top_k = 64
max_output_tokens = 8192
response_mime_type = "text/plain"

[chat]
opening_message = "Hey! I'm your assistant. What would you like to learn about sorting algorithms today?"

[assets]
# Directory holding bs.jpg, ms.png, qs.png and hs.png
dir = "assets"

[voice]
# Speech-to-text command; its stdout is used as the message
# command = "whisper-capture"
# args = ["--language", "en"]

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false

[logging.privacy]
log_message_text = false
truncate_length = 200
"#
    }
}

/// Load `.env` from the working directory if one exists
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Credential variable missing from the environment
    #[error("{0} is not set; export it or add it to .env")]
    MissingApiKey(String),

    /// Explicit config path does not exist
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Out of range or empty value
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
