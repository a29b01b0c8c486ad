use socratic_core::{ConfigError, Error, Result, VoiceConfig};
use tokio::process::Command;

/// Runs the configured speech-to-text command and reads the utterance from its stdout
#[derive(Debug, Clone)]
pub struct VoiceCapture {
    command: String,
    args: Vec<String>,
}

impl VoiceCapture {
    pub fn from_config(config: &VoiceConfig) -> Result<Self> {
        match &config.command {
            Some(command) if config.is_configured() => Ok(Self { command: command.clone(), args: config.args.clone() }),
            _ => Err(Error::Config(
                ConfigError::InvalidValue("voice input needs [voice] command in the config file".to_string()).to_string(),
            )),
        }
    }

    /// Capture one utterance. `None` means nothing intelligible was heard.
    pub async fn capture(&self) -> Result<Option<String>> {
        tracing::debug!(command = %self.command, "Capturing speech");
        let output = Command::new(&self.command).args(&self.args).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Io(std::io::Error::other(format!(
                "speech command '{}' failed ({}): {}",
                self.command,
                output.status,
                stderr.trim()
            ))));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}
