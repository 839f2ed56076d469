use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_API_BASE_URL: &str = "https://api.together.xyz/v1";
const DEFAULT_SUMMARY_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo";
const DEFAULT_TESSERACT_CMD: &str = "tesseract";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Cruxify server.
///
/// Built once at startup and handed to the services that need it; nothing reads the
/// environment after construction.
#[derive(Clone)]
pub struct Config {
    /// Bearer credential for the chat-completion API.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API (without the `/chat/completions` suffix).
    pub api_base_url: String,
    /// Model identifier sent with every summarization request.
    pub summary_model: String,
    /// Executable invoked for OCR.
    pub tesseract_command: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Largest request body accepted by the upload endpoint.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_key: optional("TOGETHER_API_KEY")
                .ok_or_else(|| ConfigError::MissingVariable("TOGETHER_API_KEY".into()))?,
            api_base_url: optional("TOGETHER_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            summary_model: optional("SUMMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.to_string()),
            tesseract_command: optional("TESSERACT_CMD")
                .unwrap_or_else(|| DEFAULT_TESSERACT_CMD.to_string()),
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            max_upload_bytes: optional("MAX_UPLOAD_BYTES")
                .map(|value| {
                    value
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("summary_model", &self.summary_model)
            .field("tesseract_command", &self.tesseract_command)
            .field("server_port", &self.server_port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// Load `.env` (if present) and read configuration from the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        model = %config.summary_model,
        tesseract = %config.tesseract_command,
        server_port = ?config.server_port,
        max_upload_bytes = config.max_upload_bytes,
        "Loaded configuration"
    );
    Ok(config)
}
