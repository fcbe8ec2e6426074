use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

const DEFAULT_REQUEST_TIMEOUT_MS: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub receipt: ReceiptConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the backend API, e.g. `https://api.pocketcasts.com/`
    #[validate(url)]
    pub base_url: String,
    #[validate(range(min = 100, max = 120000))]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    /// Where the platform leaves its cached purchase receipt
    pub path: PathBuf,
}

#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for environment variable overrides)
        dotenvy::dotenv().ok();

        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config").required(false))
                .add_source(
                    config::Environment::with_prefix("PLUS_BILLING")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .set_default("api.request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS)?
            .build()?
            .try_deserialize()?;

        config
            .api
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid api configuration: {}", e)))?;

        Ok(config)
    }
}
