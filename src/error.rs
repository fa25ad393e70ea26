use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Output rendering failed: {0}")]
    OutputFailed(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to construct storage client: {reason}")]
    ClientConstructionFailed { reason: String },
    #[error("Server rejected the access credential")]
    AuthenticationFailure {
        status: u16,
        endpoint: String,
        server_message: String,
    },
    #[error("Remote operation failed: {status} {message}")]
    Remote {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Transport error on {endpoint}: {message}")]
    Transport { endpoint: String, message: String },
    #[error("Retries exhausted after {attempts} credential rotations")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ApiError>,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },
    #[error("Profile '{name}' not found in configuration")]
    ProfileNotFound { name: String },
    #[error("Configuration key '{key}' is missing")]
    MissingKey { key: String },
    #[error("Configuration save failed: {reason}")]
    SaveFailed { reason: String },
}

impl ApiError {
    /// Structured classification consulted by the retry policy. Only a
    /// credential rejection is self-healing via rotation.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::AuthenticationFailure { .. })
    }
}

impl AppError {
    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Api(ApiError::RetriesExhausted { .. }) => Some(
                "The SAS token was still rejected after rotation; regenerate it and update the profile's token entry".to_string(),
            ),
            AppError::Config(ConfigError::MissingKey { key }) => Some(format!(
                "Add a '{}' entry to the profile's [tokens] table",
                key
            )),
            AppError::Config(ConfigError::Unavailable { .. }) => {
                Some("Check that the config file exists and is valid TOML".to_string())
            }
            _ => None,
        }
    }
}
