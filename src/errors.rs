/// Custom error types for the vox-tts application
#[derive(Debug, thiserror::Error)]
pub enum VoxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to persist preset {preset_id}: {message}")]
    Persist { preset_id: String, message: String },

    #[error("Synthesis failed with status {status}")]
    GatewayStatus { status: u16, body: String },

    #[error("Gateway request timed out after {seconds}s")]
    GatewayTimeout { seconds: u64 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VoxError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn persist(preset_id: impl ToString, message: impl Into<String>) -> Self {
        Self::Persist {
            preset_id: preset_id.to_string(),
            message: message.into(),
        }
    }

    pub fn gateway_status(status: u16, body: impl Into<String>) -> Self {
        Self::GatewayStatus {
            status,
            body: body.into(),
        }
    }

    pub fn gateway_timeout(seconds: u64) -> Self {
        Self::GatewayTimeout { seconds }
    }

    pub fn missing_env_var(var_name: &str) -> Self {
        Self::Config(format!("Missing environment variable: {}", var_name))
    }

    /// Status code reported by the backend, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::GatewayStatus { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VoxError>;

/// Constants used throughout the application
pub mod constants {
    // Configuration constants
    pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
    pub const DEFAULT_DATA_DIR: &str = "data/vox";
    pub const PRESETS_FILE_NAME: &str = "presets.json";

    // Environment variables
    pub const ENV_BASE_URL: &str = "VOX_BASE_URL";
    pub const ENV_API_KEY: &str = "VOX_API_KEY";
    pub const ENV_DATA_DIR: &str = "VOX_DATA_DIR";
    pub const ENV_SYNTHESIS_TIMEOUT_SECS: &str = "VOX_SYNTHESIS_TIMEOUT_SECS";
    pub const ENV_VOICES_TIMEOUT_SECS: &str = "VOX_VOICES_TIMEOUT_SECS";
    pub const ENV_OTEL_HTTP_URL: &str = "VOX_OTEL_HTTP_URL";

    // Gateway constants
    pub const API_KEY_HEADER: &str = "X-API-Key";
    pub const SYNTHESIS_TIMEOUT_SECS: u64 = 60;
    pub const VOICES_TIMEOUT_SECS: u64 = 10;

    // Synthesis request constants
    pub const PHONEME_PADDING_SECS: f64 = 0.1;
    pub const OUTPUT_SAMPLING_RATE: u32 = 24000;

    // Preset defaults
    pub const DEFAULT_SPEAKER: i64 = 22;
    pub const DEFAULT_SPEED_SCALE: f64 = 1.0;
    pub const DEFAULT_PITCH_SCALE: f64 = 0.0;
    pub const DEFAULT_INTONATION_SCALE: f64 = 1.0;
    pub const DEFAULT_VOLUME_SCALE: f64 = 1.0;
    pub const DEFAULT_BGM_ENABLED: bool = false;
    pub const DEFAULT_BGM_VOLUME: f64 = 0.35;

    // Reply constants
    pub const MAX_VOICE_LIST_LENGTH: usize = 2500;
    pub const AUDIO_FILE_PREFIX: &str = "tts_";
    pub const AUDIO_FILE_EXTENSION: &str = "wav";
}
