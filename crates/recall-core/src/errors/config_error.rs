/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {reason}")]
    ParseError { reason: String },

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("unknown preset: {name}")]
    UnknownPreset { name: String },
}
