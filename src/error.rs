use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} spawn region does not fit in the arena: {reason}")]
    SpawnOutOfArena { name: &'static str, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Json error: {0}")]
    Json(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment stepped before reset")]
    NotReset,

    #[error("Invalid policy output: {0}")]
    InvalidPolicyOutput(String),

    #[error("Error while reading file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
