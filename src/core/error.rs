use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown battle result code: {0}")]
    UnknownResultCode(u8),

    #[error("Unknown heal mode code: {0}")]
    UnknownHealMode(u8),

    #[error("Unknown heal mode: {0:?}")]
    UnknownHealModeName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecoveryError>;
