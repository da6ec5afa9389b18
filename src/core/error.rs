use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagnateError {
    #[error("Company not found: {0:?}")]
    CompanyNotFound(crate::core::types::CompanyId),

    #[error("Building not found: {0:?}")]
    BuildingNotFound(crate::core::types::BuildingId),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MagnateError>;
