use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntelligenceError>;

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("analisis no encontrado")]
    AnalysisNotFound,

    #[error("no tienes permiso para generar un plan de este analisis")]
    NotAuthorized,

    #[error("ya existe un plan para este analisis")]
    PlanAlreadyExists,

    #[error("no se detectaron errores en el analisis")]
    NoIssuesDetected,
}
