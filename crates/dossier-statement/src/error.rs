use dossier_model::DataError;

#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid timestamp: {0:?}")]
    Timestamp(String),

    #[error("unknown statement format: {0:?}")]
    UnknownFormat(String),
}
