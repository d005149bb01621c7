use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("address {address} out of range for {bank} (bank size {size})")]
    OutOfRange {
        bank: &'static str,
        address: usize,
        size: usize,
    },

    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("unknown kind: {0}")]
    UnknownKind(String),

    #[error("lesson not found: {0}")]
    LessonNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LabError>;
