use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Corrupt data: {0}")]
    CorruptData(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Point ({x}, {y}) lies outside the query")]
    OutOfBounds { x: i64, y: i64 },
    #[error("Propagation was cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
