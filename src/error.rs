use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatuslineError {
    #[error("No input data")]
    EmptyInput,

    #[error("{0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
