// Custom error type for fetch engine operations
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fetch configuration: {0}")]
    Config(String),

    #[error("A fetch batch is already in progress")]
    BatchInProgress,
}
