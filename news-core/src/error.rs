use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("response decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("store migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
