use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server_url must start with http:// or https://, got `{0}`")]
    UnsupportedScheme(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to reach analysis server: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("analysis server responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("stream read failed: {0}")]
    Read(#[source] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("stream closed by server")]
    Closed,
}
