use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error ({status}): {body}")]
    Upstream { status: u16, body: UpstreamBody },

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Body of a non-2xx upstream response: parsed JSON when the upstream sent
/// JSON, the raw text otherwise.
#[derive(Debug, Clone)]
pub enum UpstreamBody {
    Json(serde_json::Value),
    Text(String),
}

impl UpstreamBody {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => UpstreamBody::Json(value),
            Err(_) => UpstreamBody::Text(raw),
        }
    }
}

impl std::fmt::Display for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamBody::Json(value) => write!(f, "{}", value),
            UpstreamBody::Text(text) => f.write_str(text),
        }
    }
}
