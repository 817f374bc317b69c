use thiserror::Error;

/// The ratings endpoint could not be assembled.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("at least one item identifier is required")]
    EmptyIdentifiers,
    #[error("item identifier at position {0} is empty")]
    EmptyIdentifier(usize),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("catalog base must be an http(s) URL with a host, got {0}")]
    UnsupportedBase(String),
}

/// The response body did not match the ratings envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed ratings payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("no developer token configured")]
    MissingDeveloperToken,
    #[error("no music user token configured")]
    MissingUserToken,
    #[error("catalog service rejected the credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("catalog service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("could not build ratings request: {0}")]
    Build(#[from] BuildError),
    #[error("ratings request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("could not decode ratings response: {0}")]
    Decode(#[from] DecodeError),
}
