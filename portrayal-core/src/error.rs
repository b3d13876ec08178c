use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortrayalError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("LLM error: {0}")]
    Llm(String),
}

/// Failure of a single history page request. The crawler treats every variant the same way:
/// the scan loop stops and whatever was merged so far is returned.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(String),

    #[error("Remote action failed (retcode {retcode}): {message}")]
    Remote { retcode: i64, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Member lookup failed: {0}")]
    Lookup(String),

    #[error("Member not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, PortrayalError>;
