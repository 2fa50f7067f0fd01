use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http client build error: {0}")]
    Build(reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Http {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned {status}")]
    Status {
        path: &'static str,
        status: StatusCode,
        /// `message` field of the error body, when the backend sent one.
        message: Option<String>,
    },

    #[error("{path} returned malformed JSON: {source}")]
    Decode {
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message: Some(m), .. } => m.clone(),
            other => other.to_string(),
        }
    }
}
