use reqwest::StatusCode;

/// Failures that can occur while talking to the music server, the image
/// hosts, or the presence session. Everything here is caught and logged at
/// the tick boundary; nothing is fatal after startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{op}: request failed: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{op}: unexpected status {status}")]
    UnexpectedStatus { op: &'static str, status: StatusCode },

    #[error("{op}: malformed response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("image uploads are disabled")]
    UploadsDisabled,

    #[error("{host} rejected the upload with status {status}")]
    ImageHostRejected { host: &'static str, status: StatusCode },

    #[error("presence session error: {0}")]
    Presence(String),
}

impl Error {
    pub fn transport(op: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { op, source }
    }

    pub fn decode(op: &'static str, source: reqwest::Error) -> Self {
        Self::Decode { op, source }
    }
}
