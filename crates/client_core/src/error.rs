use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("transport failure calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to save artifact '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}
