use std::path::PathBuf;

use thiserror::Error;

pub type RaceResult<T> = Result<T, RaceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Fetch,
    Integrity,
    Render,
    Io,
}

#[derive(Debug, Error)]
pub enum RaceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request to {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned http {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("data integrity: {0}")]
    Integrity(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RaceError::Config(_) => ErrorKind::Config,
            RaceError::Fetch { .. } | RaceError::FetchStatus { .. } | RaceError::Malformed { .. } => {
                ErrorKind::Fetch
            }
            RaceError::Integrity(_) => ErrorKind::Integrity,
            RaceError::Render(_) => ErrorKind::Render,
            RaceError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn malformed(what: &'static str, detail: impl ToString) -> Self {
        RaceError::Malformed {
            what,
            detail: detail.to_string(),
        }
    }
}
