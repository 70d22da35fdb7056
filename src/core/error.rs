use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    /// Processing stopped at the entry at `position` (0-based within the drain).
    #[error("processing aborted at entry {position}: {source}")]
    Aborted {
        position: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl Error {
    /// Returns the error that caused an abort, or `self` for any other variant.
    pub fn root(&self) -> &Error {
        match self {
            Error::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
