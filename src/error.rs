use thiserror::Error;

/// Errors surfaced by the ingestion engine and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote service returned output we cannot interpret: an
    /// unrecognizable version banner or an unparseable review page.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A cache artifact that cache-reuse mode requires is absent.
    #[error("cache miss: {0}")]
    CacheMiss(String),

    /// A cache artifact exists but its content is not valid JSON.
    #[error("corrupt cache artifact {path}")]
    CacheCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote command could not be executed or exited non-zero.
    #[error("remote command failed: {0}")]
    Executor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
