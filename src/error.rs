use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure reading from a listing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to listing store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("listing store returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("could not decode listing rows: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("listing store did not respond within {0:?}")]
    Timeout(Duration),

    #[error("could not read snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
