use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to write frame dump {}: {source}", path.display())]
    DumpIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
