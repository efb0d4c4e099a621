use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the user. None of them end the process.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("no source files match '{pattern}' in {}", dir.display())]
    NoSourcesFound {
        pattern: String,
        dir: PathBuf,
        /// Set when the directory could not be listed at all.
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("cannot read source file {}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot read cached dataset '{name}'")]
    CacheRead {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot write cached dataset '{name}'")]
    CacheWrite {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid dataset name '{0}'")]
    InvalidCacheName(String),

    #[error("no dataset loaded: open a cached dataset or import source files first")]
    MissingDataset,
}
