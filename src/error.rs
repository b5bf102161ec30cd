use std::path::PathBuf;

use thiserror::Error;

pub type IngestResult<T> = Result<T, IngestError>;

/// Failures at the I/O edges of the pipeline. Type inference has no error
/// path and never produces one of these.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The workbook could not be opened or its container is malformed.
    #[error("cannot open workbook {path:?}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A sheet exists but its contents could not be read.
    #[error("cannot read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("cannot write {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}
