use thiserror::Error;

/// Failures raised by the windowed analysis core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("window is empty")]
    EmptyWindow,

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failures while turning a file on disk into a track model.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to open GPX file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A failure tied to the input file it happened on
#[derive(Error, Debug)]
pub enum FileError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: ReadError,
    },

    #[error("{path}: {source}")]
    Analysis {
        path: String,
        #[source]
        source: AnalysisError,
    },
}
