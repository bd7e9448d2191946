//! Error types for the ingest pipeline.

use thiserror::Error;

use grib_records::DecodeError;

/// Errors that can stop processing of one input file.
///
/// Per-record failures never surface here; the scanner skips those and
/// keeps going. A batch run reports per-file errors and continues with
/// the next file.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read input: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("record decode failed: {0}")]
    RecordDecode(#[from] DecodeError),

    #[error("output sink failed: {0}")]
    Sink(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
