//! Wire-decoder boundary.
//!
//! The bit-level unpacking of indicator, product-definition,
//! grid-description, bitmap, and data sections is supplied externally.
//! The pipeline drives it through [`SectionDecoder`] and only ever sees
//! [`DecodedRecord`] metadata and unpacked `f32` planes.

use thiserror::Error;

use crate::sections::DecodedRecord;

/// Decode failures, split by how the caller is expected to recover.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Unrecognizable bytes where a record was expected. The scanner skips
    /// this record and keeps scanning the same file.
    #[error("garbage record: {0}")]
    Garbage(String),

    /// Structurally broken section. Scanning of the current file stops;
    /// a batch run continues with the next file.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Payload unpack failed after a successful inventory. The record is
    /// skipped; scanning continues.
    #[error("payload unpack failed: {0}")]
    Unpack(String),
}

/// External section decoder for one record's byte buffer.
///
/// Implementations decode the foreign binary layout; callers own record
/// framing and everything downstream of the unpacked plane.
pub trait SectionDecoder {
    /// Total record length declared by the leading indicator bytes.
    ///
    /// `indicator` holds at least the first 8 bytes of the record,
    /// beginning with the [`RECORD_MARKER`](crate::sections::RECORD_MARKER).
    fn record_length(&self, indicator: &[u8]) -> Result<usize, DecodeError>;

    /// Cheap pass: decode indicator + product definition + grid
    /// description only. Used to test record relevance before paying for
    /// the full unpack.
    fn inventory(&self, record: &[u8]) -> Result<DecodedRecord, DecodeError>;

    /// Full decode of bitmap and data sections into one value per grid
    /// point. Points masked out by the bitmap come back as NaN.
    ///
    /// `grid_points` is the expected point count from the inventory pass.
    fn unpack(&self, record: &[u8], grid_points: usize) -> Result<Vec<f32>, DecodeError>;
}
