//! Shared test fixtures: a synthetic wire format and its decoder.
//!
//! Records are framed like the real thing (marker plus big-endian total
//! length) but carry a trivial fixed-layout body so tests can build
//! streams by hand:
//!
//! ```text
//! 0..4   b"GRIB"
//! 4..8   u32 total record length
//! 8..12  i32 parameter code
//! 12..16 i32 level type
//! 16..20 f32 level value
//! 20..24 u32 nx
//! 24..28 u32 ny
//! 28..   f32 values, row-major
//! ```

use chrono::{TimeZone, Utc};

use grib_records::{
    DecodeError, DecodedRecord, GridDescription, GridKind, Indicator, ProductDefinition,
    SectionDecoder,
};

pub const HEADER_LEN: usize = 28;

/// Parameter code that fails inventory as a skippable record.
pub const GARBAGE_PARAM: i32 = -1;

pub struct TestDecoder;

impl SectionDecoder for TestDecoder {
    fn record_length(&self, indicator: &[u8]) -> Result<usize, DecodeError> {
        if indicator.len() < 8 {
            return Err(DecodeError::Garbage("short indicator".into()));
        }
        let len = u32::from_be_bytes(indicator[4..8].try_into().unwrap());
        if len == u32::MAX {
            return Err(DecodeError::Corrupt("unreadable record length".into()));
        }
        Ok(len as usize)
    }

    fn inventory(&self, record: &[u8]) -> Result<DecodedRecord, DecodeError> {
        if record.len() < HEADER_LEN {
            return Err(DecodeError::Garbage("truncated record".into()));
        }
        let parameter_id = i32::from_be_bytes(record[8..12].try_into().unwrap());
        if parameter_id == GARBAGE_PARAM {
            return Err(DecodeError::Garbage("unrecognized product section".into()));
        }
        let level_type = i32::from_be_bytes(record[12..16].try_into().unwrap());
        let level_value = f32::from_be_bytes(record[16..20].try_into().unwrap());
        let nx = u32::from_be_bytes(record[20..24].try_into().unwrap()) as usize;
        let ny = u32::from_be_bytes(record[24..28].try_into().unwrap()) as usize;

        Ok(DecodedRecord {
            indicator: Indicator {
                total_length: record.len(),
                edition: 1,
            },
            product: ProductDefinition {
                parameter_id,
                level_type,
                level_value,
                generate_time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                forecast_secs: 3600,
                ensemble_id: None,
                decimal_scale: 0,
                has_bitmap: false,
            },
            grid: GridDescription {
                kind: GridKind::LatLon,
                nx,
                ny,
                dx: 1.0,
                dy: 1.0,
                first_lat: 0.0,
                first_lon: 0.0,
                north_to_south: false,
                row_lengths: None,
                proj_param1: 0.0,
                proj_param2: 0.0,
                rotation: 0.0,
            },
        })
    }

    fn unpack(&self, record: &[u8], grid_points: usize) -> Result<Vec<f32>, DecodeError> {
        let payload = &record[HEADER_LEN..];
        if payload.len() < grid_points * 4 {
            return Err(DecodeError::Unpack("payload shorter than grid".into()));
        }
        Ok(payload
            .chunks_exact(4)
            .take(grid_points)
            .map(|c| f32::from_be_bytes(c.try_into().unwrap()))
            .collect())
    }
}

/// Frame one record in the synthetic format.
pub fn record_bytes(
    parameter_id: i32,
    level_type: i32,
    level_value: f32,
    nx: u32,
    ny: u32,
    values: &[f32],
) -> Vec<u8> {
    let total = HEADER_LEN + 4 * values.len();
    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(b"GRIB");
    buf.extend_from_slice(&(total as u32).to_be_bytes());
    buf.extend_from_slice(&parameter_id.to_be_bytes());
    buf.extend_from_slice(&level_type.to_be_bytes());
    buf.extend_from_slice(&level_value.to_be_bytes());
    buf.extend_from_slice(&nx.to_be_bytes());
    buf.extend_from_slice(&ny.to_be_bytes());
    for value in values {
        buf.extend_from_slice(&value.to_be_bytes());
    }
    buf
}

/// A record whose declared length cannot be read at all. The scanner must
/// treat this as fatal for the file.
pub fn fatal_record_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"GRIB");
    buf.extend_from_slice(&u32::MAX.to_be_bytes());
    buf
}
